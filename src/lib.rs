//! Schema Reference Documentation
//!
//! Resolution of JSON References (`$ref`) in API schema documents and
//! rendering of the referenced schemas as HTML for documentation pages.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use schema_refdoc::{format_schema, print_schema, Document, Resolver, SharedOptions};
//! use serde_json::json;
//!
//! let spec = json!({
//!     "definitions": {
//!         "Order": {
//!             "type": "object",
//!             "properties": {
//!                 "id": { "type": "string", "format": "uuid" },
//!                 "item": { "$ref": "#/definitions/Widget" }
//!             }
//!         },
//!         "Widget": { "type": "object" }
//!     }
//! });
//!
//! let doc = Document::root(spec, Arc::new(SharedOptions::new()));
//! let order = Resolver::offline().resolve("#/definitions/Order", &doc).unwrap();
//!
//! let display = format_schema(&order.value);
//! assert_eq!(display["id"], "string(uuid)");
//!
//! let html = print_schema(&display);
//! assert!(html.contains(r##"<a href="#definition-Widget">"##));
//! ```
//!
//! # Reference Forms
//!
//! | Reference | Target document |
//! |-----------|-----------------|
//! | `#/definitions/Widget` | the document containing the reference |
//! | `types.json#/definitions/Id` | file relative to the containing document |
//! | `https://host/schema.json#/Id` | fetched with a blocking GET |
//!
//! A pointer segment that does not exist is logged as a warning and
//! resolves to `{}`; failing to load a file or URL is an error.

mod error;
mod formatter;
mod loader;
mod reference;
mod render;
mod resolver;
mod types;

pub use error::ResolveError;
pub use formatter::format_schema;
pub use loader::{
    absolute_path, inline_external_refs, is_url, load_document, load_document_auto,
    load_document_str, normalize_path, qualify_same_document_refs, resolve_relative,
    DocumentLoader, Fetcher, NoFetcher, PreprocessingLoader,
};
pub use reference::{walk, Reference, Walk};
pub use render::{
    escape_html, link_definitions, markdown, markdown_with, print_schema, Highlighter,
    JsonHighlighter,
};
pub use resolver::Resolver;
pub use types::{json_type_name, Document, DocumentContext, Origin, SharedOptions};

#[cfg(feature = "remote")]
pub use loader::{load_document_url, HttpFetcher};
