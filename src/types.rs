//! Core types for schema reference resolution.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ResolveError;
use crate::loader;

/// Returns the JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Options shared unchanged by every document touched during a resolution.
///
/// The resolver never mutates these; they are passed down so nested
/// resolutions inside loaded files behave like the top-level one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SharedOptions {
    /// Base directory for relative references in a document without an origin.
    /// Falls back to the process working directory when unset.
    pub base_dir: Option<PathBuf>,
    /// Whether loaded files get their external `$ref`s inlined before use.
    pub inline_external_refs: bool,
}

impl Default for SharedOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            inline_external_refs: true,
        }
    }
}

impl SharedOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base directory used for root documents.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Enable or disable inlining of external refs in loaded files.
    pub fn inline_external_refs(mut self, inline: bool) -> Self {
        self.inline_external_refs = inline;
        self
    }
}

/// Where a document was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Path(PathBuf),
    Url(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Path(path) => write!(f, "{}", path.display()),
            Origin::Url(url) => f.write_str(url),
        }
    }
}

/// Resolution context paired with a document.
///
/// `origin` is `None` for the caller's own root document; relative
/// references inside it resolve against `options.base_dir` or the working
/// directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub origin: Option<Origin>,
    pub options: Arc<SharedOptions>,
}

impl DocumentContext {
    pub fn root(options: Arc<SharedOptions>) -> Self {
        Self {
            origin: None,
            options,
        }
    }

    pub fn with_origin(origin: Origin, options: Arc<SharedOptions>) -> Self {
        Self {
            origin: Some(origin),
            options,
        }
    }
}

/// A parsed JSON document together with its resolution context.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: Value,
    pub context: DocumentContext,
}

impl Document {
    pub fn new(value: Value, context: DocumentContext) -> Self {
        Self { value, context }
    }

    /// Wrap an in-memory value as a root document.
    pub fn root(value: Value, options: Arc<SharedOptions>) -> Self {
        Self::new(value, DocumentContext::root(options))
    }

    /// Load a document from a file path or an `http(s)://` URL.
    ///
    /// The absolute path (or the URL) becomes the document's origin. The
    /// document itself is not preprocessed.
    pub fn load(source: &str, options: Arc<SharedOptions>) -> Result<Self, ResolveError> {
        let origin = if loader::is_url(source) {
            Origin::Url(source.to_string())
        } else {
            Origin::Path(loader::absolute_path(Path::new(source))?)
        };
        let value = match &origin {
            Origin::Path(path) => loader::load_document(path)?,
            Origin::Url(url) => loader::load_document_auto(url)?,
        };
        Ok(Self::new(value, DocumentContext::with_origin(origin, options)))
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.context.origin.as_ref()
    }

    pub fn options(&self) -> &Arc<SharedOptions> {
        &self.context.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn shared_options_defaults() {
        let opts = SharedOptions::new();
        assert_eq!(opts.base_dir, None);
        assert!(opts.inline_external_refs);
    }

    #[test]
    fn shared_options_builder() {
        let opts = SharedOptions::new()
            .base_dir("/srv/app")
            .inline_external_refs(false);
        assert_eq!(opts.base_dir, Some(PathBuf::from("/srv/app")));
        assert!(!opts.inline_external_refs);
    }

    #[test]
    fn shared_options_deserialize() {
        let opts: SharedOptions =
            serde_json::from_value(json!({ "base-dir": "/specs" })).unwrap();
        assert_eq!(opts.base_dir, Some(PathBuf::from("/specs")));
        assert!(opts.inline_external_refs);
    }

    #[test]
    fn root_document_has_no_origin() {
        let doc = Document::root(json!({}), Arc::new(SharedOptions::new()));
        assert!(doc.origin().is_none());
    }

    #[test]
    fn load_records_absolute_origin() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"definitions": {{}}}}"#).unwrap();

        let source = file.path().to_str().unwrap();
        let doc = Document::load(source, Arc::new(SharedOptions::new())).unwrap();
        assert_eq!(doc.origin(), Some(&Origin::Path(file.path().to_path_buf())));
        assert_eq!(doc.value, json!({"definitions": {}}));
    }

    #[test]
    fn origin_display() {
        assert_eq!(Origin::Url("http://h/a.json".into()).to_string(), "http://h/a.json");
        assert_eq!(Origin::Path(PathBuf::from("/a/b.json")).to_string(), "/a/b.json");
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!([1])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
