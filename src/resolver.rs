//! Schema reference resolution.
//!
//! Turns a `$ref` string plus the document containing it into the node it
//! points at, loading sibling files or remote documents on the way.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::loader::{resolve_relative, DocumentLoader, Fetcher, NoFetcher, PreprocessingLoader};
use crate::reference::{walk, Reference, Walk};
use crate::types::{json_type_name, Document, DocumentContext, Origin};

/// Resolves JSON References against documents.
///
/// Resolution is synchronous: remote fetches block the calling thread.
/// Nothing is cached between calls.
pub struct Resolver {
    loader: Box<dyn DocumentLoader>,
    fetcher: Box<dyn Fetcher>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl Resolver {
    /// Create a resolver with the default file loader and, when the
    /// `remote` feature is enabled, the blocking HTTP fetcher.
    pub fn new() -> Self {
        #[cfg(feature = "remote")]
        let fetcher: Box<dyn Fetcher> = Box::new(crate::loader::HttpFetcher);
        #[cfg(not(feature = "remote"))]
        let fetcher: Box<dyn Fetcher> = Box::new(NoFetcher);

        Self {
            loader: Box::new(PreprocessingLoader),
            fetcher,
        }
    }

    /// Create a resolver that never touches the network.
    pub fn offline() -> Self {
        Self::new().with_fetcher(NoFetcher)
    }

    /// Replace the loader used for local file references.
    pub fn with_loader(mut self, loader: impl DocumentLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    /// Replace the fetcher used for remote references.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    /// Resolve `reference` found inside `current`.
    ///
    /// The returned document carries the node and the context of the
    /// document it was found in: `current`'s own context for same-document
    /// refs, otherwise the loaded file or URL with `current`'s options.
    ///
    /// A pointer segment that does not exist logs a warning and yields an
    /// empty object.
    ///
    /// # Errors
    ///
    /// Fails when a referenced file or URL cannot be loaded or parsed.
    pub fn resolve(&self, reference: &str, current: &Document) -> Result<Document, ResolveError> {
        self.resolve_value(reference, &current.value, &current.context)
    }

    /// Borrowed form of [`Resolver::resolve`].
    pub fn resolve_value(
        &self,
        reference: &str,
        value: &Value,
        context: &DocumentContext,
    ) -> Result<Document, ResolveError> {
        let reference = Reference::parse(reference);
        let target = self.load_target(&reference, context)?;

        let (root, target_context) = match &target {
            Some(document) => (&document.value, &document.context),
            None => (value, context),
        };

        let node = match walk(root, &reference.pointer) {
            Walk::Found(node) => node.clone(),
            Walk::Missing { segment } => {
                warn!(
                    reference = %reference.raw,
                    segment,
                    "reference '{}' cannot be resolved: '{}' is undefined",
                    reference.raw,
                    segment
                );
                Value::Object(Map::new())
            }
        };

        Ok(Document::new(node, target_context.clone()))
    }

    /// Load the document a reference points into.
    ///
    /// Returns `None` for same-document refs. A loaded document gets the
    /// resolved path or URL as origin and shares `context`'s options.
    pub fn load_target(
        &self,
        reference: &Reference,
        context: &DocumentContext,
    ) -> Result<Option<Document>, ResolveError> {
        if reference.is_same_document() {
            return Ok(None);
        }

        let origin = if reference.is_remote() {
            Origin::Url(reference.url.clone())
        } else {
            resolve_relative(&reference.url, context)?
        };

        let value = match &origin {
            Origin::Path(path) => self.loader.load_and_preprocess(path, &context.options, self)?,
            Origin::Url(url) => {
                let body = self.fetcher.get(url)?;
                serde_json::from_str(&body)
                    .map_err(|source| ResolveError::invalid_json(url.as_str(), source))?
            }
        };
        debug!(
            origin = %origin,
            kind = json_type_name(&value),
            "loaded referenced document"
        );

        let context = DocumentContext::with_origin(origin, Arc::clone(&context.options));
        Ok(Some(Document::new(value, context)))
    }
}
