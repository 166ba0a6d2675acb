//! Document loading from files, strings and HTTP URLs.
//!
//! Also hosts the two collaborators the resolver is built with: a
//! [`Fetcher`] for remote documents and a [`DocumentLoader`] that loads and
//! preprocesses local files.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::ResolveError;
use crate::reference::Reference;
use crate::resolver::Resolver;
use crate::types::{DocumentContext, Origin, SharedOptions};

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `ResolveError::FileNotFound` if the file doesn't exist,
/// or `ResolveError::InvalidJson` if the file isn't valid JSON.
pub fn load_document(path: &Path) -> Result<Value, ResolveError> {
    if !path.exists() {
        return Err(ResolveError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ResolveError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content)
        .map_err(|source| ResolveError::invalid_json(path.display().to_string(), source))
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `ResolveError::InvalidJson` if the string isn't valid JSON.
pub fn load_document_str(content: &str) -> Result<Value, ResolveError> {
    serde_json::from_str(content).map_err(|source| ResolveError::invalid_json("<string>", source))
}

/// Load a JSON document from a URL with a blocking GET.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `ResolveError::NetworkError` if the request fails,
/// or `ResolveError::InvalidJson` if the response isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, ResolveError> {
    let body = HttpFetcher.get(url)?;
    serde_json::from_str(&body).map_err(|source| ResolveError::invalid_json(url, source))
}

/// Check if a string carries a URL scheme (`scheme://`).
pub fn is_url(s: &str) -> bool {
    s.contains("://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str) -> Result<Value, ResolveError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(ResolveError::RemoteUnsupported {
                url: source.to_string(),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Fetches the raw body of a remote document.
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<String, ResolveError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<String, ResolveError>,
{
    fn get(&self, url: &str) -> Result<String, ResolveError> {
        self(url)
    }
}

/// Blocking HTTP fetcher. No retries, no caching.
#[cfg(feature = "remote")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(feature = "remote")]
impl Fetcher for HttpFetcher {
    fn get(&self, url: &str) -> Result<String, ResolveError> {
        let network_error = |source| ResolveError::NetworkError {
            url: url.to_string(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(network_error)?;

        debug!(url, "fetching remote document");
        let response = client.get(url).send().map_err(network_error)?;

        // Check for HTTP errors before reading the body
        let response = response.error_for_status().map_err(network_error)?;

        response.text().map_err(network_error)
    }
}

/// Fetcher for builds without the `remote` feature; every fetch fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    fn get(&self, url: &str) -> Result<String, ResolveError> {
        Err(ResolveError::RemoteUnsupported {
            url: url.to_string(),
        })
    }
}

/// Loads a local file and prepares it for pointer traversal.
///
/// Implementations must resolve any nested references the document needs
/// before returning it; `resolver` is the resolver asking, so nested
/// lookups go through the same collaborators.
pub trait DocumentLoader {
    fn load_and_preprocess(
        &self,
        path: &Path,
        options: &Arc<SharedOptions>,
        resolver: &Resolver,
    ) -> Result<Value, ResolveError>;
}

impl<F> DocumentLoader for F
where
    F: Fn(&Path, &Arc<SharedOptions>, &Resolver) -> Result<Value, ResolveError>,
{
    fn load_and_preprocess(
        &self,
        path: &Path,
        options: &Arc<SharedOptions>,
        resolver: &Resolver,
    ) -> Result<Value, ResolveError> {
        self(path, options, resolver)
    }
}

/// Default loader: reads the file and inlines its external `$ref`s.
///
/// Same-document refs (`#/...`) are kept so the renderer can link them.
/// There is no cycle detection: files that reference each other recurse
/// without bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreprocessingLoader;

impl DocumentLoader for PreprocessingLoader {
    fn load_and_preprocess(
        &self,
        path: &Path,
        options: &Arc<SharedOptions>,
        resolver: &Resolver,
    ) -> Result<Value, ResolveError> {
        debug!(path = %path.display(), "loading referenced file");
        let mut document = load_document(path)?;

        if options.inline_external_refs {
            let context =
                DocumentContext::with_origin(Origin::Path(path.to_path_buf()), Arc::clone(options));
            inline_external_refs(&mut document, &context, resolver)?;
        }

        Ok(document)
    }
}

/// Replace every object whose `$ref` points at another document with the
/// node it references.
///
/// `context` is the context of the document being walked, so relative refs
/// resolve against its own location. Sibling keys of an inlined `$ref` are
/// dropped. Same-document refs inside an inlined node are prefixed with the
/// origin of the document it came from, so they keep pointing there.
pub fn inline_external_refs(
    value: &mut Value,
    context: &DocumentContext,
    resolver: &Resolver,
) -> Result<(), ResolveError> {
    if let Some(reference) = external_ref(value) {
        // External refs never read the containing document's value.
        let resolved = resolver.resolve_value(&reference, &Value::Null, context)?;
        let mut node = resolved.value;
        if let Some(origin) = &resolved.context.origin {
            qualify_same_document_refs(&mut node, origin);
        }
        *value = node;
        return Ok(());
    }

    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                inline_external_refs(child, context, resolver)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                inline_external_refs(item, context, resolver)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Rewrite every `#/...` ref under `value` to `<origin>#/...`.
pub fn qualify_same_document_refs(value: &mut Value, origin: &Origin) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get_mut("$ref") {
                let parsed = Reference::parse(reference);
                if parsed.is_same_document() {
                    let hash = parsed.raw.split_once('#').map_or("", |(_, hash)| hash);
                    *reference = format!("{}#{}", origin, hash);
                }
            }
            for child in map.values_mut() {
                qualify_same_document_refs(child, origin);
            }
        }
        Value::Array(items) => {
            for item in items {
                qualify_same_document_refs(item, origin);
            }
        }
        _ => {}
    }
}

fn external_ref(value: &Value) -> Option<String> {
    let reference = value.get("$ref")?.as_str()?;
    if Reference::parse(reference).is_same_document() {
        None
    } else {
        Some(reference.to_string())
    }
}

/// Resolve the document part of a non-remote reference against `context`.
///
/// A file origin resolves relative to its directory, a URL origin relative
/// to the URL, and a root document relative to `options.base_dir` or the
/// working directory.
pub fn resolve_relative(url: &str, context: &DocumentContext) -> Result<Origin, ResolveError> {
    match &context.origin {
        Some(Origin::Path(origin)) => {
            let dir = origin.parent().unwrap_or(origin);
            Ok(Origin::Path(normalize_path(&dir.join(url))))
        }
        Some(Origin::Url(base)) => Ok(Origin::Url(join_url(base, url)?)),
        None => {
            let base = match &context.options.base_dir {
                Some(dir) => absolute_path(dir)?,
                None => current_dir()?,
            };
            Ok(Origin::Path(normalize_path(&base.join(url))))
        }
    }
}

/// Make `path` absolute against the working directory and normalize it.
pub fn absolute_path(path: &Path) -> Result<PathBuf, ResolveError> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&current_dir()?.join(path)))
    }
}

fn current_dir() -> Result<PathBuf, ResolveError> {
    std::env::current_dir().map_err(|source| ResolveError::WorkingDirectory { source })
}

/// Lexically remove `.` and `..` components. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Join a relative reference onto a base URL.
fn join_url(base: &str, relative: &str) -> Result<String, ResolveError> {
    let invalid = |source| ResolveError::InvalidUrl {
        base: base.to_string(),
        reference: relative.to_string(),
        source,
    };
    let joined = Url::parse(base)
        .and_then(|base| base.join(relative))
        .map_err(invalid)?;
    Ok(joined.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context_at(origin: Option<Origin>) -> DocumentContext {
        DocumentContext {
            origin,
            options: Arc::new(SharedOptions::new()),
        }
    }

    #[test]
    fn load_document_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let doc = load_document(file.path()).unwrap();
        assert_eq!(doc["type"], "object");
    }

    #[test]
    fn load_document_file_not_found() {
        let result = load_document(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(ResolveError::FileNotFound { .. })));
    }

    #[test]
    fn load_document_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_document(file.path());
        assert!(matches!(result, Err(ResolveError::InvalidJson { .. })));
    }

    #[test]
    fn load_document_str_valid() {
        let doc = load_document_str(r#"{"type": "object"}"#).unwrap();
        assert_eq!(doc["type"], "object");
    }

    #[test]
    fn load_document_str_invalid() {
        let result = load_document_str("not json");
        assert!(matches!(result, Err(ResolveError::InvalidJson { .. })));
    }

    #[test]
    fn is_url_schemes() {
        assert!(is_url("https://example.com/schema.json"));
        assert!(is_url("http://example.com/schema.json"));
        assert!(is_url("ftp://example.com/schema.json"));
    }

    #[test]
    fn is_url_file_path() {
        assert!(!is_url("/path/to/schema.json"));
        assert!(!is_url("./schema.json"));
        assert!(!is_url("schema.json"));
    }

    #[test]
    fn load_document_auto_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "string"}}"#).unwrap();

        let doc = load_document_auto(file.path().to_str().unwrap()).unwrap();
        assert_eq!(doc["type"], "string");
    }

    #[test]
    fn normalize_removes_dot_segments() {
        assert_eq!(
            normalize_path(Path::new("/specs/./v1/../common/x.json")),
            PathBuf::from("/specs/common/x.json")
        );
    }

    #[test]
    fn resolve_relative_to_file_directory() {
        let ctx = context_at(Some(Origin::Path(PathBuf::from("/specs/main.json"))));
        let origin = resolve_relative("other.json", &ctx).unwrap();
        assert_eq!(origin, Origin::Path(PathBuf::from("/specs/other.json")));
    }

    #[test]
    fn resolve_relative_parent_directory() {
        let ctx = context_at(Some(Origin::Path(PathBuf::from("/specs/v1/main.json"))));
        let origin = resolve_relative("../common/types.json", &ctx).unwrap();
        assert_eq!(origin, Origin::Path(PathBuf::from("/specs/common/types.json")));
    }

    #[test]
    fn resolve_relative_absolute_path_wins() {
        let ctx = context_at(Some(Origin::Path(PathBuf::from("/specs/main.json"))));
        let origin = resolve_relative("/shared/types.json", &ctx).unwrap();
        assert_eq!(origin, Origin::Path(PathBuf::from("/shared/types.json")));
    }

    #[test]
    fn resolve_relative_root_uses_base_dir() {
        let ctx = DocumentContext::root(Arc::new(SharedOptions::new().base_dir("/app")));
        let origin = resolve_relative("defs.json", &ctx).unwrap();
        assert_eq!(origin, Origin::Path(PathBuf::from("/app/defs.json")));
    }

    #[test]
    fn resolve_relative_root_uses_working_directory() {
        let ctx = context_at(None);
        let origin = resolve_relative("defs.json", &ctx).unwrap();
        let expected = std::env::current_dir().unwrap().join("defs.json");
        assert_eq!(origin, Origin::Path(normalize_path(&expected)));
    }

    #[test]
    fn resolve_relative_to_url() {
        let ctx = context_at(Some(Origin::Url("http://host/api/v1/schema.json".into())));
        assert_eq!(
            resolve_relative("common.json", &ctx).unwrap(),
            Origin::Url("http://host/api/v1/common.json".into())
        );
        assert_eq!(
            resolve_relative("../shared.json", &ctx).unwrap(),
            Origin::Url("http://host/api/shared.json".into())
        );
        assert_eq!(
            resolve_relative("/root.json", &ctx).unwrap(),
            Origin::Url("http://host/root.json".into())
        );
    }

    #[test]
    fn join_url_without_path() {
        assert_eq!(join_url("http://host", "a.json").unwrap(), "http://host/a.json");
    }

    #[test]
    fn resolve_relative_ignores_base_query() {
        let ctx = context_at(Some(Origin::Url("http://host/api/schema.json?v=1/2".into())));
        assert_eq!(
            resolve_relative("types.json", &ctx).unwrap(),
            Origin::Url("http://host/api/types.json".into())
        );
    }

    #[test]
    fn resolve_relative_ignores_base_fragment() {
        let ctx = context_at(Some(Origin::Url("http://host/api/schema.json#/a/b".into())));
        assert_eq!(
            resolve_relative("types.json", &ctx).unwrap(),
            Origin::Url("http://host/api/types.json".into())
        );
    }

    #[test]
    fn resolve_relative_invalid_base_url() {
        let ctx = context_at(Some(Origin::Url("not a url://host/x.json".into())));
        let result = resolve_relative("types.json", &ctx);
        assert!(matches!(result, Err(ResolveError::InvalidUrl { .. })));
    }

    #[test]
    fn qualify_prefixes_same_document_refs() {
        let origin = Origin::Path(PathBuf::from("/specs/b.json"));
        let mut node = json!({
            "properties": {
                "c": { "$ref": "#/definitions/C" },
                "d": { "$ref": "d.json#/D" },
                "items": [{ "$ref": "#" }]
            }
        });

        qualify_same_document_refs(&mut node, &origin);
        assert_eq!(
            node,
            json!({
                "properties": {
                    "c": { "$ref": "/specs/b.json#/definitions/C" },
                    "d": { "$ref": "d.json#/D" },
                    "items": [{ "$ref": "/specs/b.json#" }]
                }
            })
        );
    }

    #[test]
    fn no_fetcher_rejects() {
        let result = NoFetcher.get("http://host/a.json");
        assert!(matches!(result, Err(ResolveError::RemoteUnsupported { .. })));
    }

    #[test]
    fn inline_leaves_same_document_refs() {
        let resolver = Resolver::new();
        let ctx = context_at(Some(Origin::Path(PathBuf::from("/specs/main.json"))));
        let mut doc = json!({
            "properties": { "widget": { "$ref": "#/definitions/Widget" } }
        });
        let before = doc.clone();

        inline_external_refs(&mut doc, &ctx, &resolver).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn preprocessing_loader_inlines_sibling_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("types.json"),
            r#"{"definitions": {"Id": {"type": "string", "format": "uuid"}}}"#,
        )
        .unwrap();
        let main = dir.path().join("main.json");
        std::fs::write(
            &main,
            r#"{"properties": {"id": {"$ref": "types.json#/definitions/Id"}}}"#,
        )
        .unwrap();

        let options = Arc::new(SharedOptions::new());
        let loaded = PreprocessingLoader
            .load_and_preprocess(&main, &options, &Resolver::new())
            .unwrap();
        assert_eq!(
            loaded["properties"]["id"],
            json!({"type": "string", "format": "uuid"})
        );
    }

    #[test]
    fn preprocessing_loader_respects_inline_flag() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"a": {{"$ref": "missing.json#/x"}}}}"#).unwrap();

        let options = Arc::new(SharedOptions::new().inline_external_refs(false));
        let loaded = PreprocessingLoader
            .load_and_preprocess(file.path(), &options, &Resolver::new())
            .unwrap();
        assert_eq!(loaded["a"]["$ref"], "missing.json#/x");
    }
}
