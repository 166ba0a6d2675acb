//! Error types for schema reference resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a reference resolution.
///
/// A pointer segment that does not exist is *not* an error: the resolver
/// logs a warning and yields an empty object instead.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine working directory: {source}")]
    WorkingDirectory {
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot fetch {url}: remote references are not supported in this build")]
    RemoteUnsupported { url: String },

    // Parse errors (exit code 2)
    #[error("cannot join '{reference}' onto {base}: {source}")]
    InvalidUrl {
        base: String,
        reference: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid JSON in {location}: {source}")]
    InvalidJson {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::FileNotFound { .. }
            | ResolveError::ReadError { .. }
            | ResolveError::WorkingDirectory { .. }
            | ResolveError::RemoteUnsupported { .. } => 3,
            #[cfg(feature = "remote")]
            ResolveError::NetworkError { .. } => 3,
            ResolveError::InvalidJson { .. } | ResolveError::InvalidUrl { .. } => 2,
        }
    }

    pub(crate) fn invalid_json(location: impl Into<String>, source: serde_json::Error) -> Self {
        ResolveError::InvalidJson {
            location: location.into(),
            source,
        }
    }
}
