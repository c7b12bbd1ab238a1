//! Error types surfaced by the core crate.

use thiserror::Error;

/// Failure to obtain a catalog document from its source.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("catalog request returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// Reading a local catalog file failed.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// The body was not a valid catalog document.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to read or write a persistence slot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error while accessing a slot.
    #[error("failed to access slot {key}: {source}")]
    Io {
        /// Slot key.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Atomic replace of a slot file failed.
    #[error("failed to persist slot {key}: {source}")]
    Persist {
        /// Slot key.
        key: String,
        /// Underlying error.
        #[source]
        source: tempfile::PersistError,
    },
    /// Value could not be serialized.
    #[error("failed to serialize slot {key}: {source}")]
    Serialize {
        /// Slot key.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Rejected add-game form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// Title was blank.
    #[error("a title is required")]
    MissingTitle,
    /// URL was blank.
    #[error("a game URL is required")]
    MissingUrl,
    /// URL could not be understood.
    #[error("unsupported game URL: {0}")]
    InvalidUrl(String),
}
