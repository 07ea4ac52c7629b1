//! Storage error types.

use thiserror::Error;

/// Errors that can occur while loading or saving JSON-backed state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that was being accessed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents were not valid JSON, or did not match the expected shape.
    #[error("malformed JSON at {path}: {source}")]
    Format {
        /// Path whose contents failed to parse.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;
