//! Core error type shared by callers that have no more specific error of their own.

use thiserror::Error;

/// Errors that do not belong to any single subsystem.
#[derive(Debug, Error)]
pub enum CoreError {
    // Identifier errors
    /// A client, token, or execution identifier was empty or otherwise malformed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    // Time errors
    /// A timestamp could not be represented or parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
