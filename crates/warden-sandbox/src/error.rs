//! Sandbox subsystem error types.

use thiserror::Error;
use warden_core::ClientId;

/// Errors raised by the jail manager, quota manager, and sandbox state store.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// A requested path escaped the client's jail (absolute path or `..` component).
    #[error("path escapes jail for client {client}: {path}")]
    PathEscape {
        /// Client whose jail was targeted.
        client: ClientId,
        /// The offending relative path, as supplied by the caller.
        path: String,
    },

    /// A client attempted to access another client's jail without the
    /// cross-client permission.
    #[error("client {accessor} denied access to {owner}'s jail")]
    CrossClientDenied {
        /// Client attempting the access.
        accessor: ClientId,
        /// Client whose jail was targeted.
        owner: ClientId,
    },

    /// Granting the requested resources would exceed the client's quota.
    #[error("quota exceeded for client {client}: {reason}")]
    QuotaExceeded {
        /// Client whose quota was exceeded.
        client: ClientId,
        /// Which dimension was exceeded.
        reason: String,
    },

    /// Underlying filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted sandbox state was not valid JSON.
    #[error("malformed sandbox state: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = Result<T, SandboxError>;
