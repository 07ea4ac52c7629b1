//! Permission and authorization error types.

use thiserror::Error;
use warden_core::ClientId;

use crate::permission::Permission;

/// Errors raised by the authorization engine.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// The client holds no permission covering the requested one.
    #[error("client {client} lacks permission: {permission:?}")]
    Denied {
        /// Client that was denied.
        client: ClientId,
        /// The permission that was required but not held.
        permission: Permission,
    },

    /// A permission value was malformed (e.g. `SystemCommand` with no resource).
    #[error("invalid permission: {0}")]
    InvalidPermission(String),
}

/// Result type for authorization operations.
pub type PermissionResult<T> = Result<T, PermissionError>;
