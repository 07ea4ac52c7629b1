//! Top-level server errors, and their mapping onto wire-level
//! [`ProtocolError`] codes for every built-in method.

use thiserror::Error;
use warden_protocol::{ExecutionErrorKind, ProtocolError};

/// Failures that can occur while assembling or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] warden_config::ConfigError),

    /// The data directory could not be prepared.
    #[error("failed to prepare data directory: {0}")]
    DataDir(#[from] std::io::Error),

    /// The signing secret was rejected while building the token minter.
    /// Should not happen in practice since [`warden_config::Config::validate`]
    /// already enforces the same minimum length.
    #[error("failed to build token minter: {0}")]
    Minter(warden_identity::IdentityError),
}

/// Translate an [`warden_identity::IdentityError`] into the on-wire error
/// family `auth/token`, `auth/refresh`, and `auth/revoke` report.
pub fn identity_error_to_protocol(error: warden_identity::IdentityError) -> ProtocolError {
    use warden_identity::IdentityError;
    match error {
        IdentityError::UnknownUsername(_)
        | IdentityError::AccountDisabled(_)
        | IdentityError::InvalidCredentials => {
            ProtocolError::AuthenticationFailed("invalid username or password".to_string())
        }
        IdentityError::TokenNotFound(_) | IdentityError::TokenRevoked(_) => {
            ProtocolError::AuthenticationFailed("token is not valid".to_string())
        }
        IdentityError::TokenInvalid(_) | IdentityError::WrongTokenKind { .. } => {
            ProtocolError::AuthenticationFailed("token is not valid".to_string())
        }
        other => ProtocolError::Internal(other.to_string()),
    }
}

/// Translate an [`warden_execution::ExecutionError`] into the on-wire error
/// family `tools/call` reports for calls that never reached a handler.
pub fn execution_error_to_protocol(error: warden_execution::ExecutionError) -> ProtocolError {
    use warden_execution::ExecutionError;
    match error {
        ExecutionError::UnknownTool(name) => {
            ProtocolError::ResourceNotFound(format!("unknown tool: {name}"))
        }
        ExecutionError::Validation(fields) => ProtocolError::InvalidParams(
            fields
                .iter()
                .map(std::string::ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        ),
        ExecutionError::Denied(e) => ProtocolError::PermissionDenied(e.to_string()),
        ExecutionError::QuotaExceeded(e) => ProtocolError::ExecutionFailed {
            message: e.to_string(),
            kind: ExecutionErrorKind::Quota,
        },
        ExecutionError::Timeout(secs) => ProtocolError::ExecutionFailed {
            message: format!("execution timed out after {secs}s"),
            kind: ExecutionErrorKind::Timeout,
        },
        ExecutionError::Handler(message) => ProtocolError::ExecutionFailed {
            message,
            kind: ExecutionErrorKind::Crashed,
        },
        ExecutionError::Audit(e) => ProtocolError::Internal(e.to_string()),
    }
}
