//! Protocol-level errors and their on-wire JSON-RPC codes.

use thiserror::Error;

use crate::message::RpcError;

/// Errors that can arise while framing, parsing, or dispatching a request,
/// independent of any particular transport or method handler.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request body was not valid JSON. Wire code `-32700`.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request was valid JSON but not a valid JSON-RPC 2.0 request.
    /// Wire code `-32600`.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No handler is registered for the requested method. Wire code `-32601`.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// `params` failed schema or shape validation for the target method.
    /// Wire code `-32602`.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// An unexpected failure inside the server. Wire code `-32603`.
    #[error("internal error: {0}")]
    Internal(String),

    /// Credentials were missing or did not verify. Wire code `-32100`.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The caller is not permitted to invoke this method at all.
    /// Wire code `-32101`.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The caller is authenticated but lacks the specific permission the
    /// requested operation needs. Wire code `-32102`.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The referenced resource (tool, token, client) does not exist.
    /// Wire code `-32103`.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The method is not valid in the connection's current protocol state,
    /// e.g. calling `initialize` twice. Wire code `-32104`.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Tool execution failed. `kind` distinguishes timeout/crash/quota/other
    /// failures in the error's `data` field. Wire code `-32105`.
    #[error("execution error: {0}")]
    ExecutionFailed {
        /// Human-readable description.
        message: String,
        /// One of `timeout`, `crashed`, `quota`, `internal`.
        kind: ExecutionErrorKind,
    },
}

/// The `data.kind` discriminant carried by [`ProtocolError::ExecutionFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionErrorKind {
    /// The handler did not complete within its allotted time.
    Timeout,
    /// The handler's subprocess terminated unexpectedly.
    Crashed,
    /// A resource quota was exceeded or unavailable.
    Quota,
    /// Any other execution failure.
    Internal,
}

impl ProtocolError {
    /// The stable on-wire JSON-RPC error code for this variant.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Internal(_) => -32603,
            Self::AuthenticationFailed(_) => -32100,
            Self::AuthorizationFailed(_) => -32101,
            Self::PermissionDenied(_) => -32102,
            Self::ResourceNotFound(_) => -32103,
            Self::InvalidState(_) => -32104,
            Self::ExecutionFailed { .. } => -32105,
        }
    }

    /// Convert into the `error` object of an error response.
    #[must_use]
    pub fn into_rpc_error(self) -> RpcError {
        let code = self.code();
        match self {
            Self::ExecutionFailed { message, kind } => RpcError {
                code,
                message,
                data: Some(serde_json::json!({ "kind": kind })),
            },
            other => RpcError {
                code,
                message: other.to_string(),
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_the_documented_ranges() {
        assert_eq!(ProtocolError::Parse("x".into()).code(), -32700);
        assert_eq!(ProtocolError::InvalidRequest("x".into()).code(), -32600);
        assert_eq!(ProtocolError::MethodNotFound("x".into()).code(), -32601);
        assert_eq!(ProtocolError::InvalidParams("x".into()).code(), -32602);
        assert_eq!(ProtocolError::Internal("x".into()).code(), -32603);
        assert_eq!(
            ProtocolError::AuthenticationFailed("x".into()).code(),
            -32100
        );
        assert_eq!(
            ProtocolError::AuthorizationFailed("x".into()).code(),
            -32101
        );
        assert_eq!(ProtocolError::PermissionDenied("x".into()).code(), -32102);
        assert_eq!(ProtocolError::ResourceNotFound("x".into()).code(), -32103);
        assert_eq!(ProtocolError::InvalidState("x".into()).code(), -32104);
        assert_eq!(
            ProtocolError::ExecutionFailed {
                message: "x".into(),
                kind: ExecutionErrorKind::Timeout
            }
            .code(),
            -32105
        );
    }

    #[test]
    fn execution_failed_carries_kind_in_data() {
        let err = ProtocolError::ExecutionFailed {
            message: "timed out".into(),
            kind: ExecutionErrorKind::Timeout,
        };
        let rpc = err.into_rpc_error();
        assert_eq!(rpc.data.unwrap()["kind"], "timeout");
    }
}
