//! JSON-RPC 2.0 wire types.
//!
//! Requests and responses carry their dynamic payloads as [`serde_json::Value`];
//! only the envelope shape (`jsonrpc`, `method`, `id`, `error.code`) is typed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// A parsed JSON-RPC 2.0 request. An absent `id` marks a notification, which
/// receives no reply regardless of outcome.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The method name being invoked.
    pub method: String,
    /// Method parameters, if any.
    #[serde(default)]
    pub params: Option<Value>,
    /// Correlation id; absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
}

impl RpcRequest {
    /// Whether this request is a notification (no reply expected).
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The handler's return value.
    pub result: Value,
    /// Echoes the request's id.
    pub id: Value,
}

/// The `error` object inside an error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    /// One of the stable on-wire codes listed in §6 of the design.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail (e.g. `{"kind": "timeout"}` for execution errors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC 2.0 error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The error detail.
    pub error: RpcError,
    /// Echoes the request's id, or `null` if the id could not be recovered
    /// (e.g. the request failed to parse at all).
    pub id: Value,
}

/// Either half of a reply the protocol state machine can produce.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RpcEnvelope {
    /// A successful result.
    Success(RpcResponse),
    /// An error result.
    Error(RpcErrorResponse),
}

impl RpcEnvelope {
    /// Serialize this envelope to a single-line JSON document.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the envelope somehow fails to
    /// serialize (practically unreachable, since every field is already
    /// serializable JSON).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parse a single JSON-RPC request from raw text.
///
/// Distinguishes a JSON syntax failure (reported as [`ProtocolError::Parse`],
/// on-wire `-32700`) from valid JSON that is missing `method` or carries the
/// wrong `jsonrpc` version (reported as [`ProtocolError::InvalidRequest`],
/// on-wire `-32600`).
///
/// # Errors
///
/// See above.
pub fn parse_request(text: &str) -> Result<RpcRequest, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProtocolError::Parse(e.to_string()))?;

    if value.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(ProtocolError::InvalidRequest(
            "missing or unsupported jsonrpc version".to_string(),
        ));
    }
    let method = value
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::InvalidRequest("missing method".to_string()))?
        .to_string();

    Ok(RpcRequest {
        jsonrpc: "2.0".to_string(),
        method,
        params: value.get("params").cloned(),
        id: value.get("id").cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_request() {
        let req = parse_request(r#"{"jsonrpc":"2.0","method":"initialize","params":{},"id":"1"}"#)
            .unwrap();
        assert_eq!(req.method, "initialize");
        assert!(!req.is_notification());
    }

    #[test]
    fn notification_has_no_id() {
        let req = parse_request(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_request("not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Parse(_)));
    }

    #[test]
    fn missing_method_is_an_invalid_request() {
        let err = parse_request(r#"{"jsonrpc":"2.0","id":"1"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRequest(_)));
    }

    #[test]
    fn wrong_jsonrpc_version_is_an_invalid_request() {
        let err = parse_request(r#"{"jsonrpc":"1.0","method":"x","id":"1"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRequest(_)));
    }
}
