//! Method registration and request dispatch.
//!
//! A [`Dispatcher`] owns one [`ProtocolStateMachine`] and a shared
//! [`MethodTable`]; transports construct a fresh dispatcher per connection
//! and feed it raw request text, receiving back the JSON to write out (or
//! `None` for a notification that produced no reply).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::{parse_request, RpcEnvelope, RpcError, RpcErrorResponse, RpcResponse};
use crate::state::ProtocolStateMachine;

/// Implemented by every built-in or embedder-registered RPC method.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Handle one call, returning the JSON value to place in `result`.
    ///
    /// # Errors
    ///
    /// Any [`ProtocolError`] this returns is mapped straight to its on-wire
    /// code and placed in the response's `error` object.
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError>;
}

/// A table of method name to handler, shared read-only across every
/// connection once the server has finished registering its methods.
#[derive(Default)]
pub struct MethodTable {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
}

impl MethodTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `method`. Returns `false` without
    /// registering if the name is already taken.
    pub fn register(&mut self, method: impl Into<String>, handler: Arc<dyn MethodHandler>) -> bool {
        let method = method.into();
        if self.handlers.contains_key(&method) {
            return false;
        }
        self.handlers.insert(method, handler);
        true
    }

    /// Look up a handler by method name.
    #[must_use]
    pub fn get(&self, method: &str) -> Option<Arc<dyn MethodHandler>> {
        self.handlers.get(method).cloned()
    }

    /// The set of registered method names, primarily for diagnostics.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

/// Drives one connection's protocol state machine and method dispatch.
pub struct Dispatcher {
    state: ProtocolStateMachine,
    methods: Arc<MethodTable>,
}

impl Dispatcher {
    /// Build a fresh dispatcher against a shared method table.
    #[must_use]
    pub fn new(methods: Arc<MethodTable>) -> Self {
        Self {
            state: ProtocolStateMachine::new(),
            methods,
        }
    }

    /// The connection's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> crate::state::ConnectionState {
        self.state.state()
    }

    /// Parse, validate, and dispatch one raw request line.
    ///
    /// Returns `Ok(None)` for a valid notification (no reply is sent).
    /// Parse and request-shape failures that leave the id unrecoverable
    /// still produce a best-effort error envelope per the JSON-RPC spec.
    pub async fn dispatch(&mut self, raw: &str) -> Option<RpcEnvelope> {
        let request = match parse_request(raw) {
            Ok(request) => request,
            Err(e) => return Some(self.error_envelope(Value::Null, e)),
        };

        let id = request.id.clone().unwrap_or(Value::Null);

        if let Err(e) = self.state.check(&request.method) {
            if request.is_notification() {
                return None;
            }
            return Some(self.error_envelope(id, e));
        }

        let Some(handler) = self.methods.get(&request.method) else {
            if request.is_notification() {
                return None;
            }
            return Some(self.error_envelope(
                id,
                ProtocolError::MethodNotFound(request.method.clone()),
            ));
        };

        let result = handler.handle(request.params).await;
        self.state.advance(&request.method);

        if request.is_notification() {
            return None;
        }

        Some(match result {
            Ok(value) => RpcEnvelope::Success(RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: value,
                id,
            }),
            Err(e) => self.error_envelope(id, e),
        })
    }

    fn error_envelope(&self, id: Value, error: ProtocolError) -> RpcEnvelope {
        RpcEnvelope::Error(RpcErrorResponse {
            jsonrpc: "2.0".to_string(),
            error: error.into_rpc_error(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl MethodHandler for Echo {
        async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
            Ok(params.unwrap_or(Value::Null))
        }
    }

    struct AlwaysDenied;

    #[async_trait]
    impl MethodHandler for AlwaysDenied {
        async fn handle(&self, _params: Option<Value>) -> Result<Value, ProtocolError> {
            Err(ProtocolError::PermissionDenied("nope".to_string()))
        }
    }

    fn table() -> Arc<MethodTable> {
        let mut table = MethodTable::new();
        table.register("initialize", Arc::new(Echo));
        table.register("echo", Arc::new(Echo));
        table.register("denied", Arc::new(AlwaysDenied));
        Arc::new(table)
    }

    #[tokio::test]
    async fn rejects_methods_before_initialize() {
        let mut dispatcher = Dispatcher::new(table());
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"echo","id":1}"#)
            .await
            .unwrap();
        match envelope {
            RpcEnvelope::Error(e) => assert_eq!(e.error.code, -32600),
            RpcEnvelope::Success(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn initialize_then_echo_succeeds() {
        let mut dispatcher = Dispatcher::new(table());
        dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"echo","params":{"a":1},"id":2}"#)
            .await
            .unwrap();
        match envelope {
            RpcEnvelope::Success(r) => assert_eq!(r.result, serde_json::json!({"a": 1})),
            RpcEnvelope::Error(e) => panic!("unexpected error: {e:?}"),
        }
    }

    #[tokio::test]
    async fn notification_produces_no_reply() {
        let mut dispatcher = Dispatcher::new(table());
        dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"echo","params":{}}"#)
            .await;
        assert!(envelope.is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let mut dispatcher = Dispatcher::new(table());
        dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"nope","id":2}"#)
            .await
            .unwrap();
        match envelope {
            RpcEnvelope::Error(e) => assert_eq!(e.error.code, -32601),
            RpcEnvelope::Success(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn handler_error_is_mapped_to_its_code() {
        let mut dispatcher = Dispatcher::new(table());
        dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"denied","id":2}"#)
            .await
            .unwrap();
        match envelope {
            RpcEnvelope::Error(e) => assert_eq!(e.error.code, -32102),
            RpcEnvelope::Success(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn double_initialize_is_invalid_state() {
        let mut dispatcher = Dispatcher::new(table());
        dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
            .await
            .unwrap();
        let envelope = dispatcher
            .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":2}"#)
            .await
            .unwrap();
        match envelope {
            RpcEnvelope::Error(e) => assert_eq!(e.error.code, -32104),
            RpcEnvelope::Success(_) => panic!("expected error"),
        }
    }
}
