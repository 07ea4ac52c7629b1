//! Transport-agnostic JSON-RPC 2.0 protocol: message shapes, the
//! `fresh -> initialized -> fresh` connection lifecycle (`shutdown` returns
//! a connection to `fresh`), and method dispatch against a shared
//! [`dispatch::MethodTable`].
//!
//! # Example
//!
//! ```
//! # use std::sync::Arc;
//! # use async_trait::async_trait;
//! # use serde_json::Value;
//! # use warden_protocol::{Dispatcher, MethodHandler, MethodTable, ProtocolError, RpcEnvelope};
//! struct Ping;
//!
//! #[async_trait]
//! impl MethodHandler for Ping {
//!     async fn handle(&self, _params: Option<Value>) -> Result<Value, ProtocolError> {
//!         Ok(serde_json::json!("pong"))
//!     }
//! }
//!
//! # async fn run() {
//! let mut table = MethodTable::new();
//! table.register("initialize", Arc::new(Ping));
//! table.register("ping", Arc::new(Ping));
//!
//! let mut dispatcher = Dispatcher::new(Arc::new(table));
//! dispatcher
//!     .dispatch(r#"{"jsonrpc":"2.0","method":"initialize","id":1}"#)
//!     .await;
//! let reply = dispatcher
//!     .dispatch(r#"{"jsonrpc":"2.0","method":"ping","id":2}"#)
//!     .await
//!     .unwrap();
//! assert!(matches!(reply, RpcEnvelope::Success(_)));
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod dispatch;
pub mod error;
pub mod message;
pub mod prelude;
pub mod state;

pub use dispatch::{Dispatcher, MethodHandler, MethodTable};
pub use error::{ExecutionErrorKind, ProtocolError};
pub use message::{parse_request, RpcEnvelope, RpcError, RpcErrorResponse, RpcRequest, RpcResponse};
pub use state::{ConnectionState, ProtocolStateMachine};
