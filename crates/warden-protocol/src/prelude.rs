//! Convenience re-exports for crates consuming `warden-protocol`.

pub use crate::dispatch::{Dispatcher, MethodHandler, MethodTable};
pub use crate::error::{ExecutionErrorKind, ProtocolError};
pub use crate::message::{
    parse_request, RpcEnvelope, RpcError, RpcErrorResponse, RpcRequest, RpcResponse,
};
pub use crate::state::{ConnectionState, ProtocolStateMachine};
