//! Convenience re-exports for crates consuming `warden-transport`.

pub use crate::error::{TransportError, TransportResult};
pub use crate::stdio::serve_stdio;
pub use crate::tcp::serve_tcp;
pub use crate::websocket::{router as websocket_router, serve_websocket};
