//! Front-end transports for the protocol: line-framed stdio, length-prefixed
//! TCP, and axum-upgraded WebSocket. Every transport constructs its own
//! [`warden_protocol::Dispatcher`] per connection and shares one
//! [`warden_protocol::MethodTable`], so adding a transport never touches
//! method dispatch.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod framing;
pub mod prelude;
pub mod stdio;
pub mod tcp;
pub mod websocket;

pub use error::{TransportError, TransportResult};
pub use stdio::serve_stdio;
pub use tcp::serve_tcp;
pub use websocket::{router as websocket_router, serve_websocket};
