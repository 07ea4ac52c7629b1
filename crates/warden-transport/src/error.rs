//! Transport-level errors, distinct from [`warden_protocol::ProtocolError`]:
//! these describe framing and I/O failures, not protocol semantics.

use thiserror::Error;

/// Failures that can occur while reading or writing frames on a connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying socket or stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A length-prefixed frame declared a size larger than the configured
    /// maximum, or a zero/invalid size.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The connection closed before a complete frame was read.
    #[error("connection closed")]
    Closed,

    /// Binding the listener to its address failed.
    #[error("bind failed: {0}")]
    Bind(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
