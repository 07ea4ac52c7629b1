//! TCP transport: one [`warden_protocol::Dispatcher`] per accepted
//! connection, frames read and written via [`crate::framing`].

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use warden_protocol::{Dispatcher, MethodTable};

use crate::error::{TransportError, TransportResult};
use crate::framing::{read_frame, write_frame};

/// Bind `addr` and serve connections until the process is stopped.
/// Each accepted connection runs on its own task and gets its own
/// dispatcher, so one client's protocol state never leaks into another's.
///
/// # Errors
///
/// Returns [`TransportError::Bind`] if the listener cannot be bound.
pub async fn serve_tcp(addr: &str, methods: Arc<MethodTable>) -> TransportResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::Bind(e.to_string()))?;
    info!(%addr, "tcp transport listening");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let methods = Arc::clone(&methods);
                debug!(%peer, "tcp: accepted connection");
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, methods).await {
                        warn!(%peer, error = %e, "tcp connection ended with an error");
                    }
                });
            }
            Err(e) => warn!(error = %e, "tcp: failed to accept connection"),
        }
    }
}

async fn handle_connection(stream: TcpStream, methods: Arc<MethodTable>) -> TransportResult<()> {
    let (mut read_half, mut write_half) = stream.into_split();
    let mut dispatcher = Dispatcher::new(methods);

    loop {
        let frame = match read_frame(&mut read_half).await {
            Ok(frame) => frame,
            Err(TransportError::Closed) => return Ok(()),
            Err(e) => return Err(e),
        };

        if let Some(envelope) = dispatcher.dispatch(&frame).await {
            let json = envelope
                .to_json()
                .map_err(|e| TransportError::InvalidFrame(e.to_string()))?;
            write_frame(&mut write_half, &json).await?;
        }
    }
}
