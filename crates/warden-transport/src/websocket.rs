//! WebSocket transport: an axum router exposing one upgrade endpoint, with
//! one dispatcher per upgraded connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};
use warden_protocol::{Dispatcher, MethodTable};

use crate::error::{TransportError, TransportResult};

/// Build the router mounting the upgrade endpoint at `path`.
#[must_use]
pub fn router(path: &str, methods: Arc<MethodTable>) -> Router {
    Router::new().route(path, get(upgrade)).with_state(methods)
}

/// Bind `addr` and serve the WebSocket router until the process is stopped.
///
/// # Errors
///
/// Returns [`TransportError::Bind`] if the listener cannot be bound, or
/// [`TransportError::Io`] if serving the accepted connections fails.
pub async fn serve_websocket(
    addr: &str,
    path: &str,
    methods: Arc<MethodTable>,
) -> TransportResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::Bind(e.to_string()))?;
    tracing::info!(%addr, %path, "websocket transport listening");
    axum::serve(listener, router(path, methods))
        .await
        .map_err(TransportError::Io)?;
    Ok(())
}

async fn upgrade(
    State(methods): State<Arc<MethodTable>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, methods))
}

async fn handle_socket(socket: WebSocket, methods: Arc<MethodTable>) {
    let (mut sender, mut receiver) = socket.split();
    let mut dispatcher = Dispatcher::new(methods);

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "websocket: receive error");
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Binary(_) => continue,
        };

        debug!(request = %text, "websocket: received request");
        let Some(envelope) = dispatcher.dispatch(&text).await else {
            continue;
        };

        let json = match envelope.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                continue;
            }
        };

        if sender.send(Message::Text(json)).await.is_err() {
            break;
        }
    }
}
