//! Line-framed stdio transport: one JSON-RPC request per line on stdin, one
//! reply per line on stdout. Intended for a process launched and owned by a
//! single client, so there is exactly one connection and one dispatcher for
//! the process's lifetime.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};
use warden_protocol::{Dispatcher, MethodTable};

/// Run the stdio transport to completion, reading requests from `stdin`
/// until it closes (EOF) and writing replies to `stdout`.
///
/// # Errors
///
/// Returns [`crate::error::TransportError::Io`] if reading from stdin or
/// writing to stdout fails.
pub async fn serve_stdio(methods: Arc<MethodTable>) -> crate::error::TransportResult<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();
    let mut dispatcher = Dispatcher::new(methods);

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!(request = %line, "stdio: received request");
        match dispatcher.dispatch(&line).await {
            Some(envelope) => match envelope.to_json() {
                Ok(json) => {
                    stdout.write_all(json.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Err(e) => warn!(error = %e, "failed to serialize response"),
            },
            None => debug!("stdio: notification produced no reply"),
        }
    }

    Ok(())
}
