//! Shared 4-byte big-endian length-prefixed framing, used by the TCP
//! transport. Caps frame size to guard against a malicious or broken peer
//! requesting an unbounded allocation.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{TransportError, TransportResult};

/// Frames larger than this are rejected outright.
pub const MAX_FRAME_BYTES: u32 = 10 * 1024 * 1024;

/// Read one length-prefixed frame, returning its payload as UTF-8 text.
///
/// # Errors
///
/// Returns [`TransportError::Closed`] on a clean EOF before any bytes of the
/// next frame arrive, [`TransportError::InvalidFrame`] if the declared
/// length exceeds [`MAX_FRAME_BYTES`] or the payload is not valid UTF-8, and
/// [`TransportError::Io`] for any other I/O failure.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> TransportResult<String> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(TransportError::Closed);
        }
        Err(e) => return Err(TransportError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf);
    if len == 0 || len > MAX_FRAME_BYTES {
        return Err(TransportError::InvalidFrame(format!(
            "declared frame length {len} out of bounds"
        )));
    }

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload).await?;
    String::from_utf8(payload)
        .map_err(|e| TransportError::InvalidFrame(format!("payload was not utf-8: {e}")))
}

/// Write one length-prefixed frame.
///
/// # Errors
///
/// Returns [`TransportError::InvalidFrame`] if `payload` exceeds
/// [`MAX_FRAME_BYTES`], or [`TransportError::Io`] on a write failure.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &str) -> TransportResult<()> {
    let bytes = payload.as_bytes();
    if bytes.len() > MAX_FRAME_BYTES as usize {
        return Err(TransportError::InvalidFrame(
            "outgoing frame exceeds maximum size".to_string(),
        ));
    }
    let len = u32::try_from(bytes.len()).unwrap_or(u32::MAX);
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(bytes).await?;
    writer.flush().await?;
    Ok(())
}
