//! Line framing for the TCP transport.
//!
//! One frame is one `\n`-terminated JSON document. Reads are bounded so an
//! endless line cannot grow the buffer past `max_frame_bytes`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use rpcgate_core::error::{Result, RpcError};

/// Read one frame. `Ok(None)` means the peer closed before sending anything.
pub async fn read_frame<R>(reader: &mut R, max_frame_bytes: usize) -> Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    // +1 so a line of exactly `max_frame_bytes` still fits its terminator
    let limit = (max_frame_bytes as u64).saturating_add(1);
    let n = (&mut *reader)
        .take(limit)
        .read_until(b'\n', &mut buf)
        .await
        .map_err(|e| RpcError::Internal(format!("read failed: {e}")))?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.len() > max_frame_bytes {
        return Err(RpcError::PayloadTooLarge {
            size: buf.len(),
            max: max_frame_bytes,
        });
    }
    Ok(Some(buf))
}

/// Skip the remainder of the current line, reading at most `limit` bytes.
/// Returns how many bytes were dropped.
pub async fn discard_line<R>(reader: &mut R, limit: usize) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut dropped = 0;
    while dropped < limit {
        let chunk = reader
            .fill_buf()
            .await
            .map_err(|e| RpcError::Internal(format!("read failed: {e}")))?;
        if chunk.is_empty() {
            break;
        }
        let window = &chunk[..chunk.len().min(limit - dropped)];
        let (n, done) = match window.iter().position(|b| *b == b'\n') {
            Some(i) => (i + 1, true),
            None => (window.len(), false),
        };
        reader.consume(n);
        dropped += n;
        if done {
            break;
        }
    }
    Ok(dropped)
}

/// Write one frame followed by `\n`.
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let io = |e: std::io::Error| RpcError::Internal(format!("write failed: {e}"));
    writer.write_all(frame).await.map_err(io)?;
    writer.write_all(b"\n").await.map_err(io)?;
    writer.flush().await.map_err(io)
}
