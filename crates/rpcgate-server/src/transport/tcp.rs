//! TCP transport.
//!
//! Per connection: read one request line, dispatch, write one response line,
//! close. Connection lifecycle (listen, connect, error, close, stop) is
//! logged here and never reaches the dispatcher.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use rpcgate_core::error::{Result, RpcError};
use rpcgate_core::protocol::codec::encode_response;

use crate::app_state::AppState;
use crate::transport::codec::{discard_line, read_frame, write_frame};

const TRANSPORT: &str = "tcp";
/// Closing with unread input sends RST; drain up to this many frames' worth
/// of an oversized line before answering.
const DRAIN_FACTOR: usize = 4;
const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn serve<F>(app: AppState, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let local = listener
        .local_addr()
        .map_err(|e| RpcError::Internal(format!("local_addr failed: {e}")))?;
    tracing::info!(%local, "tcp transport listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let app = app.clone();
                    tokio::spawn(async move {
                        app.metrics().connections_active.inc(&[("transport", TRANSPORT)]);
                        if let Err(e) = handle_connection(&app, stream, peer).await {
                            tracing::warn!(%peer, error = %e, "connection error");
                        }
                        app.metrics().connections_active.dec(&[("transport", TRANSPORT)]);
                    });
                }
                Err(e) => tracing::error!(error = %e, "accept failed"),
            }
        }
    }

    tracing::info!(%local, "tcp transport stopped");
    Ok(())
}

async fn handle_connection(app: &AppState, stream: TcpStream, peer: SocketAddr) -> Result<()> {
    tracing::debug!(%peer, "connection opened");
    let (rd, mut wr) = stream.into_split();
    let mut rd = BufReader::new(rd);

    let out = match read_frame(&mut rd, app.cfg().server.max_frame_bytes).await {
        Ok(Some(frame)) => app.handle_frame(&frame, TRANSPORT)?,
        Ok(None) => {
            tracing::debug!(%peer, "closed without request");
            return Ok(());
        }
        Err(e @ RpcError::PayloadTooLarge { .. }) => {
            let limit = app.cfg().server.max_frame_bytes.saturating_mul(DRAIN_FACTOR);
            match tokio::time::timeout(DRAIN_TIMEOUT, discard_line(&mut rd, limit)).await {
                Ok(Ok(dropped)) => tracing::debug!(%peer, dropped, "oversized frame drained"),
                Ok(Err(err)) => tracing::debug!(%peer, error = %err, "oversized frame drain failed"),
                Err(_) => tracing::debug!(%peer, "oversized frame drain timed out"),
            }
            encode_response(&app.reject(&e, TRANSPORT))?
        }
        Err(e) => return Err(e),
    };

    write_frame(&mut wr, &out).await?;
    tracing::debug!(%peer, "connection closed");
    Ok(())
}
