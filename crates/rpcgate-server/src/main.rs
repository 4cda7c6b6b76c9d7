//! rpcgate server binary.
//!
//! - Config path: first CLI argument, default `rpcgate.yaml`
//! - TCP listener for line-delimited requests, optional HTTP ingress
//! - Ctrl-C stops accepting and drains both listeners

use std::process::ExitCode;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use rpcgate_core::error::{Result, RpcError};
use rpcgate_server::{app_state::AppState, config, router, transport};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "rpcgate-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "rpcgate.yaml".into());
    let cfg = config::load_from_file(&path)?;
    let state = AppState::new(cfg)?;

    let (stop_tx, stop_rx) = watch::channel(false);
    let stopped = |mut rx: watch::Receiver<bool>| async move {
        let _ = rx.wait_for(|s| *s).await;
    };

    let listen = state.cfg().server.listen.clone();
    let tcp = TcpListener::bind(&listen)
        .await
        .map_err(|e| RpcError::Internal(format!("bind {listen} failed: {e}")))?;
    let tcp_task = tokio::spawn(transport::tcp::serve(state.clone(), tcp, stopped(stop_rx.clone())));

    let http_task = match state.cfg().server.http_listen.clone() {
        Some(addr) => {
            let listener = TcpListener::bind(&addr)
                .await
                .map_err(|e| RpcError::Internal(format!("bind {addr} failed: {e}")))?;
            tracing::info!(%addr, "http transport listening");
            let app = router::build_router(state.clone());
            let shutdown = stopped(stop_rx.clone());
            Some(tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown)
                    .await
                    .map_err(|e| RpcError::Internal(format!("http server failed: {e}")))
            }))
        }
        None => None,
    };

    tracing::info!("rpcgate-server started, Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| RpcError::Internal(format!("signal handler failed: {e}")))?;

    tracing::info!("shutting down");
    state.metrics().set_draining();
    let _ = stop_tx.send(true);

    let join = |e: tokio::task::JoinError| RpcError::Internal(format!("transport task failed: {e}"));
    tcp_task.await.map_err(join)??;
    if let Some(task) = http_task {
        task.await.map_err(join)??;
    }
    tracing::info!("server stopped");
    Ok(())
}
