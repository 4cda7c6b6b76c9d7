//! Axum router wiring (HTTP ingress + ops).

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    // up to 4 KiB over the frame limit the codec answers; beyond that axum 413s
    let body_limit = state.cfg().server.max_frame_bytes.saturating_add(4096);

    Router::new()
        .route("/v1/rpc", post(transport::http::rpc))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
