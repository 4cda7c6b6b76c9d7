//! HTTP ingress: `POST /v1/rpc` with the request envelope as body.
//!
//! Dispatch outcomes (including permission and method errors) are `200 OK`
//! with the error inside the envelope; only an encode failure is a 500.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn rpc(State(app): State<AppState>, body: Bytes) -> Response {
    match app.handle_frame(&body, "http") {
        Ok(out) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            out,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "response encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.client_code().as_str()).into_response()
        }
    }
}
