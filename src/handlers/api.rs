//! JSON API handlers.
//!
//! Collector calls that block (the CPU sampling window, `statvfs` on every
//! mount) run on tokio's blocking pool so they never stall the runtime.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Handler for `/api/dynamic`. Takes at least one sampling window.
#[instrument(skip(state))]
pub async fn dynamic_handler(State(state): State<SharedState>) -> Response {
    debug!("Processing /api/dynamic request");
    state.health_stats.record_http_request();

    let telemetry = Arc::clone(&state.telemetry);
    match tokio::task::spawn_blocking(move || telemetry.get_dynamic()).await {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            error!("Dynamic sample task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handler for `/api/static`. Returns the current snapshot as-is.
#[instrument(skip(state))]
pub async fn static_handler(State(state): State<SharedState>) -> Response {
    debug!("Processing /api/static request");
    state.health_stats.record_http_request();

    let info = state.telemetry.get_static();
    Json(&*info).into_response()
}

/// Handler for `/api/static/refresh`.
#[instrument(skip(state))]
pub async fn refresh_static_handler(State(state): State<SharedState>) -> Response {
    debug!("Processing /api/static/refresh request");
    state.health_stats.record_http_request();

    let telemetry = Arc::clone(&state.telemetry);
    match tokio::task::spawn_blocking(move || telemetry.refresh_static()).await {
        Ok(info) => Json(&*info).into_response(),
        Err(e) => {
            error!("Static refresh task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
