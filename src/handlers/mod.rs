//! HTTP endpoint handlers.
//!
//! - `/`: dashboard page with the current static snapshot
//! - `/api/dynamic`: fresh dynamic sample (JSON)
//! - `/api/static`: current static snapshot (JSON)
//! - `/api/static/refresh`: recompute and return the static snapshot (JSON)
//! - `/health`: service statistics (text)

pub mod api;
pub mod health;
pub mod root;

use axum::{routing::get, Router};

pub use api::{dynamic_handler, refresh_static_handler, static_handler};
pub use health::health_handler;
pub use root::root_handler;

use crate::state::SharedState;

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/api/dynamic", get(dynamic_handler))
        .route("/api/static", get(static_handler))
        .route("/api/static/refresh", get(refresh_static_handler));

    if state.enable_health {
        app = app.route("/health", get(health_handler));
    }

    app.with_state(state)
}
