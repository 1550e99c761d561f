//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use crate::collector::Telemetry;
use crate::health_stats::HealthStats;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// State passed to every handler through axum's `State` extractor.
pub struct AppState {
    /// The collector, behind the trait so tests can swap in a fake.
    pub telemetry: Arc<dyn Telemetry>,
    pub health_stats: Arc<HealthStats>,
    /// Expose `/health`.
    pub enable_health: bool,
}

impl AppState {
    pub fn new(telemetry: Arc<dyn Telemetry>, health_stats: Arc<HealthStats>) -> Self {
        Self {
            telemetry,
            health_stats,
            enable_health: true,
        }
    }
}
