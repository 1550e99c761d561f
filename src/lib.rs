//! hostwatch library
//!
//! Collects host telemetry (OS identity, processor, memory, disks, GPUs) and
//! serves it over HTTP for a browser dashboard.
//!
//! # Components
//!
//! - **Sources** ([`sources`]): fallible per-metric probes behind [`MetricSource`]
//! - **Static snapshot** ([`snapshot`]): rarely-changing facts, computed at startup and on refresh
//! - **Dynamic sampler** ([`sampler`]): CPU/RAM/GPU utilization, computed per request
//! - **Collector** ([`collector`]): owns both and publishes snapshots atomically
//! - **HTTP surface** ([`handlers`]): axum router over the [`Telemetry`] trait
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use hostwatch::{HealthStats, LinuxSource, Telemetry, TelemetryCollector};
//!
//! let collector = TelemetryCollector::new(
//!     Arc::new(LinuxSource::new()),
//!     Duration::from_secs(1),
//!     Arc::new(HealthStats::new()),
//! );
//!
//! let snapshot = collector.get_static();
//! println!("{} running {}", snapshot.hostname, snapshot.os);
//!
//! // Blocks for the one second sampling window
//! let sample = collector.get_dynamic();
//! println!("CPU {:.1}%", sample.cpu_usage_percent);
//! ```

pub mod collector;
pub mod error;
pub mod handlers;
pub mod health_stats;
pub mod model;
pub mod sampler;
pub mod snapshot;
pub mod sources;
pub mod state;

// Re-export main types for convenience
pub use collector::{Telemetry, TelemetryCollector};
pub use error::ProbeError;
pub use health_stats::HealthStats;
pub use model::{DiskInfo, DynamicInfo, GpuInfo, StaticInfo};
pub use sampler::Sampler;
pub use sources::{LinuxSource, MetricSource};
pub use state::{AppState, SharedState};
