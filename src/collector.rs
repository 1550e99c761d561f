//! Telemetry collector: owns the static snapshot and the dynamic sampler.
//!
//! The snapshot lives behind `RwLock<Arc<StaticInfo>>`. A refresh computes the
//! new value with no lock held and then swaps the pointer; readers clone the
//! `Arc` and therefore always see one complete snapshot, old or new.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::health_stats::HealthStats;
use crate::model::{DynamicInfo, StaticInfo};
use crate::sampler::Sampler;
use crate::snapshot::compute_static;
use crate::sources::MetricSource;

/// Read API used by the HTTP layer.
///
/// Handlers depend on this trait rather than on [`TelemetryCollector`] so that
/// tests can serve canned data.
pub trait Telemetry: Send + Sync {
    /// Current snapshot, without recomputation.
    fn get_static(&self) -> Arc<StaticInfo>;

    /// Recomputes and publishes a new snapshot, returning it.
    fn refresh_static(&self) -> Arc<StaticInfo>;

    /// Takes a fresh dynamic sample. Blocks for the sampling window.
    fn get_dynamic(&self) -> DynamicInfo;
}

pub struct TelemetryCollector {
    source: Arc<dyn MetricSource>,
    snapshot: RwLock<Arc<StaticInfo>>,
    sampler: Sampler,
    stats: Arc<HealthStats>,
}

impl TelemetryCollector {
    /// Builds the collector and computes the initial snapshot.
    pub fn new(
        source: Arc<dyn MetricSource>,
        sample_interval: Duration,
        stats: Arc<HealthStats>,
    ) -> Self {
        let initial = Self::build_snapshot(source.as_ref(), &stats);
        info!(
            "Initial snapshot: {} ({}), {} disk(s), {:.2} GiB RAM",
            initial.hostname,
            initial.os,
            initial.disks.len(),
            initial.ram_total_gib
        );

        Self {
            source,
            snapshot: RwLock::new(Arc::new(initial)),
            sampler: Sampler::new(sample_interval),
            stats,
        }
    }

    pub fn stats(&self) -> &Arc<HealthStats> {
        &self.stats
    }

    pub fn sample_interval(&self) -> Duration {
        self.sampler.interval()
    }

    fn build_snapshot(source: &dyn MetricSource, stats: &HealthStats) -> StaticInfo {
        let start = Instant::now();
        let info = compute_static(source, stats);
        stats.record_static_refresh(start.elapsed().as_secs_f64());
        info
    }
}

impl Telemetry for TelemetryCollector {
    fn get_static(&self) -> Arc<StaticInfo> {
        // The lock only guards a pointer swap, so a poisoned lock still holds a
        // complete snapshot.
        let guard = self
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    fn refresh_static(&self) -> Arc<StaticInfo> {
        let fresh = Arc::new(Self::build_snapshot(self.source.as_ref(), &self.stats));

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&fresh);
        drop(guard);

        debug!("Static snapshot refreshed: {} disk(s)", fresh.disks.len());
        fresh
    }

    fn get_dynamic(&self) -> DynamicInfo {
        let start = Instant::now();
        let info = self.sampler.sample(self.source.as_ref(), &self.stats);
        self.stats.record_dynamic_sample(start.elapsed().as_secs_f64());
        info
    }
}
