//! Dynamic sampling.
//!
//! [`Sampler::sample`] blocks the calling thread for the CPU sampling window
//! (1 s by default). Call it from a blocking-capable thread, never directly
//! from an async task.

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::health_stats::HealthStats;
use crate::model::{round1, DynamicInfo, GpuInfo};
use crate::snapshot::absorb;
use crate::sources::{MetricSource, RawGpu};

/// Default CPU sampling window.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Takes dynamic samples with a fixed CPU measurement window.
pub struct Sampler {
    interval: Duration,
    /// Serializes whole windows for sources with a single global baseline.
    baseline_gate: Mutex<()>,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL)
    }
}

impl Sampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            baseline_gate: Mutex::new(()),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Produces a fresh [`DynamicInfo`]. Never fails; broken probes yield 0 / empty.
    pub fn sample(&self, source: &dyn MetricSource, stats: &HealthStats) -> DynamicInfo {
        let cpu_usage_percent = self.sample_cpu(source, stats);
        let ram_usage_percent = absorb("memory usage", source.memory(), stats)
            .map(|mem| mem.used_percent())
            .unwrap_or(0.0);
        let gpus = absorb("gpus", source.gpus(), stats)
            .map(|raw| raw.into_iter().map(normalize_gpu).collect())
            .unwrap_or_default();

        DynamicInfo {
            cpu_usage_percent,
            ram_usage_percent,
            gpus,
        }
    }

    /// Measures CPU busy percentage over one window.
    ///
    /// The window is waited out even if the baseline read fails, so callers see
    /// the same latency regardless of probe health.
    fn sample_cpu(&self, source: &dyn MetricSource, stats: &HealthStats) -> f64 {
        let _guard = if source.shared_cpu_baseline() {
            // A poisoned gate still serializes; the guarded data is ()
            Some(
                self.baseline_gate
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            )
        } else {
            None
        };

        let before = absorb("cpu times (baseline)", source.cpu_times(), stats);
        thread::sleep(self.interval);
        let after = absorb("cpu times", source.cpu_times(), stats);

        match (before, after) {
            (Some(before), Some(after)) => after.busy_percent_since(&before),
            _ => {
                debug!("CPU usage unavailable for this window, reporting 0");
                0.0
            }
        }
    }
}

/// Converts a raw driver reading to the reported schema.
pub fn normalize_gpu(raw: RawGpu) -> GpuInfo {
    GpuInfo {
        name: raw.name,
        load_percent: round1(raw.load_fraction * 100.0),
        temperature_c: raw.temperature_c,
        mem_used_mib: raw.mem_used_mib,
        mem_total_mib: raw.mem_total_mib,
    }
}
