//! Static snapshot computation.
//!
//! [`compute_static`] never fails. Each field is probed on its own and falls
//! back to an empty string / zero if its probe fails; each partition is probed
//! on its own and omitted if its usage cannot be read.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::ProbeError;
use crate::health_stats::HealthStats;
use crate::model::{bytes_to_gib, DiskInfo, StaticInfo};
use crate::sources::{MetricSource, Partition};

/// Unwraps a probe result, logging and counting the failure.
pub(crate) fn absorb<T>(
    what: &str,
    result: Result<T, ProbeError>,
    stats: &HealthStats,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            stats.record_probe_error(&e);
            if e.is_expected() {
                debug!("{} unavailable: {}", what, e);
            } else {
                warn!("{} probe failed: {}", what, e);
            }
            None
        }
    }
}

/// Builds a complete [`StaticInfo`] from `source`.
pub fn compute_static(source: &dyn MetricSource, stats: &HealthStats) -> StaticInfo {
    let os = absorb("os release", source.os_release(), stats)
        .map(|(system, release)| format!("{} {}", system, release).trim().to_string())
        .unwrap_or_default();
    let hostname = absorb("hostname", source.hostname(), stats).unwrap_or_default();
    let processor = absorb("processor brand", source.processor_brand(), stats).unwrap_or_default();
    let arch = absorb("architecture", source.arch(), stats).unwrap_or_default();
    let ram_total_gib = absorb("memory", source.memory(), stats)
        .map(|mem| bytes_to_gib(mem.total_bytes))
        .unwrap_or(0.0);

    let partitions = absorb("partitions", source.partitions(), stats).unwrap_or_default();
    let disks = collect_disks(source, &partitions, stats);

    StaticInfo {
        os,
        hostname,
        processor,
        arch,
        ram_total_gib,
        disks,
    }
}

/// Reads usage of every partition, dropping the unreadable ones.
///
/// Reads run in parallel since `statvfs` on an unresponsive network mount can
/// block; the indexed collect keeps mount-table order.
fn collect_disks(
    source: &dyn MetricSource,
    partitions: &[Partition],
    stats: &HealthStats,
) -> Vec<DiskInfo> {
    let usages: Vec<_> = partitions
        .par_iter()
        .map(|partition| source.disk_usage(partition))
        .collect();

    partitions
        .iter()
        .zip(usages)
        .filter_map(|(partition, usage)| {
            let what = format!("disk usage of {}", partition.mountpoint);
            match absorb(&what, usage, stats) {
                Some(usage) => Some(DiskInfo {
                    device: partition.device.clone(),
                    mountpoint: partition.mountpoint.clone(),
                    total_gib: bytes_to_gib(usage.total_bytes),
                    used_percent: usage.used_percent(),
                }),
                None => {
                    stats.record_disk_skipped();
                    None
                }
            }
        })
        .collect()
}
