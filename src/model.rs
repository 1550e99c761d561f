//! Telemetry data model.
//!
//! All JSON field names are snake_case with the unit in the name
//! (`ram_total_gib`, `temperature_c`, ...). GiB values are rounded to two
//! decimal places when the snapshot is built, so the stored value and the
//! serialized value are the same.

use serde::{Deserialize, Serialize};

/// Bytes per gibibyte.
pub const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Facts that only change with hardware or OS changes.
///
/// Built once at collector construction and replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticInfo {
    /// `"{system} {release}"`, e.g. `"Linux 6.8.0"`.
    pub os: String,
    pub hostname: String,
    /// CPU brand string; empty when the CPU cannot be identified.
    pub processor: String,
    /// Machine architecture, e.g. `x86_64`.
    pub arch: String,
    pub ram_total_gib: f64,
    /// Readable partitions in mount-table order.
    pub disks: Vec<DiskInfo>,
}

/// Capacity and usage of one mounted partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub total_gib: f64,
    pub used_percent: f64,
}

/// Volatile metrics, recomputed on every request.
///
/// Percentages are 0-100 as reported by the sources and are not re-clamped
/// here; some GPU drivers are known to overshoot, so strict consumers should
/// clamp on their side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DynamicInfo {
    pub cpu_usage_percent: f64,
    pub ram_usage_percent: f64,
    /// GPUs in enumeration order; empty when none are present.
    pub gpus: Vec<GpuInfo>,
}

/// Utilization of one GPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub name: String,
    pub load_percent: f64,
    pub temperature_c: f64,
    pub mem_used_mib: f64,
    pub mem_total_mib: f64,
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Converts a byte count to GiB rounded to two decimal places.
pub fn bytes_to_gib(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_GIB)
}

/// Percentage of `part` in `whole`, rounded to one decimal place; 0 for an empty whole.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}
