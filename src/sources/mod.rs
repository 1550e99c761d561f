//! Metric sources.
//!
//! A [`MetricSource`] is the boundary between the collector and the operating
//! system. Each method is a single, independently fallible probe so that the
//! snapshot and sampler can degrade one field at a time.
//!
//! - [`procfs`]: parsers for `/proc/meminfo`, `/proc/stat`, `/proc/cpuinfo`, `/proc/mounts`
//! - [`filesystem`]: partition enumeration and `statvfs` usage
//! - [`gpu`]: GPU enumeration through `nvidia-smi`
//! - [`linux`]: the production [`LinuxSource`]

pub mod filesystem;
pub mod gpu;
pub mod linux;
pub mod procfs;

pub use linux::LinuxSource;

use crate::error::ProbeError;

/// A mounted partition as listed by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

/// Space accounting for one partition, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    /// Space available to unprivileged users.
    pub available_bytes: u64,
}

impl DiskUsage {
    /// Used percentage as seen by an unprivileged user.
    ///
    /// Reserved blocks are excluded from the denominator, which matches what
    /// `df` prints.
    pub fn used_percent(&self) -> f64 {
        crate::model::percent_of(
            self.used_bytes,
            self.used_bytes.saturating_add(self.available_bytes),
        )
    }
}

/// System-wide CPU time counters (in clock ticks).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Total CPU time across all fields.
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Non-busy time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }

    /// Busy percentage between an earlier reading and this one.
    ///
    /// Returns 0.0 if no time elapsed or the counters went backwards.
    pub fn busy_percent_since(&self, earlier: &CpuTimes) -> f64 {
        let delta_total = self.total().saturating_sub(earlier.total());
        if delta_total == 0 {
            return 0.0;
        }
        let delta_idle = self.idle_total().saturating_sub(earlier.idle_total());
        let busy = delta_total.saturating_sub(delta_idle);
        crate::model::round1(busy as f64 / delta_total as f64 * 100.0)
    }
}

/// Memory totals, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl MemoryStats {
    pub fn used_percent(&self) -> f64 {
        crate::model::percent_of(
            self.total_bytes.saturating_sub(self.available_bytes),
            self.total_bytes,
        )
    }
}

/// One GPU as reported by the driver, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGpu {
    pub name: String,
    /// Utilization as a fraction in [0, 1].
    pub load_fraction: f64,
    pub temperature_c: f64,
    pub mem_used_mib: f64,
    pub mem_total_mib: f64,
}

/// Provider of raw host metrics.
///
/// Implementations must be cheap to share across threads; the collector calls
/// them from concurrent request handlers.
pub trait MetricSource: Send + Sync {
    /// OS name and release, e.g. `("Linux", "6.8.0")`.
    fn os_release(&self) -> Result<(String, String), ProbeError>;

    fn hostname(&self) -> Result<String, ProbeError>;

    /// Machine architecture identifier.
    fn arch(&self) -> Result<String, ProbeError>;

    /// CPU brand string. `Ok("")` when the CPU cannot be classified.
    fn processor_brand(&self) -> Result<String, ProbeError>;

    fn memory(&self) -> Result<MemoryStats, ProbeError>;

    /// Mounted partitions in mount-table order.
    fn partitions(&self) -> Result<Vec<Partition>, ProbeError>;

    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, ProbeError>;

    fn cpu_times(&self) -> Result<CpuTimes, ProbeError>;

    /// GPUs in enumeration order. An absent GPU stack is
    /// [`ProbeError::DeviceUnavailable`], not an empty list.
    fn gpus(&self) -> Result<Vec<RawGpu>, ProbeError>;

    /// Whether [`MetricSource::cpu_times`] reads a single process-wide baseline
    /// counter that is reset by each read. Sampling windows over such a
    /// counter must not overlap.
    fn shared_cpu_baseline(&self) -> bool {
        false
    }
}
