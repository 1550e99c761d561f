//! Synthetic metric source shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use hostwatch::sources::{CpuTimes, DiskUsage, MemoryStats, MetricSource, Partition, RawGpu};
use hostwatch::ProbeError;

pub const GIB: u64 = 1024 * 1024 * 1024;

/// Configurable in-memory source.
///
/// `generation` drives hostname and RAM together: generation `n` reports
/// hostname `host-n` and `n` GiB of RAM, which lets tests detect a snapshot
/// that mixes fields from two refreshes.
pub struct FakeSource {
    pub generation: AtomicU64,
    pub partitions: Vec<Partition>,
    pub denied_mounts: HashSet<String>,
    /// Names of probes that return an I/O error, e.g. `"hostname"`.
    pub failing: HashSet<&'static str>,
    pub usage: DiskUsage,
    pub gpus: Mutex<Result<Vec<RawGpu>, String>>,
    pub shared_baseline: bool,
    pub cpu_fails: bool,
    pub cpu_ticks: AtomicU64,
}

impl Default for FakeSource {
    fn default() -> Self {
        Self {
            generation: AtomicU64::new(8),
            partitions: Vec::new(),
            denied_mounts: HashSet::new(),
            failing: HashSet::new(),
            usage: DiskUsage {
                total_bytes: 100 * GIB,
                used_bytes: 25 * GIB,
                available_bytes: 75 * GIB,
            },
            gpus: Mutex::new(Ok(Vec::new())),
            shared_baseline: false,
            cpu_fails: false,
            cpu_ticks: AtomicU64::new(0),
        }
    }
}

impl FakeSource {
    pub fn with_partitions(mut self, mounts: &[&str]) -> Self {
        self.partitions = mounts
            .iter()
            .enumerate()
            .map(|(i, m)| Partition {
                device: format!("/dev/sd{}", (b'a' + i as u8) as char),
                mountpoint: m.to_string(),
                fstype: "ext4".to_string(),
            })
            .collect();
        self
    }

    pub fn deny(mut self, mount: &str) -> Self {
        self.denied_mounts.insert(mount.to_string());
        self
    }

    pub fn fail(mut self, probe: &'static str) -> Self {
        self.failing.insert(probe);
        self
    }

    fn check(&self, probe: &'static str) -> Result<(), ProbeError> {
        if self.failing.contains(probe) {
            return Err(ProbeError::Io {
                what: probe.to_string(),
                source: io::Error::other("synthetic failure"),
            });
        }
        Ok(())
    }

    pub fn with_gpus(self, gpus: Result<Vec<RawGpu>, String>) -> Self {
        *self.gpus.lock().unwrap() = gpus;
        self
    }
}

impl MetricSource for FakeSource {
    fn os_release(&self) -> Result<(String, String), ProbeError> {
        self.check("os_release")?;
        Ok(("Linux".to_string(), "6.8.0-test".to_string()))
    }

    fn hostname(&self) -> Result<String, ProbeError> {
        self.check("hostname")?;
        Ok(format!("host-{}", self.generation.load(Ordering::SeqCst)))
    }

    fn arch(&self) -> Result<String, ProbeError> {
        self.check("arch")?;
        Ok("x86_64".to_string())
    }

    fn processor_brand(&self) -> Result<String, ProbeError> {
        self.check("processor_brand")?;
        Ok("Fake CPU @ 3.00GHz".to_string())
    }

    fn memory(&self) -> Result<MemoryStats, ProbeError> {
        self.check("memory")?;
        let total_bytes = self.generation.load(Ordering::SeqCst) * GIB;
        Ok(MemoryStats {
            total_bytes,
            available_bytes: total_bytes / 4,
        })
    }

    fn partitions(&self) -> Result<Vec<Partition>, ProbeError> {
        self.check("partitions")?;
        Ok(self.partitions.clone())
    }

    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, ProbeError> {
        if self.denied_mounts.contains(&partition.mountpoint) {
            return Err(ProbeError::PermissionDenied {
                path: partition.mountpoint.clone(),
            });
        }
        Ok(self.usage)
    }

    /// Each read advances 50 busy and 50 idle ticks, so any window reads 50%.
    fn cpu_times(&self) -> Result<CpuTimes, ProbeError> {
        if self.cpu_fails {
            return Err(ProbeError::parse("/proc/stat", "synthetic failure"));
        }
        let t = self.cpu_ticks.fetch_add(50, Ordering::SeqCst) + 50;
        Ok(CpuTimes {
            user: t,
            idle: t,
            ..Default::default()
        })
    }

    fn gpus(&self) -> Result<Vec<RawGpu>, ProbeError> {
        match &*self.gpus.lock().unwrap() {
            Ok(gpus) => Ok(gpus.clone()),
            Err(reason) => Err(ProbeError::DeviceUnavailable(reason.clone())),
        }
    }

    fn shared_cpu_baseline(&self) -> bool {
        self.shared_baseline
    }
}

pub fn raw_gpu(name: &str, load_fraction: f64) -> RawGpu {
    RawGpu {
        name: name.to_string(),
        load_fraction,
        temperature_c: 60.0,
        mem_used_mib: 2048.0,
        mem_total_mib: 8192.0,
    }
}
