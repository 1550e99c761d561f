//! Production metric source for Linux hosts.

use std::ffi::CStr;
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::sources::filesystem::{parse_mounts, statvfs_usage};
use crate::sources::gpu::{query_nvidia_smi, DEFAULT_NVIDIA_SMI};
use crate::sources::procfs::{parse_cpu_brand, parse_cpu_times, parse_meminfo};
use crate::sources::{CpuTimes, DiskUsage, MemoryStats, MetricSource, Partition, RawGpu};

/// Fields of `uname(2)` we report.
#[derive(Debug, Clone)]
struct Uname {
    sysname: String,
    nodename: String,
    release: String,
    machine: String,
}

/// Reads host metrics from `/proc`, `uname(2)`, `statvfs(3)` and `nvidia-smi`.
///
/// Every read is stateless, so concurrent sampling windows do not interfere.
#[derive(Debug, Clone)]
pub struct LinuxSource {
    proc_root: PathBuf,
    nvidia_smi: Option<String>,
}

impl Default for LinuxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LinuxSource {
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            nvidia_smi: Some(DEFAULT_NVIDIA_SMI.to_string()),
        }
    }

    /// Reads `/proc` files from another root (used by tests).
    pub fn with_proc_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.proc_root = root.into();
        self
    }

    /// Sets the `nvidia-smi` binary, or disables GPU probing with `None`.
    pub fn with_nvidia_smi(mut self, binary: Option<String>) -> Self {
        self.nvidia_smi = binary;
        self
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    fn read_proc(&self, name: &str) -> Result<String, ProbeError> {
        let path = self.proc_root.join(name);
        fs::read_to_string(&path).map_err(|e| ProbeError::from_io(path.display().to_string(), e))
    }

    fn uname(&self) -> Result<Uname, ProbeError> {
        // SAFETY: utsname only holds c_char arrays, valid when zeroed, and
        // uname NUL-terminates every field on success.
        unsafe {
            let mut utsname: libc::utsname = mem::zeroed();
            if libc::uname(&mut utsname) != 0 {
                return Err(ProbeError::from_io("uname", std::io::Error::last_os_error()));
            }
            let field =
                |f: &[libc::c_char]| CStr::from_ptr(f.as_ptr()).to_string_lossy().into_owned();
            Ok(Uname {
                sysname: field(&utsname.sysname),
                nodename: field(&utsname.nodename),
                release: field(&utsname.release),
                machine: field(&utsname.machine),
            })
        }
    }
}

impl MetricSource for LinuxSource {
    fn os_release(&self) -> Result<(String, String), ProbeError> {
        let uname = self.uname()?;
        Ok((uname.sysname, uname.release))
    }

    fn hostname(&self) -> Result<String, ProbeError> {
        Ok(self.uname()?.nodename)
    }

    fn arch(&self) -> Result<String, ProbeError> {
        Ok(self.uname()?.machine)
    }

    fn processor_brand(&self) -> Result<String, ProbeError> {
        Ok(parse_cpu_brand(&self.read_proc("cpuinfo")?))
    }

    fn memory(&self) -> Result<MemoryStats, ProbeError> {
        parse_meminfo(&self.read_proc("meminfo")?)
    }

    fn partitions(&self) -> Result<Vec<Partition>, ProbeError> {
        Ok(parse_mounts(&self.read_proc("mounts")?))
    }

    fn disk_usage(&self, partition: &Partition) -> Result<DiskUsage, ProbeError> {
        statvfs_usage(&partition.mountpoint)
    }

    fn cpu_times(&self) -> Result<CpuTimes, ProbeError> {
        parse_cpu_times(&self.read_proc("stat")?)
    }

    fn gpus(&self) -> Result<Vec<RawGpu>, ProbeError> {
        match &self.nvidia_smi {
            Some(binary) => query_nvidia_smi(binary),
            None => Err(ProbeError::DeviceUnavailable("GPU probing disabled".to_string())),
        }
    }
}
