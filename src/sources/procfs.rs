//! Parsers for Linux `/proc` text files.
//!
//! The readers take the file content as a string so they can be tested against
//! captured samples; [`crate::sources::LinuxSource`] does the actual I/O.

use crate::error::ProbeError;
use crate::sources::{CpuTimes, MemoryStats};

/// Keys carrying a CPU brand string, in order of preference.
///
/// x86 exposes `model name`; ARM and MIPS kernels use the others.
const BRAND_KEYS: [&str; 4] = ["model name", "Hardware", "Processor", "cpu model"];

/// Parses `MemTotal` and `MemAvailable` from `/proc/meminfo`.
///
/// Kernels older than 3.14 lack `MemAvailable`; `MemFree + Buffers + Cached`
/// is used instead.
pub fn parse_meminfo(content: &str) -> Result<MemoryStats, ProbeError> {
    let mut total: Option<u64> = None;
    let mut available: Option<u64> = None;
    let mut free: u64 = 0;
    let mut buffers: u64 = 0;
    let mut cached: u64 = 0;

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kb) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kb * 1024;
        match key {
            "MemTotal:" => total = Some(bytes),
            "MemAvailable:" => available = Some(bytes),
            "MemFree:" => free = bytes,
            "Buffers:" => buffers = bytes,
            "Cached:" => cached = bytes,
            _ => {}
        }
    }

    let total_bytes =
        total.ok_or_else(|| ProbeError::parse("/proc/meminfo", "MemTotal not found"))?;
    let available_bytes = available.unwrap_or(free + buffers + cached);

    Ok(MemoryStats {
        total_bytes,
        available_bytes,
    })
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
pub fn parse_cpu_times(content: &str) -> Result<CpuTimes, ProbeError> {
    let line = content
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| ProbeError::parse("/proc/stat", "aggregate cpu line not found"))?;

    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| ProbeError::parse("/proc/stat", e.to_string()))?;

    if fields.len() < 7 {
        return Err(ProbeError::parse(
            "/proc/stat",
            format!("expected at least 7 cpu fields, got {}", fields.len()),
        ));
    }

    Ok(CpuTimes {
        user: fields[0],
        nice: fields[1],
        system: fields[2],
        idle: fields[3],
        iowait: fields[4],
        irq: fields[5],
        softirq: fields[6],
        steal: fields.get(7).copied().unwrap_or(0),
    })
}

/// Extracts the CPU brand string from `/proc/cpuinfo`.
///
/// Returns an empty string if no known key is present.
pub fn parse_cpu_brand(content: &str) -> String {
    for key in BRAND_KEYS {
        let found = content.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == key).then(|| v.trim().to_string())
        });
        if let Some(brand) = found.filter(|b| !b.is_empty()) {
            return brand;
        }
    }
    String::new()
}

/// Decodes the octal escapes `/proc/mounts` uses for whitespace in paths.
pub fn unescape_mount_path(raw: &str) -> String {
    raw.replace("\\040", " ")
        .replace("\\011", "\t")
        .replace("\\012", "\n")
        .replace("\\134", "\\")
}
