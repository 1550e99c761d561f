//! GPU enumeration via `nvidia-smi`.
//!
//! The tool is queried in CSV mode:
//!
//! ```text
//! nvidia-smi --query-gpu=name,utilization.gpu,temperature.gpu,memory.used,memory.total \
//!            --format=csv,noheader,nounits
//! ```
//!
//! One row per device, in driver enumeration order. Cells the driver cannot
//! report come back as `[N/A]` and are read as 0.

use std::io;
use std::process::Command;

use tracing::debug;

use crate::error::ProbeError;
use crate::sources::RawGpu;

pub const DEFAULT_NVIDIA_SMI: &str = "nvidia-smi";

const QUERY_FIELDS: &str = "name,utilization.gpu,temperature.gpu,memory.used,memory.total";

/// Runs `nvidia-smi` and parses its output.
///
/// A missing binary or a failing driver is [`ProbeError::DeviceUnavailable`].
pub fn query_nvidia_smi(binary: &str) -> Result<Vec<RawGpu>, ProbeError> {
    let output = Command::new(binary)
        .arg(format!("--query-gpu={}", QUERY_FIELDS))
        .arg("--format=csv,noheader,nounits")
        .output()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ProbeError::DeviceUnavailable(format!("{} not found", binary))
            }
            _ => ProbeError::from_io(binary, e),
        })?;

    if !output.status.success() {
        // nvidia-smi exits non-zero when the driver is not loaded
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let reason = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(ProbeError::DeviceUnavailable(format!(
            "{} exited with {}: {}",
            binary, output.status, reason
        )));
    }

    Ok(parse_nvidia_smi_csv(&String::from_utf8_lossy(&output.stdout)))
}

/// Parses `nvidia-smi` CSV rows. Malformed rows are skipped individually.
pub fn parse_nvidia_smi_csv(content: &str) -> Vec<RawGpu> {
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| match parse_row(line) {
            Ok(gpu) => Some(gpu),
            Err(e) => {
                debug!("Skipping GPU row {:?}: {}", line, e);
                None
            }
        })
        .collect()
}

fn parse_row(line: &str) -> Result<RawGpu, ProbeError> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != 5 {
        return Err(ProbeError::parse(
            "nvidia-smi row",
            format!("expected 5 fields, got {}", cells.len()),
        ));
    }

    let utilization = parse_cell(cells[1])?;

    Ok(RawGpu {
        name: cells[0].to_string(),
        load_fraction: utilization / 100.0,
        temperature_c: parse_cell(cells[2])?,
        mem_used_mib: parse_cell(cells[3])?,
        mem_total_mib: parse_cell(cells[4])?,
    })
}

fn parse_cell(cell: &str) -> Result<f64, ProbeError> {
    if cell.starts_with('[') {
        // [N/A], [Not Supported], [Unknown Error]
        return Ok(0.0);
    }
    cell.parse::<f64>()
        .map_err(|e| ProbeError::parse("nvidia-smi cell", format!("{:?}: {}", cell, e)))
}
