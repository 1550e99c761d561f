//! Startup requirement validation for hostwatch.
//!
//! Individual probes degrade gracefully at runtime, but a host where even the
//! CPU and memory counters are unreadable cannot serve anything useful, so
//! that case aborts startup.

use tracing::{info, warn};

use hostwatch::{MetricSource, ProbeError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("CPU counters unreadable: {0}")]
    CpuCounters(#[source] ProbeError),

    #[error("Memory counters unreadable: {0}")]
    MemoryCounters(#[source] ProbeError),
}

/// Validates that the mandatory probes work on this host.
pub fn validate_requirements(source: &dyn MetricSource) -> Result<(), StartupError> {
    info!("Validating runtime requirements...");

    source.cpu_times().map_err(StartupError::CpuCounters)?;
    source.memory().map_err(StartupError::MemoryCounters)?;

    // Optional probes: report, never fail
    if let Err(e) = source.gpus() {
        info!("GPU metrics unavailable: {}", e);
    }
    match source.partitions() {
        Ok(parts) if parts.is_empty() => warn!("No disk partitions found"),
        Ok(parts) => info!("Found {} disk partition(s)", parts.len()),
        Err(e) => warn!("Cannot enumerate disk partitions: {}", e),
    }

    info!("All runtime requirements validated");
    Ok(())
}
