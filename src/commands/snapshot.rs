//! Snapshot command implementation.
//!
//! Collects the static snapshot and one dynamic sample and prints both.

use std::sync::Arc;

use serde::Serialize;

use hostwatch::{DynamicInfo, HealthStats, LinuxSource, StaticInfo, Telemetry, TelemetryCollector};

use crate::cli::OutputFormat;
use crate::config::{render, Config};

#[derive(Serialize)]
struct SnapshotReport {
    #[serde(rename = "static")]
    static_info: StaticInfo,
    dynamic: DynamicInfo,
}

/// Prints one full report to stdout.
pub fn command_snapshot(format: &OutputFormat, config: &Config) -> anyhow::Result<()> {
    let source = LinuxSource::new().with_nvidia_smi(config.nvidia_smi());
    let collector = TelemetryCollector::new(
        Arc::new(source),
        config.sample_interval(),
        Arc::new(HealthStats::new()),
    );

    let report = SnapshotReport {
        static_info: collector.get_static().as_ref().clone(),
        dynamic: collector.get_dynamic(),
    };

    println!("{}", render(&report, format)?);
    Ok(())
}
