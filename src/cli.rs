//! CLI arguments and subcommands for hostwatch.
//!
//! This module defines the command-line interface structure using the clap library.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Output format for configuration and snapshot dumps
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "hostwatch",
    about = "Host telemetry dashboard: OS, CPU, memory, disk and GPU utilization over HTTP",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: OutputFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// CPU sampling window in milliseconds
    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Skip GPU probing (always report no GPUs)
    #[arg(long)]
    pub disable_gpu: bool,

    /// Path to the nvidia-smi binary
    #[arg(long)]
    pub nvidia_smi: Option<PathBuf>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the static snapshot and one dynamic sample, then exit
    Snapshot {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}
