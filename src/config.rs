//! Configuration management for hostwatch.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.
//! Precedence: CLI > config file > defaults.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use hostwatch::sources::gpu::DEFAULT_NVIDIA_SMI;

use crate::cli::{Args, OutputFormat};

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 60_000;

/// Locations searched when no config file is given.
const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/hostwatch/hostwatch.yaml",
    "/etc/hostwatch/hostwatch.yml",
    "/etc/hostwatch/hostwatch.json",
    "./hostwatch.yaml",
    "./hostwatch.yml",
    "./hostwatch.json",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Collection
    #[serde(alias = "sample-interval-ms")]
    pub sample_interval_ms: Option<u64>,
    #[serde(alias = "enable-gpu")]
    pub enable_gpu: Option<bool>,
    #[serde(alias = "nvidia-smi-path")]
    pub nvidia_smi_path: Option<String>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            sample_interval_ms: Some(DEFAULT_SAMPLE_INTERVAL_MS),
            enable_gpu: Some(true),
            nvidia_smi_path: Some(DEFAULT_NVIDIA_SMI.to_string()),
            enable_health: Some(true),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS))
    }

    /// The nvidia-smi binary to run, or `None` when GPU probing is disabled.
    pub fn nvidia_smi(&self) -> Option<String> {
        if !self.enable_gpu.unwrap_or(true) {
            return None;
        }
        Some(
            self.nvidia_smi_path
                .clone()
                .unwrap_or_else(|| DEFAULT_NVIDIA_SMI.to_string()),
        )
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.port == Some(0) {
        bail!("port must be between 1 and 65535");
    }

    if let Some(bind) = cfg.bind.as_deref() {
        bind.parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid bind address '{}'", bind))?;
    }

    if let Some(ms) = cfg.sample_interval_ms {
        if ms == 0 || ms > MAX_SAMPLE_INTERVAL_MS {
            bail!(
                "sample_interval_ms must be between 1 and {}, got {}",
                MAX_SAMPLE_INTERVAL_MS,
                ms
            );
        }
    }

    if let Some(path) = cfg.nvidia_smi_path.as_deref() {
        if path.trim().is_empty() {
            bail!("nvidia_smi_path must not be empty");
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
pub fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(ms) = args.sample_interval_ms {
        config.sample_interval_ms = Some(ms);
    }

    if args.disable_gpu {
        config.enable_gpu = Some(false);
    }
    if let Some(path) = &args.nvidia_smi {
        config.nvidia_smi_path = Some(path.to_string_lossy().to_string());
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    Ok(config)
}

/// Loads a config file, or the first default location that exists.
///
/// Missing files fall back to [`Config::default`]. Keys absent from the file
/// also take their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
        {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let loaded: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?,
    };
    info!("Loaded configuration from: {}", path.display());

    Ok(merge_defaults(loaded))
}

/// Fills keys the file left unset with their defaults.
fn merge_defaults(loaded: Config) -> Config {
    let defaults = Config::default();
    Config {
        port: loaded.port.or(defaults.port),
        bind: loaded.bind.or(defaults.bind),
        sample_interval_ms: loaded.sample_interval_ms.or(defaults.sample_interval_ms),
        enable_gpu: loaded.enable_gpu.or(defaults.enable_gpu),
        nvidia_smi_path: loaded.nvidia_smi_path.or(defaults.nvidia_smi_path),
        enable_health: loaded.enable_health.or(defaults.enable_health),
        log_level: loaded.log_level.or(defaults.log_level),
    }
}

/// Renders a serializable value in the requested format.
pub fn render<T: Serialize>(value: &T, format: &OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Toml => toml::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: &OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(config, format)?);
    Ok(())
}
