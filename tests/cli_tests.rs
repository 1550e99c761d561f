//! Tests for the command-line configuration surface.

use std::io::Write;
use std::process::Command;

fn hostwatch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hostwatch"))
}

#[test]
fn test_check_config_defaults_valid() {
    let output = hostwatch()
        .args(["--no-config", "--check-config"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_check_config_rejects_zero_interval() {
    let output = hostwatch()
        .args(["--no-config", "--sample-interval-ms", "0", "--check-config"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("sample_interval_ms"));
}

#[test]
fn test_check_config_rejects_port_zero_in_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "port: 0").unwrap();

    let output = hostwatch()
        .arg("-c")
        .arg(file.path())
        .arg("--check-config")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("port"));
}

#[test]
fn test_missing_config_file_fails() {
    let output = hostwatch()
        .args(["-c", "/nonexistent/hostwatch.yaml", "--check-config"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_show_config_json_applies_cli_overrides() {
    let output = hostwatch()
        .args([
            "--no-config",
            "--port",
            "8080",
            "--disable-gpu",
            "--show-config",
            "--config-format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["port"], 8080);
    assert_eq!(value["bind"], "127.0.0.1");
    assert_eq!(value["sample_interval_ms"], 1000);
    assert_eq!(value["enable_gpu"], false);
}

#[test]
fn test_snapshot_logs_to_stderr_and_prints_json() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "sample_interval_ms: 10\nenable_gpu: false").unwrap();

    let output = hostwatch()
        .arg("-c")
        .arg(file.path())
        .args(["snapshot", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Loaded configuration from"), "stderr: {stderr}");

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["static"]["hostname"].is_string());
    assert_eq!(value["dynamic"]["gpus"], serde_json::json!([]));
}
