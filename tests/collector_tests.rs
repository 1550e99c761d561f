//! Integration tests for the telemetry collector.
//!
//! These tests drive `TelemetryCollector` with a synthetic source to check
//! partial-failure handling, normalization and snapshot publication under
//! concurrency.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{raw_gpu, FakeSource, GIB};
use hostwatch::{HealthStats, Telemetry, TelemetryCollector};

const WINDOW: Duration = Duration::from_millis(50);

fn collector(source: FakeSource) -> TelemetryCollector {
    TelemetryCollector::new(Arc::new(source), WINDOW, Arc::new(HealthStats::new()))
}

#[test]
fn test_static_fields_populated_after_construction() {
    let c = collector(FakeSource::default().with_partitions(&["/"]));
    let info = c.get_static();

    assert_eq!(info.os, "Linux 6.8.0-test");
    assert_eq!(info.hostname, "host-8");
    assert_eq!(info.processor, "Fake CPU @ 3.00GHz");
    assert_eq!(info.arch, "x86_64");
    assert_eq!(info.ram_total_gib, 8.0);
    assert_eq!(info.disks.len(), 1);
}

#[test]
fn test_ram_total_of_8_gib() {
    // Default generation 8 reports exactly 8589934592 bytes
    assert_eq!(8 * GIB, 8_589_934_592);
    let c = collector(FakeSource::default());
    assert_eq!(c.get_static().ram_total_gib, 8.0);
}

#[test]
fn test_denied_partitions_are_omitted() {
    let source = FakeSource::default()
        .with_partitions(&["/", "/secret", "/home", "/vault", "/data"])
        .deny("/secret")
        .deny("/vault");
    let c = collector(source);
    let info = c.get_static();

    let mounts: Vec<&str> = info.disks.iter().map(|d| d.mountpoint.as_str()).collect();
    assert_eq!(mounts, vec!["/", "/home", "/data"]);

    for disk in &info.disks {
        assert_eq!(disk.total_gib, 100.0);
        assert_eq!(disk.used_percent, 25.0);
    }
    assert_eq!(info.disks[1].device, "/dev/sdc");

    assert_eq!(c.stats().disks_skipped.load(Ordering::Relaxed), 2);
    assert_eq!(c.stats().permission_denied.load(Ordering::Relaxed), 2);
}

#[test]
fn test_all_partitions_denied_yields_empty_disks() {
    let source = FakeSource::default()
        .with_partitions(&["/a", "/b"])
        .deny("/a")
        .deny("/b");
    let info = collector(source).get_static();
    assert!(info.disks.is_empty());
    assert_eq!(info.hostname, "host-8");
}

#[test]
fn test_every_static_probe_failing_yields_empty_fields() {
    let source = FakeSource::default()
        .with_partitions(&["/", "/home"])
        .fail("os_release")
        .fail("hostname")
        .fail("arch")
        .fail("processor_brand")
        .fail("memory")
        .fail("partitions");
    let c = collector(source);
    let info = c.get_static();

    assert_eq!(info.os, "");
    assert_eq!(info.hostname, "");
    assert_eq!(info.processor, "");
    assert_eq!(info.arch, "");
    assert_eq!(info.ram_total_gib, 0.0);
    assert!(info.disks.is_empty());
    assert_eq!(c.stats().probe_failures.load(Ordering::Relaxed), 6);

    // Fields stay present in the serialized form
    let value = serde_json::to_value(&*info).unwrap();
    assert_eq!(value["hostname"], "");
    assert_eq!(value["disks"], serde_json::json!([]));

    let dynamic = c.get_dynamic();
    assert_eq!(dynamic.cpu_usage_percent, 50.0);
    assert_eq!(dynamic.ram_usage_percent, 0.0);
    assert!(dynamic.gpus.is_empty());
}

#[test]
fn test_single_static_probe_failure_keeps_other_fields() {
    let c = collector(FakeSource::default().with_partitions(&["/"]).fail("hostname"));
    let info = c.get_static();

    assert_eq!(info.hostname, "");
    assert_eq!(info.os, "Linux 6.8.0-test");
    assert_eq!(info.ram_total_gib, 8.0);
    assert_eq!(info.disks.len(), 1);
    assert_eq!(c.stats().probe_failures.load(Ordering::Relaxed), 1);
}

#[test]
fn test_refresh_replaces_snapshot() {
    let source = Arc::new(FakeSource::default());
    let c = TelemetryCollector::new(source.clone(), WINDOW, Arc::new(HealthStats::new()));

    let before = c.get_static();
    source.generation.store(16, Ordering::SeqCst);

    // Reads don't recompute
    assert_eq!(c.get_static().hostname, "host-8");

    let refreshed = c.refresh_static();
    assert_eq!(refreshed.hostname, "host-16");
    assert_eq!(refreshed.ram_total_gib, 16.0);
    assert_eq!(c.get_static(), refreshed);

    // Earlier handles keep the old snapshot intact
    assert_eq!(before.hostname, "host-8");
    assert_eq!(before.ram_total_gib, 8.0);
}

#[test]
fn test_concurrent_refresh_never_tears_snapshot() {
    let source = Arc::new(FakeSource::default().with_partitions(&["/", "/home"]));
    let c = Arc::new(TelemetryCollector::new(
        source.clone(),
        WINDOW,
        Arc::new(HealthStats::new()),
    ));

    let writer = {
        let c = c.clone();
        let source = source.clone();
        thread::spawn(move || {
            for generation in 9..200u64 {
                source.generation.store(generation, Ordering::SeqCst);
                c.refresh_static();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let c = c.clone();
            thread::spawn(move || {
                for _ in 0..2000 {
                    let info = c.get_static();
                    let expected = format!("host-{}", info.ram_total_gib as u64);
                    assert_eq!(info.hostname, expected, "torn snapshot observed");
                    assert_eq!(info.disks.len(), 2);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    assert_eq!(c.get_static().hostname, "host-199");
}

#[test]
fn test_dynamic_without_gpus() {
    let c = collector(FakeSource::default());
    let info = c.get_dynamic();

    assert!(info.gpus.is_empty());
    assert_eq!(info.cpu_usage_percent, 50.0);
    assert_eq!(info.ram_usage_percent, 75.0);
}

#[test]
fn test_dynamic_gpu_subsystem_unavailable() {
    let c = collector(FakeSource::default().with_gpus(Err("nvidia-smi not found".into())));
    let info = c.get_dynamic();

    assert!(info.gpus.is_empty());
    assert_eq!(info.cpu_usage_percent, 50.0);
    assert_eq!(c.stats().devices_unavailable.load(Ordering::Relaxed), 1);
}

#[test]
fn test_dynamic_gpu_load_normalization_and_order() {
    let c = collector(
        FakeSource::default().with_gpus(Ok(vec![raw_gpu("GPU A", 0.42), raw_gpu("GPU B", 1.0)])),
    );
    let info = c.get_dynamic();

    assert_eq!(info.gpus.len(), 2);
    assert_eq!(info.gpus[0].name, "GPU A");
    assert_eq!(info.gpus[0].load_percent, 42.0);
    assert_eq!(info.gpus[0].mem_used_mib, 2048.0);
    assert_eq!(info.gpus[1].name, "GPU B");
    assert_eq!(info.gpus[1].load_percent, 100.0);
}

#[test]
fn test_dynamic_honors_sampling_window() {
    let c = TelemetryCollector::new(
        Arc::new(FakeSource::default()),
        Duration::from_millis(200),
        Arc::new(HealthStats::new()),
    );
    let start = Instant::now();
    c.get_dynamic();
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[test]
fn test_cpu_failure_degrades_to_zero_but_keeps_window() {
    let source = FakeSource {
        cpu_fails: true,
        ..Default::default()
    };
    let c = TelemetryCollector::new(
        Arc::new(source),
        Duration::from_millis(100),
        Arc::new(HealthStats::new()),
    );

    let start = Instant::now();
    let info = c.get_dynamic();
    assert!(start.elapsed() >= Duration::from_millis(100));
    assert_eq!(info.cpu_usage_percent, 0.0);
    assert_eq!(info.ram_usage_percent, 75.0);
    assert_eq!(c.stats().probe_failures.load(Ordering::Relaxed), 2);
}

fn run_two_concurrent_samples(shared_baseline: bool, window: Duration) -> Duration {
    let source = FakeSource {
        shared_baseline,
        ..Default::default()
    };
    let c = Arc::new(TelemetryCollector::new(
        Arc::new(source),
        window,
        Arc::new(HealthStats::new()),
    ));

    let start = Instant::now();
    let handles: Vec<_> = (0..2)
        .map(|_| {
            let c = c.clone();
            thread::spawn(move || c.get_dynamic())
        })
        .collect();
    for h in handles {
        let info = h.join().unwrap();
        assert_eq!(info.cpu_usage_percent, 50.0);
    }
    start.elapsed()
}

#[test]
fn test_shared_baseline_serializes_windows() {
    let window = Duration::from_millis(300);
    let elapsed = run_two_concurrent_samples(true, window);
    assert!(elapsed >= window * 2, "windows overlapped: {:?}", elapsed);
}

#[test]
fn test_independent_baselines_sample_concurrently() {
    let window = Duration::from_millis(300);
    let elapsed = run_two_concurrent_samples(false, window);
    assert!(elapsed >= window);
    assert!(elapsed < window * 2, "windows were serialized: {:?}", elapsed);
}

#[test]
fn test_stats_count_refreshes_and_samples() {
    let c = collector(FakeSource::default());
    c.refresh_static();
    c.refresh_static();
    c.get_dynamic();

    // Construction counts as the first refresh
    assert_eq!(c.stats().static_refreshes.load(Ordering::Relaxed), 3);
    assert_eq!(c.stats().dynamic_samples.load(Ordering::Relaxed), 1);
}
