//! Internal statistics for the telemetry service.
//!
//! Counts requests, refreshes, samples and degraded probes so that operators
//! can see on `/health` whether metrics are being silently dropped.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::ProbeError;

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns (last, avg, max, min, count).
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Thread-safe sliding window of HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Keep only the last minute to bound memory
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Duration::from_secs(60))
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            guard
                .iter()
                .filter(|t| t.elapsed() <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

/// Service-wide counters, shared between the collector and the HTTP layer.
pub struct HealthStats {
    // Collection
    pub static_refreshes: AtomicU64,
    pub dynamic_samples: AtomicU64,
    pub static_duration_seconds: Stat,
    pub dynamic_duration_seconds: Stat,

    // Degraded probes
    pub permission_denied: AtomicU64,
    pub devices_unavailable: AtomicU64,
    pub probe_failures: AtomicU64,
    pub disks_skipped: AtomicU64,

    // HTTP
    pub http_requests_total: AtomicU64,
    pub http_request_timestamps: RequestTimestamps,

    pub start_time: Instant,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            static_refreshes: AtomicU64::new(0),
            dynamic_samples: AtomicU64::new(0),
            static_duration_seconds: Stat::default(),
            dynamic_duration_seconds: Stat::default(),
            permission_denied: AtomicU64::new(0),
            devices_unavailable: AtomicU64::new(0),
            probe_failures: AtomicU64::new(0),
            disks_skipped: AtomicU64::new(0),
            http_requests_total: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            start_time: Instant::now(),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record_static_refresh(&self, duration_seconds: f64) {
        self.static_refreshes.fetch_add(1, Ordering::Relaxed);
        self.static_duration_seconds.add_sample(duration_seconds);
    }

    pub fn record_dynamic_sample(&self, duration_seconds: f64) {
        self.dynamic_samples.fetch_add(1, Ordering::Relaxed);
        self.dynamic_duration_seconds.add_sample(duration_seconds);
    }

    /// Classifies a swallowed probe error.
    pub fn record_probe_error(&self, err: &ProbeError) {
        let counter = match err {
            ProbeError::PermissionDenied { .. } => &self.permission_denied,
            ProbeError::DeviceUnavailable(_) => &self.devices_unavailable,
            _ => &self.probe_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_skipped(&self) {
        self.disks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_requests_total.fetch_add(1, Ordering::Relaxed);
        self.http_request_timestamps.record();
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_table(&self) -> String {
        let (sd_cur, sd_avg, sd_max, sd_min, _) = self.static_duration_seconds.snapshot();
        let (dd_cur, dd_avg, dd_max, dd_min, _) = self.dynamic_duration_seconds.snapshot();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - TELEMETRY INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "COLLECTION").ok();
        writeln!(out, "----------").ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "static_refresh (s)",
            format!("{:.3}", sd_cur),
            format!("{:.3}", sd_avg),
            format!("{:.3}", sd_max),
            format!("{:.3}", sd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "dynamic_sample (s)",
            format!("{:.3}", dd_cur),
            format!("{:.3}", dd_avg),
            format!("{:.3}", dd_max),
            format!("{:.3}", dd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "COUNTERS").ok();
        writeln!(out, "--------").ok();

        let counters = [
            ("static_refreshes", &self.static_refreshes),
            ("dynamic_samples", &self.dynamic_samples),
            ("disks_skipped", &self.disks_skipped),
            ("permission_denied", &self.permission_denied),
            ("devices_unavailable", &self.devices_unavailable),
            ("probe_failures", &self.probe_failures),
            ("http_requests_total", &self.http_requests_total),
        ];
        for (name, counter) in counters {
            writeln!(
                out,
                "{:left$} | {:>col$}",
                name,
                counter.load(Ordering::Relaxed),
                left = left_col,
                col = col_w
            )
            .ok();
        }

        writeln!(
            out,
            "{:left$} | {:>col$}",
            "http_requests_last_minute",
            self.http_request_timestamps.count_last_minute(),
            left = left_col,
            col = col_w
        )
        .ok();

        out
    }
}
