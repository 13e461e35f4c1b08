// crates/server/src/metrics.rs
//! Application metrics for Prometheus monitoring.
//!
//! This module provides:
//! - Prometheus metrics recorder initialization
//! - Metric definitions for jobs and upstream calls
//! - Helper functions for recording metrics
//!
//! Recording before `init_metrics` is a no-op, so tests need no setup.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!(
        "weather_jobs_started_total",
        "Weather collection jobs accepted by the start endpoint"
    );
    describe_counter!(
        "weather_jobs_completed_total",
        "Weather collection jobs that attempted every requested city"
    );
    describe_counter!(
        "weather_jobs_aborted_total",
        "Weather collection jobs aborted because their record vanished"
    );
    describe_counter!(
        "weather_upstream_requests_total",
        "Upstream weather requests by outcome"
    );
    describe_histogram!(
        "weather_job_duration_seconds",
        "Wall-clock duration of a collection job in seconds"
    );
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

pub fn record_job_started() {
    counter!("weather_jobs_started_total").increment(1);
}

pub fn record_job_completed(duration: Duration) {
    counter!("weather_jobs_completed_total").increment(1);
    histogram!("weather_job_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_job_aborted() {
    counter!("weather_jobs_aborted_total").increment(1);
}

/// Record one upstream call.
///
/// * `outcome` - "success" or an `UpstreamError::kind` label
pub fn record_upstream(outcome: &'static str) {
    counter!("weather_upstream_requests_total", "outcome" => outcome).increment(1);
}
