//! Prometheus metrics for request volume and upstream latency.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, warn};

// === Metric Name Constants ===

/// Inbound `/traffic` requests counter metric name.
pub const METRIC_TRAFFIC_REQUESTS: &str = "traffic_requests_total";
/// Upstream flow lookups counter metric name.
pub const METRIC_UPSTREAM_REQUESTS: &str = "upstream_requests_total";
/// Failed upstream flow lookups counter metric name.
pub const METRIC_UPSTREAM_FAILURES: &str = "upstream_failures_total";
/// Grid points left out of a report counter metric name.
pub const METRIC_POINTS_SKIPPED: &str = "grid_points_skipped_total";
/// Upstream lookup latency metric name.
pub const METRIC_UPSTREAM_LATENCY: &str = "upstream_request_latency_ms";
/// Whole-grid aggregation latency metric name.
pub const METRIC_AGGREGATION_LATENCY: &str = "aggregation_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_TRAFFIC_REQUESTS, "Total number of traffic report requests");
    describe_counter!(METRIC_UPSTREAM_REQUESTS, "Total number of upstream flow lookups");
    describe_counter!(METRIC_UPSTREAM_FAILURES, "Total number of failed upstream flow lookups");
    describe_counter!(
        METRIC_POINTS_SKIPPED,
        "Total number of grid points left out of reports"
    );

    describe_histogram!(
        METRIC_UPSTREAM_LATENCY,
        "Upstream flow lookup latency in milliseconds"
    );
    describe_histogram!(
        METRIC_AGGREGATION_LATENCY,
        "Time to aggregate one sample grid in milliseconds"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder.
///
/// Returns `None` if a recorder is already installed.
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Increment traffic requests counter.
pub fn inc_traffic_requests() {
    counter!(METRIC_TRAFFIC_REQUESTS).increment(1);
}

/// Increment upstream requests counter.
pub fn inc_upstream_requests() {
    counter!(METRIC_UPSTREAM_REQUESTS).increment(1);
}

/// Increment upstream failures counter.
pub fn inc_upstream_failures() {
    counter!(METRIC_UPSTREAM_FAILURES).increment(1);
}

/// Add to the skipped grid points counter.
pub fn add_points_skipped(count: u64) {
    if count > 0 {
        counter!(METRIC_POINTS_SKIPPED).increment(count);
    }
}

/// Record upstream lookup latency.
pub fn record_upstream_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_UPSTREAM_LATENCY).record(latency_ms);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for grid aggregation.
pub fn timer_aggregation() -> LatencyTimer {
    LatencyTimer::new(METRIC_AGGREGATION_LATENCY)
}
