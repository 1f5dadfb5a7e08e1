//! Prometheus metrics for sales-service.
//!
//! Domain counters live in the `prometheus` default registry. HTTP request
//! metrics recorded by the shared middleware go through the `metrics` facade
//! and are rendered by the installed exporter. `/metrics` serves both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Handle to the recorder behind the `metrics` facade. `None` when another
/// recorder was already installed in this process.
static HTTP_METRICS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Conversion attempts by outcome (`converted`, `already_converted`, ...).
pub static INVOICE_CONVERSIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_invoice_conversions_total",
        "Total number of waiting-to-active conversion attempts",
        &["outcome"]
    )
    .expect("Failed to register INVOICE_CONVERSIONS")
});

/// Snapshot requests by period and status.
pub static SNAPSHOT_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sales_snapshot_requests_total",
        "Total number of performance snapshot requests",
        &["period", "status"]
    )
    .expect("Failed to register SNAPSHOT_REQUESTS")
});

/// Histogram for database query duration.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "sales_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("Failed to register DB_QUERY_DURATION")
});

fn http_metrics_handle() -> Option<&'static PrometheusHandle> {
    HTTP_METRICS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        })
        .as_ref()
}

/// Initialize all metrics and install the HTTP metrics recorder. Safe to
/// call more than once.
pub fn init_metrics() {
    Lazy::force(&INVOICE_CONVERSIONS);
    Lazy::force(&SNAPSHOT_REQUESTS);
    Lazy::force(&DB_QUERY_DURATION);
    http_metrics_handle();
}

/// Get all metrics as Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
    }
    let mut text = String::from_utf8_lossy(&buffer).into_owned();

    if let Some(handle) = HTTP_METRICS_HANDLE.get().and_then(Option::as_ref) {
        text.push_str(&handle.render());
    }
    text
}

pub fn record_conversion(outcome: &str) {
    INVOICE_CONVERSIONS.with_label_values(&[outcome]).inc();
}

pub fn record_snapshot(period: &str, status: &str) {
    SNAPSHOT_REQUESTS.with_label_values(&[period, status]).inc();
}
