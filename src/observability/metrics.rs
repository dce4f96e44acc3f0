//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by method, status
//! - `relay_request_duration_seconds` (histogram): inbound latency
//! - `relay_downstream_requests_total` (counter): downstream calls by outcome
//! - `relay_downstream_duration_seconds` (histogram): downstream latency

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must run inside a Tokio runtime. Failure is logged; the relay keeps serving.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed inbound request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("relay_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record a downstream call and its outcome (`success` or an error kind).
pub fn record_downstream(outcome: &'static str, start: Instant) {
    metrics::counter!("relay_downstream_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("relay_downstream_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
