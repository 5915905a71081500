//! Metrics collection and exposition.
//!
//! # Metrics
//! - `weather_requests_total` (counter): inbound requests by unit, status
//! - `weather_request_duration_seconds` (histogram): inbound latency by unit
//!
//! # Design Decisions
//! - Prometheus scrape endpoint, separate from the service listener
//! - Recording without an installed recorder is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound request.
pub fn record_request(unit: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "weather_requests_total",
        "unit" => unit,
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!("weather_request_duration_seconds", "unit" => unit)
        .record(start.elapsed().as_secs_f64());
}
