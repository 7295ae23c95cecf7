//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by method, status
//! - `router_request_duration_seconds` (histogram): latency distribution
//! - `router_request_panics_total` (counter): faults caught at the request boundary
//! - `router_reloads_total` (counter): reload attempts by outcome
//! - `router_routes` (gauge): entries in the published table

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("router_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_request_panic() {
    metrics::counter!("router_request_panics_total").increment(1);
}

pub fn record_reload(success: bool, route_count: usize) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("router_reloads_total", "outcome" => outcome).increment(1);
    metrics::gauge!("router_routes").set(route_count as f64);
}
