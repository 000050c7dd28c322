//! Metrics collection and exposition.
//!
//! # Metrics
//! - `keyserver_requests_total` (counter): requests by route, status
//! - `keyserver_request_duration_seconds` (histogram): latency by route
//! - `keyserver_store_opens_total` (counter): keyring opens by outcome
//! - `keyserver_node_queries_total` (counter): node queries by path, outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter serves its own listener when enabled

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        "keyserver_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("keyserver_request_duration_seconds", "route" => route.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_store_open(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("keyserver_store_opens_total", "outcome" => outcome).increment(1);
}

pub fn record_node_query(path: &str, outcome: &'static str) {
    metrics::counter!(
        "keyserver_node_queries_total",
        "path" => path.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
