//! Metrics collection and exposition.
//!
//! Prometheus-compatible counters and histograms; the exporter runs on its
//! own listener and is config-gated. Recording is cheap and is a no-op when
//! no exporter is installed, so the hot path never checks the gate.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(error = %err, "Failed to install metrics exporter"),
    }
}

/// Record one completed forward attempt.
pub fn record_forward(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record one completed WebSocket relay session.
pub fn record_relay_session() {
    metrics::counter!("proxy_websocket_sessions_total").increment(1);
}
