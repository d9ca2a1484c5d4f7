//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define server metrics (requests, render latency, cache effectiveness)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `ssr_requests_total` (counter): requests by outcome, status
//! - `ssr_request_duration_seconds` (histogram): end-to-end latency by outcome
//! - `ssr_render_duration_seconds` (histogram): renderer time on cache misses
//! - `ssr_render_cache_hits_total` / `ssr_render_cache_misses_total` (counters)
//! - `ssr_render_cache_entries` (gauge): stored pages
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality: outcome and status only, never the URL

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished page request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!("ssr_requests_total", "outcome" => outcome, "status" => status.to_string()).increment(1);
    histogram!("ssr_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_render(duration: Duration) {
    histogram!("ssr_render_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_cache(hit: bool) {
    if hit {
        counter!("ssr_render_cache_hits_total").increment(1);
    } else {
        counter!("ssr_render_cache_misses_total").increment(1);
    }
}

pub fn record_cache_size(entries: usize) {
    gauge!("ssr_render_cache_entries").set(entries as f64);
}
