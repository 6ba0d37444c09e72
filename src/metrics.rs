//! Prometheus metrics for slirc-net.
//!
//! Metrics are registered by [`init`]; the `record_*` helpers are no-ops
//! until then, so library users who never call it pay nothing.
//!
//! - `slirc_net_lines_sent_total` / `slirc_net_bytes_sent_total`
//! - `slirc_net_lines_received_total` / `slirc_net_bytes_received_total`
//! - `slirc_net_connection_outcomes_total{outcome}` - close, aborted, or an error code
//! - `slirc_net_flood_delay_seconds` - time spent waiting on flood control

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Lines written to a server.
pub static LINES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Bytes written to a server.
pub static BYTES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Lines decoded from a server.
pub static LINES_RECEIVED: OnceLock<IntCounter> = OnceLock::new();

/// Bytes decoded from a server, terminators excluded.
pub static BYTES_RECEIVED: OnceLock<IntCounter> = OnceLock::new();

/// Connection terminations by outcome.
pub static CONNECTION_OUTCOMES: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Histograms
// ========================================================================

pub static FLOOD_DELAY: OnceLock<Histogram> = OnceLock::new();

/// Register every metric with [`registry`].
///
/// Calling it more than once is harmless.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if $metric.set(m.clone()).is_ok() {
                        if let Err(e) = r.register(Box::new(m)) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(LINES_SENT, IntCounter::new("slirc_net_lines_sent_total", "Lines written to servers"));
    register!(BYTES_SENT, IntCounter::new("slirc_net_bytes_sent_total", "Bytes written to servers"));
    register!(LINES_RECEIVED, IntCounter::new("slirc_net_lines_received_total", "Lines received from servers"));
    register!(BYTES_RECEIVED, IntCounter::new("slirc_net_bytes_received_total", "Bytes received from servers"));
    register!(CONNECTION_OUTCOMES, IntCounterVec::new(
        Opts::new("slirc_net_connection_outcomes_total", "Connection terminations by outcome"),
        &["outcome"]));
    register!(FLOOD_DELAY, Histogram::with_opts(
        HistogramOpts::new("slirc_net_flood_delay_seconds", "Time outbound lines waited on flood control")
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

#[inline]
pub fn record_line_sent(bytes: usize) {
    if let Some(c) = LINES_SENT.get() {
        c.inc();
    }
    if let Some(c) = BYTES_SENT.get() {
        c.inc_by(bytes as u64);
    }
}

#[inline]
pub fn record_line_received(bytes: usize) {
    if let Some(c) = LINES_RECEIVED.get() {
        c.inc();
    }
    if let Some(c) = BYTES_RECEIVED.get() {
        c.inc_by(bytes as u64);
    }
}

/// Record how a connection ended.
#[inline]
pub fn record_outcome(outcome: &str) {
    if let Some(c) = CONNECTION_OUTCOMES.get() {
        c.with_label_values(&[outcome]).inc();
    }
}

#[inline]
pub fn record_flood_delay(secs: f64) {
    if let Some(h) = FLOOD_DELAY.get() {
        h.observe(secs);
    }
}
