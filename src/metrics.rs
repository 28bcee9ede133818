//! Prometheus metrics collection for chatd.
//!
//! Metrics are registered by [`init`] at startup and exposed by the HTTP
//! listener on `/metrics`. Every recording helper is a no-op until `init`
//! has run, so unit tests never need a registry.
//!
//! - `chat_connected_clients` - Currently registered connections (gauge)
//! - `chat_broadcasts_total` - Payloads fanned out
//! - `chat_deliveries_total` - Individual sends that were queued
//! - `chat_send_failures_total{error}` - Individual sends that failed
//! - `chat_liveness_terminations_total` - Connections dropped for missing a probe
//! - `chat_commands_total{command}` - Inbound commands handled
//! - `chat_protocol_errors_total{error}` - Inbound payloads rejected

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

pub static CONNECTED_CLIENTS: OnceLock<IntGauge> = OnceLock::new();
pub static BROADCASTS: OnceLock<IntCounter> = OnceLock::new();
pub static DELIVERIES: OnceLock<IntCounter> = OnceLock::new();
pub static SEND_FAILURES: OnceLock<IntCounterVec> = OnceLock::new();
pub static LIVENESS_TERMINATIONS: OnceLock<IntCounter> = OnceLock::new();
pub static COMMANDS: OnceLock<IntCounterVec> = OnceLock::new();
pub static PROTOCOL_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(CONNECTED_CLIENTS, IntGauge::new("chat_connected_clients", "Currently registered connections"));
    register!(BROADCASTS, IntCounter::new("chat_broadcasts_total", "Payloads fanned out"));
    register!(DELIVERIES, IntCounter::new("chat_deliveries_total", "Individual sends queued"));
    register!(SEND_FAILURES, IntCounterVec::new(Opts::new("chat_send_failures_total", "Individual sends that failed"), &["error"]));
    register!(LIVENESS_TERMINATIONS, IntCounter::new("chat_liveness_terminations_total", "Connections terminated for missing a liveness probe"));
    register!(COMMANDS, IntCounterVec::new(Opts::new("chat_commands_total", "Inbound commands handled"), &["command"]));
    register!(PROTOCOL_ERRORS, IntCounterVec::new(Opts::new("chat_protocol_errors_total", "Inbound payloads rejected"), &["error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
        String::new()
    })
}

// ============================================================================
// Recording helpers
// ============================================================================

pub fn client_connected() {
    if let Some(m) = CONNECTED_CLIENTS.get() {
        m.inc();
    }
}

pub fn client_disconnected() {
    if let Some(m) = CONNECTED_CLIENTS.get() {
        m.dec();
    }
}

pub fn record_broadcast(delivered: usize) {
    if let Some(m) = BROADCASTS.get() {
        m.inc();
    }
    if let Some(m) = DELIVERIES.get() {
        m.inc_by(delivered as u64);
    }
}

pub fn record_send_failure(error: &str) {
    if let Some(m) = SEND_FAILURES.get() {
        m.with_label_values(&[error]).inc();
    }
}

pub fn record_liveness_termination() {
    if let Some(m) = LIVENESS_TERMINATIONS.get() {
        m.inc();
    }
}

pub fn record_command(command: &str) {
    if let Some(m) = COMMANDS.get() {
        m.with_label_values(&[command]).inc();
    }
}

pub fn record_protocol_error(error: &str) {
    if let Some(m) = PROTOCOL_ERRORS.get() {
        m.with_label_values(&[error]).inc();
    }
}
