//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirection_decisions_total` (counter): early-phase outcomes by `outcome`
//! - `redirection_backend_errors_total` (counter): failed commands by `command`
//! - `redirection_logs_total` (counter): log commands delivered
//! - `redirection_command_duration_seconds` (histogram): command latency by `command`
//!
//! Without an installed recorder every call is a no-op, which keeps tests
//! and library users free of global setup.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Outcome of the decision phase, used as a metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Redirect,
    Gone,
    PassThrough,
    AdminExcluded,
    Misconfigured,
}

impl DecisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOutcome::Redirect => "redirect",
            DecisionOutcome::Gone => "gone",
            DecisionOutcome::PassThrough => "pass_through",
            DecisionOutcome::AdminExcluded => "admin_excluded",
            DecisionOutcome::Misconfigured => "misconfigured",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: DecisionOutcome) {
    counter!("redirection_decisions_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_command(command: &'static str, start: Instant) {
    histogram!("redirection_command_duration_seconds", "command" => command)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_error(command: &'static str) {
    counter!("redirection_backend_errors_total", "command" => command).increment(1);
}

pub fn record_log_sent() {
    counter!("redirection_logs_total").increment(1);
}
