// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; the binary installs the Prometheus recorder.
//! Without a recorder every call here is a no-op.

use std::time::Duration;

use checkpoint_core::{DomainKind, ResultSource};
use metrics::{describe_counter, describe_histogram};

/// Register all gateway metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "checkpoint_verifications_total",
        "Verification calls completed, by domain and result source"
    );
    describe_histogram!(
        "checkpoint_verification_latency_seconds",
        "End-to-end verification latency in seconds"
    );
    describe_counter!(
        "checkpoint_circuit_rejections_total",
        "Calls rejected by an open circuit breaker"
    );
}

/// Record one completed verification.
pub fn record_verification(domain: DomainKind, source: ResultSource, elapsed: Duration) {
    metrics::counter!(
        "checkpoint_verifications_total",
        "domain" => domain.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
    metrics::histogram!("checkpoint_verification_latency_seconds", "domain" => domain.to_string())
        .record(elapsed.as_secs_f64());
}

/// Record a call turned away by the circuit breaker.
pub fn record_circuit_rejection(domain: DomainKind) {
    metrics::counter!("checkpoint_circuit_rejections_total", "domain" => domain.to_string())
        .increment(1);
}
