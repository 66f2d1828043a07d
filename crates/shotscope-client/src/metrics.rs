//! Job client metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder
//! these calls are no-ops.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total job service requests by operation and status.
    pub const REQUESTS_TOTAL: &str = "shotscope_requests_total";

    /// Total status checks issued by polling loops.
    pub const POLL_ATTEMPTS_TOTAL: &str = "shotscope_poll_attempts_total";

    /// Polling loops finished, by outcome.
    pub const POLL_OUTCOMES_TOTAL: &str = "shotscope_poll_outcomes_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "shotscope_request_latency_seconds";
}

/// Record metrics for a completed request.
pub fn record_request(operation: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record one status check.
pub fn record_poll_attempt() {
    counter!(names::POLL_ATTEMPTS_TOTAL).increment(1);
}

/// Record how a polling loop ended ("succeeded", "failed", "timeout", "error").
pub fn record_poll_outcome(outcome: &'static str) {
    counter!(names::POLL_OUTCOMES_TOTAL, "outcome" => outcome).increment(1);
}
