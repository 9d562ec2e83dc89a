//! Error types for the external client interfaces.
//!
//! Failures are non-retryable within a single call: callers surface them
//! (admission, passthroughs) or record them into the request's terminal
//! state (reconciliation) — they never guess a result.

use thiserror::Error;

/// Errors reported by the Cluster Scaling Provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("scaling backend unreachable: {0}")]
    Unreachable(String),

    #[error("scaling backend denied the request: {0}")]
    Denied(String),

    #[error("invalid scaling request: {0}")]
    Invalid(String),

    #[error("unknown pool: {0}")]
    UnknownPool(String),

    #[error("unknown scaling update: {0}")]
    UnknownUpdate(String),
}

/// Errors reported by the Node Readiness Probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("readiness probe unreachable: {0}")]
    Unreachable(String),

    #[error("readiness probe knows no pool: {0}")]
    UnknownPool(String),
}
