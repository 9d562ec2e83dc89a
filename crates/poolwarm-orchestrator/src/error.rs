//! Error types for the prewarm pipeline.

use std::time::Duration;

use thiserror::Error;

use poolwarm_provider::{ProbeError, ProviderError};
use poolwarm_state::StoreError;

pub type PrewarmResult<T> = Result<T, PrewarmError>;

/// Faults that end a reconciliation or surface from a pool passthrough.
///
/// When one of these aborts a reconciliation, the worker records its
/// rendered message in the request's `error` field and moves on to the
/// next submission.
#[derive(Debug, Error)]
pub enum PrewarmError {
    #[error("scaling provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("readiness probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("request store error: {0}")]
    Store(#[from] StoreError),

    #[error("pool did not reach {desired} ready nodes within {waited:?} (last observed {ready})")]
    ConvergenceTimeout {
        desired: u32,
        ready: u32,
        waited: Duration,
    },

    #[error("canceled by operator")]
    Canceled,
}
