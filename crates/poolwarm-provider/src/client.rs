//! Client traits for the scaling backend and the readiness probe.
//!
//! Thin typed surfaces with no logic of their own — injected into the
//! orchestrator for testability. Methods return boxed futures to keep the
//! traits object-safe behind `Arc<dyn _>`.

use std::future::Future;
use std::pin::Pin;

use poolwarm_state::{ScalingConfig, ScalingUpdate};

use crate::error::{ProbeError, ProviderError};

/// Boxed future alias for scaling-provider calls.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Boxed future alias for readiness-probe calls.
pub type ProbeFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProbeError>> + Send + 'a>>;

/// The external service owning a pool's scaling configuration.
///
/// `update_desired_size` returns a [`ScalingUpdate`] descriptor whose handle
/// can be fed back into `describe_update` to track the mutation's progress.
pub trait ScalingProvider: Send + Sync {
    /// Read the pool's current scaling configuration.
    fn describe_scaling_config<'a>(&'a self, pool: &'a str)
    -> ProviderFuture<'a, ScalingConfig>;

    /// Request a new desired replica count for the pool.
    fn update_desired_size<'a>(
        &'a self,
        pool: &'a str,
        desired: u32,
    ) -> ProviderFuture<'a, ScalingUpdate>;

    /// Read the current status of a previously issued update.
    fn describe_update<'a>(
        &'a self,
        pool: &'a str,
        update_id: &'a str,
    ) -> ProviderFuture<'a, ScalingUpdate>;
}

/// The external service reporting how many nodes in a pool are ready.
pub trait ReadinessProbe: Send + Sync {
    /// Number of nodes currently ready for work.
    fn ready_count<'a>(&'a self, pool: &'a str) -> ProbeFuture<'a, u32>;
}
