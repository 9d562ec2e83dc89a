//! Admission validation against the scaling backend's live bounds.
//!
//! Every submission is checked before a record is created or anything is
//! enqueued: against the pool's configured maximum, its minimum, and its
//! current desired size. A rejected submission leaves no trace in the
//! store. Bounds are fetched fresh for every check rather than cached, so
//! a pool resized out of band is always judged against current truth.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use poolwarm_provider::ScalingProvider;
use poolwarm_state::ScalingConfig;

/// Why a submission was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Requested size exceeds the pool's configured maximum.
    AboveMaximum { requested: u32, max: u32 },
    /// Requested size is under the pool's configured minimum.
    BelowMinimum { requested: u32, min: u32 },
    /// The pool already sits at the requested size; scaling would be a
    /// no-op.
    AlreadyAtSize { desired: u32 },
    /// The scaling backend could not be consulted, so no verdict on the
    /// size itself was possible.
    Unavailable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveMaximum { requested, max } => write!(
                f,
                "above maximum: requested {requested}, pool allows at most {max}"
            ),
            Self::BelowMinimum { requested, min } => write!(
                f,
                "below minimum: requested {requested}, pool requires at least {min}"
            ),
            Self::AlreadyAtSize { desired } => {
                write!(f, "already at requested size: {desired}")
            }
            Self::Unavailable(detail) => write!(f, "validation unavailable: {detail}"),
        }
    }
}

/// Outcome of validating a proposed desired size.
#[derive(Debug)]
pub enum AdmissionDecision {
    /// Admit; carries the scaling config the verdict was made against.
    Admit(ScalingConfig),
    Reject(RejectReason),
}

/// Checks proposed sizes against the pool's live scaling config.
#[derive(Clone)]
pub struct AdmissionValidator {
    provider: Arc<dyn ScalingProvider>,
}

impl AdmissionValidator {
    pub fn new(provider: Arc<dyn ScalingProvider>) -> Self {
        Self { provider }
    }

    /// Judge a proposed desired size for `pool`.
    ///
    /// Checks run in order: maximum, minimum, then equality with the
    /// current desired size. A backend failure rejects the submission as
    /// unavailable rather than admitting it unchecked.
    pub async fn validate(&self, pool: &str, desired_size: u32) -> AdmissionDecision {
        let config = match self.provider.describe_scaling_config(pool).await {
            Ok(config) => config,
            Err(e) => {
                warn!(%pool, error = %e, "admission check could not reach the scaling backend");
                return AdmissionDecision::Reject(RejectReason::Unavailable(e.to_string()));
            }
        };

        if desired_size > config.max {
            return AdmissionDecision::Reject(RejectReason::AboveMaximum {
                requested: desired_size,
                max: config.max,
            });
        }
        if desired_size < config.min {
            return AdmissionDecision::Reject(RejectReason::BelowMinimum {
                requested: desired_size,
                min: config.min,
            });
        }
        if desired_size == config.desired {
            return AdmissionDecision::Reject(RejectReason::AlreadyAtSize {
                desired: desired_size,
            });
        }

        debug!(%pool, desired_size, current = config.desired, "admission check passed");
        AdmissionDecision::Admit(config)
    }
}
