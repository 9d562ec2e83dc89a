//! Domain types for the prewarm request lifecycle.
//!
//! These types describe a single prewarm request as it moves from admission
//! to a terminal state, plus the descriptors reported by the external
//! scaling backend. Everything is serializable so the API layer can hand
//! out snapshots verbatim.

use serde::{Deserialize, Serialize};

/// Unique identifier for a prewarm request.
pub type RequestId = String;

/// Name of the externally managed node pool being scaled.
pub type PoolName = String;

// ── Request record ─────────────────────────────────────────────────

/// Lifecycle status of a prewarm request.
///
/// Advances forward only: `Accepted → Running → {Succeeded | Failed}`,
/// with `Failed` also reachable straight from `Accepted` when a fault or
/// cancellation lands before the worker issues the scale mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrewarmStatus {
    /// Admitted and queued; the worker has not picked it up yet.
    Accepted,
    /// The worker is mutating the pool and polling for convergence.
    Running,
    /// Observed ready-node count reached the requested size.
    Succeeded,
    /// A provider/probe fault, timeout, or cancellation ended the request.
    Failed,
}

impl PrewarmStatus {
    /// Terminal states freeze the record: no field changes afterwards.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrewarmStatus::Succeeded | PrewarmStatus::Failed)
    }
}

/// A single prewarm request record.
///
/// Created by the submit path at admission; mutated exclusively by the
/// reconciliation worker from then on; read concurrently by any caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrewarmRequest {
    pub id: RequestId,
    /// Target node pool this request scales.
    pub pool: PoolName,
    /// Node count the caller asked for. Never mutated after creation.
    pub desired_size: u32,
    pub status: PrewarmStatus,
    /// Last observed ready-node count; overwritten on every poll cycle.
    pub ready_nodes: u32,
    /// Descriptor of the in-flight scaling update, absent until the
    /// mutation is issued; overwritten on every poll cycle.
    pub scaling_operation: Option<ScalingUpdate>,
    /// Failure description, populated only on the transition to `Failed`.
    pub error: Option<String>,
    /// Unix timestamp (seconds) when the request was admitted.
    pub created_at: u64,
    /// Unix timestamp (seconds) of the most recent mutation to this record.
    pub updated_at: u64,
}

impl PrewarmRequest {
    /// Build the record written at admission time.
    pub fn accepted(id: RequestId, pool: &str, desired_size: u32) -> Self {
        let now = epoch_secs();
        Self {
            id,
            pool: pool.to_string(),
            desired_size,
            status: PrewarmStatus::Accepted,
            ready_nodes: 0,
            scaling_operation: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// ── Scaling backend descriptors ────────────────────────────────────

/// Authoritative scaling configuration reported for a pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingConfig {
    /// Desired replica count currently set on the pool.
    pub desired: u32,
    /// Minimum replica count the backend allows.
    pub min: u32,
    /// Maximum replica count the backend allows.
    pub max: u32,
    /// Machine types provisioned for the pool, reported alongside the bounds.
    pub instance_types: Vec<String>,
}

/// Descriptor for a scaling update issued against a pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScalingUpdate {
    /// Backend-assigned handle for the update.
    pub id: String,
    pub status: UpdateStatus,
}

/// The scaling backend's own vocabulary for an update's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    InProgress,
    Successful,
    Failed,
    Cancelled,
}

// ── Pool description ───────────────────────────────────────────────

/// Combined view of a pool: scaling config plus observed readiness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolDescription {
    pub pool: PoolName,
    pub instance_types: Vec<String>,
    pub desired: u32,
    pub min: u32,
    pub max: u32,
    /// Nodes currently ready for work, as reported by the readiness probe.
    pub ready_nodes: u32,
}

fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_record_defaults() {
        let req = PrewarmRequest::accepted("prewarm-1".to_string(), "pool-a", 7);

        assert_eq!(req.status, PrewarmStatus::Accepted);
        assert_eq!(req.desired_size, 7);
        assert_eq!(req.ready_nodes, 0);
        assert!(req.scaling_operation.is_none());
        assert!(req.error.is_none());
        assert_eq!(req.created_at, req.updated_at);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!PrewarmStatus::Accepted.is_terminal());
        assert!(!PrewarmStatus::Running.is_terminal());
        assert!(PrewarmStatus::Succeeded.is_terminal());
        assert!(PrewarmStatus::Failed.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PrewarmStatus::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");

        let json = serde_json::to_string(&UpdateStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
