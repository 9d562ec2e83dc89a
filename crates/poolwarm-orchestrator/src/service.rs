//! The service facade: every operation the outside world performs on the
//! prewarm pipeline goes through [`PrewarmService`].

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use poolwarm_provider::{ReadinessProbe, ScalingProvider};
use poolwarm_state::{PoolDescription, PrewarmRequest, PrewarmStatus, RequestId, RequestStore};

use crate::config::PrewarmConfig;
use crate::error::PrewarmResult;
use crate::queue::{submission_queue, CancelRegistry, Submission, SubmissionSender};
use crate::validator::{AdmissionDecision, AdmissionValidator, RejectReason};
use crate::worker::ReconcileWorker;

/// Front door for prewarm operations: admission, status reads,
/// cancellation, and pool passthroughs.
///
/// Cheap to clone; every clone shares the store, the queue, and the
/// cancel registry with the worker built alongside it.
#[derive(Clone)]
pub struct PrewarmService {
    config: PrewarmConfig,
    store: RequestStore,
    validator: AdmissionValidator,
    scaling: Arc<dyn ScalingProvider>,
    probe: Arc<dyn ReadinessProbe>,
    queue: SubmissionSender,
    cancels: CancelRegistry,
}

impl PrewarmService {
    /// Wire a service and its reconciliation worker over the given
    /// backend. The worker is handed back unstarted; spawn it with
    /// `tokio::spawn(worker.run(shutdown))`.
    pub fn new(
        config: PrewarmConfig,
        scaling: Arc<dyn ScalingProvider>,
        probe: Arc<dyn ReadinessProbe>,
    ) -> (Self, ReconcileWorker) {
        let store = RequestStore::new();
        let cancels = CancelRegistry::new();
        let (queue, submissions) = submission_queue();
        let worker = ReconcileWorker::new(
            config.clone(),
            store.clone(),
            scaling.clone(),
            probe.clone(),
            cancels.clone(),
            submissions,
        );
        let service = Self {
            validator: AdmissionValidator::new(scaling.clone()),
            config,
            store,
            scaling,
            probe,
            queue,
            cancels,
        };
        (service, worker)
    }

    /// Validate a proposed desired size and, on admission, create the
    /// request record and enqueue it for reconciliation.
    ///
    /// Returns the fresh request id immediately; progress is observed
    /// through [`status`](Self::status). A rejected submission leaves no
    /// record behind.
    pub async fn submit(&self, desired_size: u32) -> Result<RequestId, RejectReason> {
        let config = match self.validator.validate(&self.config.pool, desired_size).await {
            AdmissionDecision::Admit(config) => config,
            AdmissionDecision::Reject(reason) => {
                info!(desired_size, %reason, "prewarm request rejected");
                return Err(reason);
            }
        };

        let id = generate_request_id();
        let cancel = self.cancels.register(&id).await;
        self.store
            .insert(PrewarmRequest::accepted(
                id.clone(),
                &self.config.pool,
                desired_size,
            ))
            .await;
        info!(
            request_id = %id,
            desired_size,
            current = config.desired,
            "prewarm request admitted"
        );

        let submission = Submission {
            id: id.clone(),
            desired_size,
            cancel,
        };
        if self.queue.send(submission).is_err() {
            // No worker is draining the queue; fail the record rather
            // than leave it accepted forever.
            warn!(request_id = %id, "submission queue closed, failing request");
            let _ = self
                .store
                .update(&id, |req| {
                    req.status = PrewarmStatus::Failed;
                    req.error = Some("submission queue closed".to_string());
                })
                .await;
            self.cancels.remove(&id).await;
        }
        Ok(id)
    }

    /// Snapshot of a request record, if it exists.
    pub async fn status(&self, id: &str) -> Option<PrewarmRequest> {
        self.store.get(id).await
    }

    /// Ask the worker to abandon a request. Returns `true` when a live
    /// request was signaled; unknown and already-finalized requests
    /// report `false`.
    pub async fn cancel(&self, id: &str) -> bool {
        if !self.cancels.cancel(id).await {
            return false;
        }
        // The worker clears the signal entry only after its terminal
        // store write, so a cancel can land in between. The record, not
        // the registry, decides whether the request was still live.
        match self.store.get(id).await {
            Some(record) if record.status.is_terminal() => false,
            _ => {
                info!(request_id = %id, "cancellation requested");
                true
            }
        }
    }

    /// Current ready-node count of the pool, independent of any request.
    pub async fn ready_node_count(&self) -> PrewarmResult<u32> {
        let ready = self.probe.ready_count(&self.config.pool).await?;
        Ok(ready)
    }

    /// Combined scaling-config and readiness view of the pool.
    pub async fn describe_pool(&self) -> PrewarmResult<PoolDescription> {
        let config = self
            .scaling
            .describe_scaling_config(&self.config.pool)
            .await?;
        let ready = self.probe.ready_count(&self.config.pool).await?;
        Ok(PoolDescription {
            pool: self.config.pool.clone(),
            instance_types: config.instance_types,
            desired: config.desired,
            min: config.min,
            max: config.max,
            ready_nodes: ready,
        })
    }

    /// The pool this service manages.
    pub fn pool(&self) -> &str {
        &self.config.pool
    }
}

/// Ids look like `prewarm-0001-ab54d2f1`: a process-local sequence number
/// plus a hash salted with the submission time.
fn generate_request_id() -> RequestId {
    static SEQ: AtomicU64 = AtomicU64::new(1);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let mut hasher = DefaultHasher::new();
    seq.hash(&mut hasher);
    epoch_millis().hash(&mut hasher);
    format!("prewarm-{seq:04x}-{:08x}", hasher.finish() as u32)
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
