//! The reconciliation worker.
//!
//! A single background task drains the submission queue one request at a
//! time: issue the scale mutation, wait out the settle delay, then poll
//! the readiness probe and the scaling backend until the pool holds the
//! desired number of ready nodes. Readiness and the mutation descriptor
//! land in the store through one update per cycle, so readers never see a
//! count from one poll paired with a descriptor from another.
//!
//! A fault in any collaborator is caught exactly once, recorded on the
//! request, and the worker moves to the next submission. Nothing a single
//! request does can stop the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, error, info};

use poolwarm_provider::{ReadinessProbe, ScalingProvider};
use poolwarm_state::{PrewarmStatus, RequestStore};

use crate::config::PrewarmConfig;
use crate::error::{PrewarmError, PrewarmResult};
use crate::queue::{CancelRegistry, Submission, SubmissionReceiver};

/// Single-flight consumer of the submission queue.
///
/// Constructed alongside [`crate::PrewarmService`]; spawn it with
/// `tokio::spawn(worker.run(shutdown))`.
pub struct ReconcileWorker {
    config: PrewarmConfig,
    store: RequestStore,
    scaling: Arc<dyn ScalingProvider>,
    probe: Arc<dyn ReadinessProbe>,
    cancels: CancelRegistry,
    queue: SubmissionReceiver,
}

impl ReconcileWorker {
    pub(crate) fn new(
        config: PrewarmConfig,
        store: RequestStore,
        scaling: Arc<dyn ScalingProvider>,
        probe: Arc<dyn ReadinessProbe>,
        cancels: CancelRegistry,
        queue: SubmissionReceiver,
    ) -> Self {
        Self {
            config,
            store,
            scaling,
            probe,
            cancels,
            queue,
        }
    }

    /// Drain submissions until the queue closes or shutdown flips.
    ///
    /// A request already being reconciled is driven to a terminal state
    /// before the shutdown signal is observed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(pool = %self.config.pool, "reconciliation worker started");
        loop {
            tokio::select! {
                submission = self.queue.recv() => match submission {
                    Some(submission) => self.process(submission).await,
                    None => {
                        info!("submission queue closed, reconciliation worker exiting");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("reconciliation worker shutting down");
                    break;
                }
            }
        }
    }

    /// Drive one submission to a terminal state, catching any fault.
    async fn process(&self, submission: Submission) {
        let Submission {
            id,
            desired_size,
            mut cancel,
        } = submission;

        if let Err(e) = self.reconcile(&id, desired_size, &mut cancel).await {
            error!(request_id = %id, error = %e, "prewarm request failed");
            let description = e.to_string();
            let recorded = self
                .store
                .update(&id, |req| {
                    req.status = PrewarmStatus::Failed;
                    req.error = Some(description.clone());
                })
                .await;
            if let Err(store_err) = recorded {
                error!(request_id = %id, error = %store_err, "failed to record request failure");
            }
        }
        self.cancels.remove(&id).await;
    }

    async fn reconcile(
        &self,
        id: &str,
        desired: u32,
        cancel: &mut watch::Receiver<bool>,
    ) -> PrewarmResult<()> {
        let pool = self.config.pool.as_str();

        // Canceled while still queued: fail before touching the backend.
        if *cancel.borrow() {
            return Err(PrewarmError::Canceled);
        }

        let ready = self.probe.ready_count(pool).await?;
        self.store
            .update(id, |req| {
                req.status = PrewarmStatus::Running;
                req.ready_nodes = ready;
            })
            .await?;
        info!(request_id = %id, desired, ready, "prewarm request running");

        let update = self.scaling.update_desired_size(pool, desired).await?;
        let update_id = update.id.clone();
        debug!(request_id = %id, update_id = %update_id, "scale mutation issued");
        self.store
            .update(id, |req| req.scaling_operation = Some(update))
            .await?;

        // Give the backend a head start before the first poll.
        sleep_unless_canceled(self.config.settle_delay, cancel).await?;

        let poll_started = Instant::now();
        loop {
            let ready = self.probe.ready_count(pool).await?;
            let update = self.scaling.describe_update(pool, &update_id).await?;
            let converged = ready == desired;

            // Count, descriptor, and (on convergence) status land in one
            // store update.
            self.store
                .update(id, |req| {
                    req.ready_nodes = ready;
                    req.scaling_operation = Some(update);
                    if converged {
                        req.status = PrewarmStatus::Succeeded;
                    }
                })
                .await?;

            if converged {
                info!(request_id = %id, ready, "prewarm request succeeded");
                return Ok(());
            }

            let waited = poll_started.elapsed();
            if waited >= self.config.max_poll {
                return Err(PrewarmError::ConvergenceTimeout {
                    desired,
                    ready,
                    waited,
                });
            }
            debug!(request_id = %id, ready, desired, "pool not converged yet");
            sleep_unless_canceled(self.config.poll_interval, cancel).await?;
        }
    }
}

/// Sleep for `duration`, cutting out with [`PrewarmError::Canceled`] the
/// moment the request's signal flips.
async fn sleep_unless_canceled(
    duration: Duration,
    cancel: &mut watch::Receiver<bool>,
) -> PrewarmResult<()> {
    if *cancel.borrow() {
        return Err(PrewarmError::Canceled);
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = wait_for_cancel(cancel) => Err(PrewarmError::Canceled),
    }
}

/// Resolves only once the signal reads `true`. If the sender side goes
/// away without flipping, this pends forever and lets the sleep win.
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
