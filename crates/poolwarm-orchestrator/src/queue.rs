//! Submission queue and per-request cancellation signals.
//!
//! Admission and reconciliation are connected by an unbounded FIFO:
//! the service enqueues, the single worker drains in order, and enqueue
//! never blocks the submit path. Cancellation rides alongside as one
//! `watch` channel per request — flipping the signal never touches the
//! record itself, so the worker stays the only post-admission writer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};

use poolwarm_state::RequestId;

/// An admitted request on its way to the worker.
#[derive(Debug)]
pub struct Submission {
    pub id: RequestId,
    pub desired_size: u32,
    /// Flips to `true` when an operator cancels the request.
    pub cancel: watch::Receiver<bool>,
}

pub type SubmissionSender = mpsc::UnboundedSender<Submission>;
pub type SubmissionReceiver = mpsc::UnboundedReceiver<Submission>;

/// Build the queue connecting admission to the worker.
///
/// Single producer, single consumer; submissions are dequeued in the
/// order they were admitted.
pub fn submission_queue() -> (SubmissionSender, SubmissionReceiver) {
    mpsc::unbounded_channel()
}

/// Cancel signals for queued and in-flight requests.
///
/// A signal is registered at admission and dropped after the worker
/// finalizes the record. Whether a request still counts as cancelable
/// is decided against the record, not this registry; see
/// [`crate::PrewarmService::cancel`].
#[derive(Clone, Default)]
pub struct CancelRegistry {
    channels: Arc<RwLock<HashMap<RequestId, watch::Sender<bool>>>>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh signal for an admitted request and hand back the
    /// receiver that travels with its submission.
    pub async fn register(&self, id: &str) -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        self.channels.write().await.insert(id.to_string(), tx);
        rx
    }

    /// Flip a request's signal. Returns `false` when no signal is
    /// registered under the id.
    pub async fn cancel(&self, id: &str) -> bool {
        match self.channels.read().await.get(id) {
            Some(tx) => {
                tx.send_replace(true);
                true
            }
            None => false,
        }
    }

    /// Drop a request's signal once its record is terminal.
    pub async fn remove(&self, id: &str) {
        self.channels.write().await.remove(id);
    }

    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_preserves_admission_order() {
        let registry = CancelRegistry::new();
        let (tx, mut rx) = submission_queue();
        for (id, size) in [("req-a", 5), ("req-b", 7), ("req-c", 2)] {
            let cancel = registry.register(id).await;
            tx.send(Submission {
                id: id.to_string(),
                desired_size: size,
                cancel,
            })
            .unwrap();
        }

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        let third = rx.recv().await.unwrap();
        assert_eq!(
            [first.id.as_str(), second.id.as_str(), third.id.as_str()],
            ["req-a", "req-b", "req-c"]
        );
        assert_eq!(second.desired_size, 7);
    }

    #[tokio::test]
    async fn cancel_flips_the_registered_signal() {
        let registry = CancelRegistry::new();
        let rx = registry.register("req-a").await;
        assert!(!*rx.borrow());

        assert!(registry.cancel("req-a").await);
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn cancel_before_the_worker_looks_is_still_visible() {
        let registry = CancelRegistry::new();
        let rx = registry.register("req-a").await;
        assert!(registry.cancel("req-a").await);

        // A receiver cloned later still observes the flipped value.
        let late = rx.clone();
        assert!(*late.borrow());
    }

    #[tokio::test]
    async fn cancel_of_unknown_request_reports_false() {
        let registry = CancelRegistry::new();
        assert!(!registry.cancel("req-missing").await);
    }

    #[tokio::test]
    async fn remove_drops_the_signal() {
        let registry = CancelRegistry::new();
        let _rx = registry.register("req-a").await;
        assert_eq!(registry.len().await, 1);

        registry.remove("req-a").await;
        assert!(registry.is_empty().await);
        assert!(!registry.cancel("req-a").await);
    }
}
