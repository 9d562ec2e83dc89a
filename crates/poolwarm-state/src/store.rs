//! In-memory request store.
//!
//! Maps request id → [`PrewarmRequest`]. One writer mutates a given record
//! at a time by construction (the submit path writes only at creation, the
//! reconciliation worker owns it afterwards), while arbitrary callers read
//! concurrently. [`RequestStore::update`] applies a closure under a single
//! write-lock hold, so a multi-field update lands atomically and readers
//! never see half of it.
//!
//! Records are never deleted; they live as long as the process does.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::types::{PrewarmRequest, RequestId};

/// Concurrency-safe map of prewarm request records.
#[derive(Clone, Default)]
pub struct RequestStore {
    requests: Arc<RwLock<HashMap<RequestId, PrewarmRequest>>>,
}

impl RequestStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record created at admission.
    ///
    /// Request ids are process-unique, so this never replaces an existing
    /// record in practice.
    pub async fn insert(&self, request: PrewarmRequest) {
        let mut requests = self.requests.write().await;
        debug!(
            request_id = %request.id,
            pool = %request.pool,
            desired = request.desired_size,
            "request record created"
        );
        requests.insert(request.id.clone(), request);
    }

    /// Snapshot of a single record, cloned under the read lock.
    pub async fn get(&self, id: &str) -> Option<PrewarmRequest> {
        let requests = self.requests.read().await;
        requests.get(id).cloned()
    }

    /// Apply `mutate` to a record under one write-lock hold and refresh its
    /// `updated_at` timestamp. Returns the record as it stands after the
    /// update.
    ///
    /// Terminal records are frozen: updating one fails with
    /// [`StoreError::Terminal`] and leaves it untouched.
    pub async fn update<F>(&self, id: &str, mutate: F) -> StoreResult<PrewarmRequest>
    where
        F: FnOnce(&mut PrewarmRequest),
    {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if request.status.is_terminal() {
            return Err(StoreError::Terminal(id.to_string()));
        }

        mutate(request);
        request.updated_at = epoch_secs();
        Ok(request.clone())
    }

    /// Snapshots of all records, in no particular order.
    pub async fn list(&self) -> Vec<PrewarmRequest> {
        let requests = self.requests.read().await;
        requests.values().cloned().collect()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        let requests = self.requests.read().await;
        requests.len()
    }

    /// True when no request has ever been admitted.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
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
    use crate::types::{PrewarmStatus, ScalingUpdate, UpdateStatus};

    fn test_request(id: &str) -> PrewarmRequest {
        PrewarmRequest::accepted(id.to_string(), "pool-a", 5)
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;

        let snapshot = store.get("prewarm-1").await.unwrap();
        assert_eq!(snapshot.id, "prewarm-1");
        assert_eq!(snapshot.status, PrewarmStatus::Accepted);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let store = RequestStore::new();
        assert!(store.get("nope").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_applies_field_group_atomically() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;

        let updated = store
            .update("prewarm-1", |req| {
                req.status = PrewarmStatus::Running;
                req.ready_nodes = 3;
                req.scaling_operation = Some(ScalingUpdate {
                    id: "upd-1".to_string(),
                    status: UpdateStatus::InProgress,
                });
            })
            .await
            .unwrap();

        assert_eq!(updated.status, PrewarmStatus::Running);
        assert_eq!(updated.ready_nodes, 3);
        assert_eq!(updated.scaling_operation.as_ref().unwrap().id, "upd-1");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn update_unknown_fails() {
        let store = RequestStore::new();
        let err = store.update("nope", |_| {}).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn terminal_records_are_frozen() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;
        store
            .update("prewarm-1", |req| req.status = PrewarmStatus::Succeeded)
            .await
            .unwrap();

        let err = store
            .update("prewarm-1", |req| req.ready_nodes = 99)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Terminal(_)));

        // Untouched by the refused update.
        let snapshot = store.get("prewarm-1").await.unwrap();
        assert_eq!(snapshot.status, PrewarmStatus::Succeeded);
        assert_eq!(snapshot.ready_nodes, 0);
    }

    #[tokio::test]
    async fn snapshots_are_isolated_from_the_store() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;

        let mut snapshot = store.get("prewarm-1").await.unwrap();
        snapshot.ready_nodes = 42;

        assert_eq!(store.get("prewarm-1").await.unwrap().ready_nodes, 0);
    }

    #[tokio::test]
    async fn list_returns_every_record() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;
        store.insert(test_request("prewarm-2")).await;

        let mut ids: Vec<String> = store.list().await.into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["prewarm-1", "prewarm-2"]);
    }

    #[tokio::test]
    async fn concurrent_reads_never_observe_torn_updates() {
        let store = RequestStore::new();
        store.insert(test_request("prewarm-1")).await;

        let writer_store = store.clone();
        let writer = tokio::spawn(async move {
            for cycle in 1..=200u32 {
                writer_store
                    .update("prewarm-1", |req| {
                        req.ready_nodes = cycle;
                        req.scaling_operation = Some(ScalingUpdate {
                            id: format!("upd-{cycle}"),
                            status: UpdateStatus::InProgress,
                        });
                    })
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
            }
        });

        // Reader: ready_nodes must always pair with the update written in
        // the same cycle.
        let reader_store = store.clone();
        let reader = tokio::spawn(async move {
            loop {
                let snapshot = reader_store.get("prewarm-1").await.unwrap();
                if let Some(op) = &snapshot.scaling_operation {
                    assert_eq!(op.id, format!("upd-{}", snapshot.ready_nodes));
                }
                if snapshot.ready_nodes == 200 {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });

        writer.await.unwrap();
        reader.await.unwrap();
    }
}
