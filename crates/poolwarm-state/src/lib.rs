//! poolwarm-state — in-memory request state for poolwarm.
//!
//! Holds the domain types for prewarm requests and the `RequestStore`,
//! a concurrency-safe map from request id to request record.
//!
//! # Architecture
//!
//! The store is `Clone` + `Send` + `Sync` (backed by `Arc<RwLock<HashMap>>`)
//! and shared across async tasks. Writes go through [`RequestStore::update`],
//! which applies a closure under a single write-lock hold so that fields
//! updated together (`ready_nodes` + `scaling_operation`) land as one unit
//! and a concurrent reader never observes a torn record. Reads clone a
//! snapshot under the read lock.
//!
//! State is process-local by contract: nothing is persisted, and a restart
//! forgets every request.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use store::RequestStore;
pub use types::*;
