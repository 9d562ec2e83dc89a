//! poolwarm-orchestrator: the asynchronous prewarm pipeline.
//!
//! A prewarm request travels through three stages, each owned by one
//! module:
//!
//! ```text
//!   submit ──► AdmissionValidator ──► RequestStore record + FIFO queue
//!                                            │
//!                                            ▼
//!                                     ReconcileWorker
//!                               (scale, settle, poll, finalize)
//! ```
//!
//! [`PrewarmService`] is the front door: it validates a proposed desired
//! size against the scaling backend's live bounds, creates the request
//! record, and enqueues the work. A single [`ReconcileWorker`] drains the
//! queue one request at a time, issues the scale mutation, and polls the
//! readiness probe until the pool converges, the deadline passes, or the
//! request is canceled. The worker is the only writer to a record after
//! admission, which keeps the store free of write races without any
//! per-request locking.

pub mod config;
pub mod error;
pub mod queue;
pub mod service;
pub mod validator;
pub mod worker;

pub use config::PrewarmConfig;
pub use error::{PrewarmError, PrewarmResult};
pub use queue::{submission_queue, CancelRegistry, Submission};
pub use service::PrewarmService;
pub use validator::{AdmissionDecision, AdmissionValidator, RejectReason};
pub use worker::ReconcileWorker;
