//! poolwarm-provider — client interfaces to the external systems poolwarm
//! drives.
//!
//! Two collaborators own everything poolwarm observes and mutates:
//!
//! - the **Cluster Scaling Provider**, which holds the authoritative scaling
//!   configuration (desired/min/max, instance types) for a named pool and
//!   executes desired-size updates, and
//! - the **Node Readiness Probe**, which reports how many nodes in a pool
//!   are currently ready for work.
//!
//! Both are expressed as object-safe traits with boxed-future methods so the
//! orchestrator can be wired against anything: a cloud SDK adapter in a real
//! deployment, or the in-tree [`SimulatedCluster`] that backs standalone
//! mode and the test suite. No wire format is assumed here.

pub mod client;
pub mod error;
pub mod sim;

pub use client::{ProbeFuture, ProviderFuture, ReadinessProbe, ScalingProvider};
pub use error::{ProbeError, ProviderError};
pub use sim::SimulatedCluster;
