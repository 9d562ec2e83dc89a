//! Simulated cluster — an in-process pool model implementing both client
//! traits.
//!
//! Backs the daemon's standalone mode and the test suite, since real cloud
//! SDK adapters live outside this repository. The model converges one step
//! per readiness query: each observation is a tick of the sim's clock, so a
//! polling worker watches the pool drift toward the desired size at
//! `converge_step` nodes per poll. A step of zero freezes the pool, which is
//! how tests exercise the convergence-timeout path.
//!
//! Fault injection is single-shot: each `fail_next_*` flag fails exactly one
//! call and then clears, mirroring a transient backend outage.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use poolwarm_state::{PoolName, ScalingConfig, ScalingUpdate, UpdateStatus};

use crate::client::{ProbeFuture, ProviderFuture, ReadinessProbe, ScalingProvider};
use crate::error::{ProbeError, ProviderError};

struct PoolModel {
    desired: u32,
    min: u32,
    max: u32,
    instance_types: Vec<String>,
    ready: u32,
    converge_step: u32,
    /// Issued updates by handle.
    updates: HashMap<String, ScalingUpdate>,
    update_seq: u64,
    fail_next_describe: bool,
    fail_next_update: bool,
    fail_next_probe: bool,
}

/// In-memory stand-in for the scaling backend and the readiness probe.
pub struct SimulatedCluster {
    pool: PoolName,
    model: Mutex<PoolModel>,
}

impl SimulatedCluster {
    /// Create a pool already settled at `initial` ready nodes.
    pub fn new(pool: &str, min: u32, max: u32, initial: u32) -> Self {
        Self {
            pool: pool.to_string(),
            model: Mutex::new(PoolModel {
                desired: initial,
                min,
                max,
                instance_types: vec!["m5.xlarge".to_string()],
                ready: initial,
                converge_step: 1,
                updates: HashMap::new(),
                update_seq: 0,
                fail_next_describe: false,
                fail_next_update: false,
                fail_next_probe: false,
            }),
        }
    }

    /// Override the instance types reported for the pool.
    pub fn with_instance_types(mut self, instance_types: Vec<String>) -> Self {
        self.model.get_mut().instance_types = instance_types;
        self
    }

    /// Nodes gained (or drained) per readiness query. Zero freezes the pool.
    pub fn with_converge_step(mut self, step: u32) -> Self {
        self.model.get_mut().converge_step = step;
        self
    }

    /// Pin the ready count directly, bypassing convergence.
    pub async fn set_ready(&self, ready: u32) {
        self.model.lock().await.ready = ready;
    }

    /// Current ready count without ticking the model.
    pub async fn current_ready(&self) -> u32 {
        self.model.lock().await.ready
    }

    /// Fail the next `describe_scaling_config` call.
    pub async fn fail_next_describe(&self) {
        self.model.lock().await.fail_next_describe = true;
    }

    /// Fail the next `update_desired_size` call.
    pub async fn fail_next_update(&self) {
        self.model.lock().await.fail_next_update = true;
    }

    /// Fail the next `ready_count` call.
    pub async fn fail_next_probe(&self) {
        self.model.lock().await.fail_next_probe = true;
    }
}

impl ScalingProvider for SimulatedCluster {
    fn describe_scaling_config<'a>(
        &'a self,
        pool: &'a str,
    ) -> ProviderFuture<'a, ScalingConfig> {
        Box::pin(async move {
            if pool != self.pool {
                return Err(ProviderError::UnknownPool(pool.to_string()));
            }
            let mut model = self.model.lock().await;
            if model.fail_next_describe {
                model.fail_next_describe = false;
                return Err(ProviderError::Unreachable(
                    "injected describe fault".to_string(),
                ));
            }
            Ok(ScalingConfig {
                desired: model.desired,
                min: model.min,
                max: model.max,
                instance_types: model.instance_types.clone(),
            })
        })
    }

    fn update_desired_size<'a>(
        &'a self,
        pool: &'a str,
        desired: u32,
    ) -> ProviderFuture<'a, ScalingUpdate> {
        Box::pin(async move {
            if pool != self.pool {
                return Err(ProviderError::UnknownPool(pool.to_string()));
            }
            let mut model = self.model.lock().await;
            if model.fail_next_update {
                model.fail_next_update = false;
                return Err(ProviderError::Unreachable(
                    "injected update fault".to_string(),
                ));
            }
            if desired < model.min || desired > model.max {
                return Err(ProviderError::Invalid(format!(
                    "desired size {desired} outside [{}, {}]",
                    model.min, model.max
                )));
            }

            model.desired = desired;
            model.update_seq += 1;
            let update = ScalingUpdate {
                id: format!("upd-{:04x}", model.update_seq),
                status: UpdateStatus::InProgress,
            };
            model.updates.insert(update.id.clone(), update.clone());
            debug!(%pool, desired, update_id = %update.id, "simulated scaling update issued");
            Ok(update)
        })
    }

    fn describe_update<'a>(
        &'a self,
        pool: &'a str,
        update_id: &'a str,
    ) -> ProviderFuture<'a, ScalingUpdate> {
        Box::pin(async move {
            if pool != self.pool {
                return Err(ProviderError::UnknownPool(pool.to_string()));
            }
            let mut model = self.model.lock().await;
            let status = if model.ready == model.desired {
                UpdateStatus::Successful
            } else {
                UpdateStatus::InProgress
            };
            let Some(update) = model.updates.get_mut(update_id) else {
                return Err(ProviderError::UnknownUpdate(update_id.to_string()));
            };
            update.status = status;
            Ok(update.clone())
        })
    }
}

impl ReadinessProbe for SimulatedCluster {
    fn ready_count<'a>(&'a self, pool: &'a str) -> ProbeFuture<'a, u32> {
        Box::pin(async move {
            if pool != self.pool {
                return Err(ProbeError::UnknownPool(pool.to_string()));
            }
            let mut model = self.model.lock().await;
            if model.fail_next_probe {
                model.fail_next_probe = false;
                return Err(ProbeError::Unreachable(
                    "injected probe fault".to_string(),
                ));
            }

            // One observation advances the model one tick.
            if model.converge_step > 0 {
                if model.ready < model.desired {
                    model.ready = model
                        .ready
                        .saturating_add(model.converge_step)
                        .min(model.desired);
                } else if model.ready > model.desired {
                    model.ready = model
                        .ready
                        .saturating_sub(model.converge_step)
                        .max(model.desired);
                }
            }
            Ok(model.ready)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn describe_reports_initial_config() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);
        let config = sim.describe_scaling_config("pool-a").await.unwrap();

        assert_eq!(config.desired, 3);
        assert_eq!(config.min, 1);
        assert_eq!(config.max, 10);
        assert_eq!(config.instance_types, vec!["m5.xlarge"]);
    }

    #[tokio::test]
    async fn unknown_pool_is_rejected_everywhere() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);

        assert!(matches!(
            sim.describe_scaling_config("other").await,
            Err(ProviderError::UnknownPool(_))
        ));
        assert!(matches!(
            sim.update_desired_size("other", 5).await,
            Err(ProviderError::UnknownPool(_))
        ));
        assert!(matches!(
            sim.ready_count("other").await,
            Err(ProbeError::UnknownPool(_))
        ));
    }

    #[tokio::test]
    async fn converges_upward_one_step_per_query() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);
        sim.update_desired_size("pool-a", 6).await.unwrap();

        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 4);
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 5);
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 6);
        // Settled.
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn converges_downward_when_prewarming_smaller() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 8).with_converge_step(2);
        sim.update_desired_size("pool-a", 5).await.unwrap();

        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 6);
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 5);
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn oversized_step_clamps_to_desired() {
        // Step and sizes near u32::MAX must clamp, not wrap.
        let sim = SimulatedCluster::new("pool-a", 1, u32::MAX, u32::MAX - 2)
            .with_converge_step(u32::MAX);
        sim.update_desired_size("pool-a", u32::MAX).await.unwrap();

        assert_eq!(sim.ready_count("pool-a").await.unwrap(), u32::MAX);
        // Settled.
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), u32::MAX);
    }

    #[tokio::test]
    async fn zero_step_freezes_the_pool() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3).with_converge_step(0);
        sim.update_desired_size("pool-a", 7).await.unwrap();

        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 3);
        assert_eq!(sim.ready_count("pool-a").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn update_outside_bounds_is_invalid() {
        let sim = SimulatedCluster::new("pool-a", 2, 10, 3);

        assert!(matches!(
            sim.update_desired_size("pool-a", 11).await,
            Err(ProviderError::Invalid(_))
        ));
        assert!(matches!(
            sim.update_desired_size("pool-a", 1).await,
            Err(ProviderError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn update_status_tracks_convergence() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);
        let update = sim.update_desired_size("pool-a", 5).await.unwrap();
        assert_eq!(update.status, UpdateStatus::InProgress);

        // Not converged yet.
        sim.ready_count("pool-a").await.unwrap();
        let described = sim.describe_update("pool-a", &update.id).await.unwrap();
        assert_eq!(described.status, UpdateStatus::InProgress);

        // Converge, then the update reads Successful.
        sim.ready_count("pool-a").await.unwrap();
        let described = sim.describe_update("pool-a", &update.id).await.unwrap();
        assert_eq!(described.status, UpdateStatus::Successful);
    }

    #[tokio::test]
    async fn describe_unknown_update_fails() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);
        assert!(matches!(
            sim.describe_update("pool-a", "upd-ffff").await,
            Err(ProviderError::UnknownUpdate(_))
        ));
    }

    #[tokio::test]
    async fn fault_injection_is_single_shot() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);

        sim.fail_next_probe().await;
        assert!(sim.ready_count("pool-a").await.is_err());
        assert!(sim.ready_count("pool-a").await.is_ok());

        sim.fail_next_describe().await;
        assert!(sim.describe_scaling_config("pool-a").await.is_err());
        assert!(sim.describe_scaling_config("pool-a").await.is_ok());

        sim.fail_next_update().await;
        assert!(sim.update_desired_size("pool-a", 5).await.is_err());
        assert!(sim.update_desired_size("pool-a", 5).await.is_ok());
    }

    #[tokio::test]
    async fn set_ready_overrides_convergence() {
        let sim = SimulatedCluster::new("pool-a", 1, 10, 3);
        sim.set_ready(9).await;
        assert_eq!(sim.current_ready().await, 9);
    }
}
