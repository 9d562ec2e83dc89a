//! Orchestrator tuning knobs.

use std::time::Duration;

use poolwarm_state::PoolName;

/// Timing and targeting parameters for the prewarm pipeline.
///
/// Built once at startup and shared by the service facade and the
/// reconciliation worker. There is no global configuration; every
/// component receives its own clone.
#[derive(Debug, Clone)]
pub struct PrewarmConfig {
    /// The node pool every request targets.
    pub pool: PoolName,
    /// Pause between issuing the scale mutation and the first readiness
    /// poll, giving the backend time to start acting.
    pub settle_delay: Duration,
    /// Pause between readiness polls.
    pub poll_interval: Duration,
    /// Upper bound on the whole polling phase. A request still short of
    /// its desired size when this expires is failed.
    pub max_poll: Duration,
}

impl Default for PrewarmConfig {
    fn default() -> Self {
        Self {
            pool: "default-pool".to_string(),
            settle_delay: Duration::from_secs(30),
            poll_interval: Duration::from_secs(15),
            max_poll: Duration::from_secs(30 * 60),
        }
    }
}

impl PrewarmConfig {
    /// Config for `pool` with default timings.
    pub fn new(pool: impl Into<PoolName>) -> Self {
        Self {
            pool: pool.into(),
            ..Self::default()
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_poll(mut self, max: Duration) -> Self {
        self.max_poll = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_default_pool() {
        let config = PrewarmConfig::default();
        assert_eq!(config.pool, "default-pool");
        assert_eq!(config.settle_delay, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.max_poll, Duration::from_secs(1800));
    }

    #[test]
    fn builders_override_timings() {
        let config = PrewarmConfig::new("burst-pool")
            .with_settle_delay(Duration::from_secs(5))
            .with_poll_interval(Duration::from_secs(2))
            .with_max_poll(Duration::from_secs(60));
        assert_eq!(config.pool, "burst-pool");
        assert_eq!(config.settle_delay, Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_poll, Duration::from_secs(60));
    }
}
