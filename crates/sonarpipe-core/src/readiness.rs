use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, SonarError};
use crate::models::{ReadyOutcome, ServiceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl ReadinessPolicy {
    #[must_use]
    pub const fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_attempts: config.readiness.max_attempts,
            interval: config.readiness_interval(),
        }
    }
}

/// Polls `probe` until it reports [`ServiceStatus::Up`], sleeping a fixed
/// interval between attempts.
pub fn wait_until_ready<P>(probe: P, policy: ReadinessPolicy) -> Result<ReadyOutcome>
where
    P: FnMut() -> ServiceStatus,
{
    wait_until_ready_with(probe, policy, std::thread::sleep)
}

/// Same as [`wait_until_ready`] with an explicit sleeper. The sleeper runs
/// only between attempts, never after the last one.
pub fn wait_until_ready_with<P, S>(
    mut probe: P,
    policy: ReadinessPolicy,
    mut sleep: S,
) -> Result<ReadyOutcome>
where
    P: FnMut() -> ServiceStatus,
    S: FnMut(Duration),
{
    for attempt in 1..=policy.max_attempts {
        let status = probe();
        debug!(attempt, max_attempts = policy.max_attempts, %status, "readiness probe");
        if status.is_up() {
            info!(attempts = attempt, "service is up");
            return Ok(ReadyOutcome { attempts: attempt });
        }
        if attempt < policy.max_attempts {
            sleep(policy.interval);
        }
    }

    warn!(attempts = policy.max_attempts, "service never became ready");
    Err(SonarError::Timeout {
        attempts: policy.max_attempts,
    })
}
