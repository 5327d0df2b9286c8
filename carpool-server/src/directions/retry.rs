//! Bounded retry for route optimization.

use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::{OptimizedRoute, Place, Waypoint};

use super::RouteOptimizer;
use super::error::RouteError;

/// How often and how patiently to retry service failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first (at least 1).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each time after.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay before attempt number `attempt` (1-based; attempt 1 has none).
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.initial_backoff
            .saturating_mul(1u32 << (attempt - 2).min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(250))
    }
}

/// Optimize a route, retrying `ServiceFailure` up to the policy's limit.
///
/// `Unreachable` is returned at once: asking again will not build a road.
pub async fn optimize_with_retry<O: RouteOptimizer + Sync>(
    optimizer: &O,
    origin: &Place,
    destination: &Place,
    waypoints: &[Waypoint],
    policy: &RetryPolicy,
) -> Result<OptimizedRoute, RouteError> {
    let mut attempt = 1;
    loop {
        match optimizer.optimize_route(origin, destination, waypoints).await {
            Ok(route) => {
                if attempt > 1 {
                    debug!(attempt, "Route optimization succeeded after retry");
                }
                return Ok(route);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                attempt += 1;
                let delay = policy.backoff_before(attempt);
                warn!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Route optimization failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
