//! Planner configuration.

use std::time::Duration;

use crate::directions::RetryPolicy;
use crate::domain::AnchorMode;
use crate::matcher::DEFAULT_TOLERANCE;

/// Configuration parameters for ride planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Per-axis matching tolerance in degrees.
    pub tolerance: f64,

    /// Retry policy for directions service failures.
    pub retry: RetryPolicy,

    /// Anchor mode when a request does not specify one.
    pub default_mode: AnchorMode,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(tolerance: f64, retry: RetryPolicy, default_mode: AnchorMode) -> Self {
        Self {
            tolerance,
            retry,
            default_mode,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            retry: RetryPolicy::new(3, Duration::from_millis(250)),
            default_mode: AnchorMode::Departure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.tolerance, 0.0005);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.default_mode, AnchorMode::Departure);
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(0.01, RetryPolicy::none(), AnchorMode::Arrival)
            .with_tolerance(0.02);

        assert_eq!(config.tolerance, 0.02);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.default_mode, AnchorMode::Arrival);
    }
}
