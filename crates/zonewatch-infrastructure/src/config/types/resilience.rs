//! Resilience configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CIRCUIT_BREAKER_BASE_COOLDOWN_SECS, CIRCUIT_BREAKER_FAILURE_THRESHOLD,
    CIRCUIT_BREAKER_MAX_COOLDOWN_SECS, CIRCUIT_BREAKER_TRACKING_WINDOW_SECS,
};

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Consecutive failures that open a circuit
    pub failure_threshold: u32,
    /// Failures older than this are forgotten before counting a new one
    pub tracking_window_secs: u64,
    /// Cooldown after the first opening
    pub base_cooldown_secs: u64,
    /// Upper bound for the doubled cooldown
    pub max_cooldown_secs: u64,
}

/// Returns default resilience configuration with:
/// - 3 consecutive failures to open
/// - 10 minute tracking window
/// - 30s base cooldown doubling up to 10 minutes
impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            tracking_window_secs: CIRCUIT_BREAKER_TRACKING_WINDOW_SECS,
            base_cooldown_secs: CIRCUIT_BREAKER_BASE_COOLDOWN_SECS,
            max_cooldown_secs: CIRCUIT_BREAKER_MAX_COOLDOWN_SECS,
        }
    }
}

impl ResilienceConfig {
    /// Tracking window as a duration
    pub fn tracking_window(&self) -> Duration {
        Duration::from_secs(self.tracking_window_secs)
    }

    /// Base cooldown as a duration
    pub fn base_cooldown(&self) -> Duration {
        Duration::from_secs(self.base_cooldown_secs)
    }

    /// Maximum cooldown as a duration
    pub fn max_cooldown(&self) -> Duration {
        Duration::from_secs(self.max_cooldown_secs)
    }
}
