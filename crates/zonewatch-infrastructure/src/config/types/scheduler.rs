//! Scheduler configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::SHUTDOWN_TIMEOUT_SECS;

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start zone triggers; manual runs still work when false
    pub enabled: bool,
    /// Grace period for in-flight work on shutdown
    pub shutdown_timeout_secs: u64,
}

/// Returns default scheduler configuration with:
/// - triggers enabled
/// - 30s shutdown grace period
impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            shutdown_timeout_secs: SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl SchedulerConfig {
    /// Shutdown grace period
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
