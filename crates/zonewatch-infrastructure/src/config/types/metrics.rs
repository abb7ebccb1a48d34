//! Metrics configuration types

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::METRICS_RETENTION_SECS;

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// How long windowed samples are retained
    pub retention_secs: u64,
    /// Prometheus scrape endpoint; no exporter when unset
    pub prometheus_listen: Option<SocketAddr>,
}

/// Returns default metrics configuration with:
/// - 24h retention
/// - no Prometheus exporter
impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            retention_secs: METRICS_RETENTION_SECS,
            prometheus_listen: None,
        }
    }
}

impl MetricsConfig {
    /// Retention as a duration
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}
