//! Application configuration root

use serde::{Deserialize, Serialize};

use super::{
    EventBusConfig, FrameSourceConfig, LoggingConfig, MetricsConfig, ResilienceConfig,
    SchedulerConfig,
};

/// Root configuration loaded from defaults, file and environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging setup
    pub logging: LoggingConfig,
    /// Circuit breaker tuning
    pub resilience: ResilienceConfig,
    /// Outbound message bus
    pub event_bus: EventBusConfig,
    /// Scheduler and shutdown
    pub scheduler: SchedulerConfig,
    /// Camera frame capture
    pub frames: FrameSourceConfig,
    /// Metrics retention and export
    pub metrics: MetricsConfig,
    /// Raw option tree (`providers`, `zones`, `zone_defaults`)
    pub options: serde_json::Value,
}

/// Returns default application configuration with every section at its
/// own defaults and an empty option tree
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            resilience: ResilienceConfig::default(),
            event_bus: EventBusConfig::default(),
            scheduler: SchedulerConfig::default(),
            frames: FrameSourceConfig::default(),
            metrics: MetricsConfig::default(),
            options: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}
