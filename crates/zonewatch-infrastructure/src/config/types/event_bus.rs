//! EventBus configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use zonewatch_domain::constants::DEFAULT_TOPIC_PREFIX;

use crate::constants::{
    BUS_CONNECTION_TIMEOUT_MS, BUS_RECONNECT_BASE_DELAY_MS, BUS_RECONNECT_MAX_DELAY_MS,
    DEFAULT_NATS_CLIENT_NAME, DEFAULT_NATS_URL,
};

/// EventBus provider types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventBusKind {
    /// In-process broadcast channel (Tokio)
    Tokio,
    /// NATS server
    #[default]
    Nats,
    /// No-op bus
    Null,
}

/// EventBus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    /// Bus implementation
    pub provider: EventBusKind,
    /// NATS server URL
    pub nats_url: String,
    /// NATS client name
    pub nats_client_name: Option<String>,
    /// Prefix of every published topic
    pub topic_prefix: String,
    /// Connection attempt timeout in milliseconds
    pub connection_timeout_ms: u64,
    /// First reconnect delay in milliseconds
    pub reconnect_base_delay_ms: u64,
    /// Reconnect delay cap in milliseconds
    pub reconnect_max_delay_ms: u64,
}

/// Returns default event bus configuration with:
/// - NATS at `nats://localhost:4222`
/// - topics under `zonewatch/`
/// - 5s connect timeout, reconnect backoff from 500ms up to 30s
impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            provider: EventBusKind::default(),
            nats_url: DEFAULT_NATS_URL.to_string(),
            nats_client_name: Some(DEFAULT_NATS_CLIENT_NAME.to_string()),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            connection_timeout_ms: BUS_CONNECTION_TIMEOUT_MS,
            reconnect_base_delay_ms: BUS_RECONNECT_BASE_DELAY_MS,
            reconnect_max_delay_ms: BUS_RECONNECT_MAX_DELAY_MS,
        }
    }
}

impl EventBusConfig {
    /// Create config for the in-process bus
    pub fn tokio() -> Self {
        Self {
            provider: EventBusKind::Tokio,
            ..Default::default()
        }
    }

    /// Connection attempt timeout
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    /// First reconnect delay
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    /// Reconnect delay cap
    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }
}
