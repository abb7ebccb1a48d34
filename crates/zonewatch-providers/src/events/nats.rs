//! NATS Bus Connector
//!
//! Each `connect` opens a fresh client. Loss is detected by polling the
//! client's connection state; the publisher lifecycle manager decides when
//! to reconnect.

use std::sync::Arc;
use std::time::Duration;

use async_nats::Client;
use async_trait::async_trait;
use tracing::{debug, info};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::{BusConnection, BusConnector};

use crate::constants::NATS_STATE_POLL_INTERVAL_MS;

/// Opens NATS connections
#[derive(Debug, Clone)]
pub struct NatsBusConnector {
    url: String,
    client_name: Option<String>,
    connection_timeout: Duration,
}

impl NatsBusConnector {
    /// Create a connector
    ///
    /// # Arguments
    ///
    /// * `url` - NATS server URL (e.g., "nats://localhost:4222")
    /// * `client_name` - Optional client name for server-side identification
    /// * `connection_timeout` - Upper bound on a single connect attempt
    pub fn new<S: Into<String>>(url: S, client_name: Option<String>, connection_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client_name,
            connection_timeout,
        }
    }
}

#[async_trait]
impl BusConnector for NatsBusConnector {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>> {
        info!("Connecting to NATS server at {}", self.url);

        let mut options = async_nats::ConnectOptions::new().connection_timeout(self.connection_timeout);
        if let Some(name) = &self.client_name {
            options = options.name(name);
        }

        let client = options.connect(self.url.as_str()).await.map_err(|e| {
            Error::bus_connection_with_source(
                format!("Failed to connect to NATS server at {}", self.url),
                e,
            )
        })?;

        info!("Connected to NATS server at {}", self.url);
        Ok(Arc::new(NatsBusConnection { client }))
    }

    fn connector_name(&self) -> &str {
        "nats"
    }
}

/// A live NATS client
pub struct NatsBusConnection {
    client: Client,
}

impl std::fmt::Debug for NatsBusConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBusConnection")
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// `zonewatch/zone/kitchen/state` becomes `zonewatch.zone.kitchen.state`
pub fn topic_to_subject(topic: &str) -> String {
    topic.trim_matches('/').replace('/', ".")
}

#[async_trait]
impl BusConnection for NatsBusConnection {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        let subject = topic_to_subject(topic);
        self.client
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| Error::bus_connection_with_source("Failed to publish to NATS", e))?;
        self.client
            .flush()
            .await
            .map_err(|e| Error::bus_connection_with_source("Failed to flush NATS client", e))?;

        debug!("Published to NATS subject '{}'", subject);
        Ok(())
    }

    async fn closed(&self) {
        let interval = Duration::from_millis(NATS_STATE_POLL_INTERVAL_MS);
        while self.is_connected() {
            tokio::time::sleep(interval).await;
        }
    }

    fn is_connected(&self) -> bool {
        self.client.connection_state() == async_nats::connection::State::Connected
    }
}
