//! Tokio Broadcast Bus Connector
//!
//! In-process bus for single-instance deployments and tests. All
//! connections opened from one connector share the same channel, so
//! subscribers see messages published through any of them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Notify, broadcast};
use tracing::debug;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::events::OutboundMessage;
use zonewatch_domain::ports::{BusConnection, BusConnector};

use crate::constants::TOKIO_BUS_CAPACITY;

/// Connector over a tokio broadcast channel
#[derive(Clone)]
pub struct TokioBusConnector {
    sender: broadcast::Sender<OutboundMessage>,
    capacity: usize,
}

impl TokioBusConnector {
    /// Create a connector with default capacity (1024)
    pub fn new() -> Self {
        Self::with_capacity(TOKIO_BUS_CAPACITY)
    }

    /// Create with custom capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Receive every message published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    /// Get the current number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TokioBusConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokioBusConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioBusConnector")
            .field("capacity", &self.capacity)
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl BusConnector for TokioBusConnector {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>> {
        Ok(Arc::new(TokioBusConnection::from_connector(self)))
    }

    fn connector_name(&self) -> &str {
        "tokio"
    }
}

/// One handle on the shared channel
pub struct TokioBusConnection {
    sender: broadcast::Sender<OutboundMessage>,
    connected: AtomicBool,
    lost: Notify,
}

impl TokioBusConnection {
    /// Open a connection on `connector`'s channel
    pub fn from_connector(connector: &TokioBusConnector) -> Self {
        Self {
            sender: connector.sender.clone(),
            connected: AtomicBool::new(true),
            lost: Notify::new(),
        }
    }

    /// Mark the connection as lost
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.lost.notify_waiters();
    }
}

#[async_trait]
impl BusConnection for TokioBusConnection {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::bus_connection("tokio bus connection closed"));
        }
        let message = OutboundMessage {
            topic: topic.to_string(),
            payload,
        };
        match self.sender.send(message) {
            Ok(count) => debug!("Published to {} subscribers", count),
            Err(_) => debug!("Published but no subscribers"),
        }
        Ok(())
    }

    async fn closed(&self) {
        let notified = self.lost.notified();
        if !self.is_connected() {
            return;
        }
        notified.await;
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
