//! Null Bus Connector

use std::sync::Arc;

use async_trait::async_trait;
use zonewatch_domain::error::Result;
use zonewatch_domain::ports::{BusConnection, BusConnector};

/// Connector whose connections discard every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBusConnector;

impl NullBusConnector {
    /// Create a null connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BusConnector for NullBusConnector {
    async fn connect(&self) -> Result<Arc<dyn BusConnection>> {
        Ok(Arc::new(NullBusConnection))
    }

    fn connector_name(&self) -> &str {
        "null"
    }
}

/// Connection that discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBusConnection;

#[async_trait]
impl BusConnection for NullBusConnection {
    async fn publish(&self, _topic: &str, _payload: Vec<u8>) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}
