//! Message Bus Ports
//!
//! The bus is write-only from this service's point of view. A
//! [`BusConnector`] produces fresh connections; the publisher lifecycle
//! manager owns at most one [`BusConnection`] at a time and replaces it
//! after a disconnect.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `BusConnector::connect` | Open a new connection |
//! | `BusConnection::publish` | Publish raw bytes to a topic |
//! | `BusConnection::closed` | Resolves once the connection is lost |
//! | `BusConnection::is_connected` | Point-in-time connection check |

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Factory for bus connections
#[async_trait]
pub trait BusConnector: Send + Sync {
    /// Open a new connection
    async fn connect(&self) -> Result<Arc<dyn BusConnection>>;

    /// Connector name for logging
    fn connector_name(&self) -> &str;
}

/// One live bus connection
#[async_trait]
pub trait BusConnection: Send + Sync {
    /// Publish `payload` to `topic`
    ///
    /// A `BusConnection` error means the connection is unusable.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;

    /// Resolve once the connection has been lost.
    ///
    /// Connections that cannot detect loss on their own never resolve and
    /// rely on `publish` errors instead.
    async fn closed(&self) {
        std::future::pending::<()>().await;
    }

    /// Whether the connection currently looks healthy
    fn is_connected(&self) -> bool;
}
