//! Message Bus Implementations
//!
//! | Connector | Type | Description |
//! |-----------|------|-------------|
//! | [`NullBusConnector`] | Testing | Discards everything |
//! | [`TokioBusConnector`] | In-Process | Tokio broadcast channel |
//! | `NatsBusConnector` | Distributed | NATS subjects (`events-nats`) |
//!
//! Topics use `/` separators; the NATS connector maps them to `.`
//! separated subjects.

#[cfg(feature = "events-nats")]
pub mod nats;
pub mod null;
pub mod tokio;

#[cfg(feature = "events-nats")]
pub use nats::{NatsBusConnection, NatsBusConnector};
pub use null::{NullBusConnection, NullBusConnector};
pub use self::tokio::{TokioBusConnection, TokioBusConnector};
