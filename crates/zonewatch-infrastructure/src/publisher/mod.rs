//! Outbound publishing
//!
//! Zone runners enqueue [`OutboundMessage`](zonewatch_domain::events::OutboundMessage)s;
//! the [`PublisherManager`] moves them onto the message bus and survives
//! disconnects.

pub mod backoff;
pub mod lifecycle;

pub use backoff::Backoff;
pub use lifecycle::{DiscoverySource, PublisherExit, PublisherManager, PublisherSettings};
