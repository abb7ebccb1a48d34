//! Domain Port Interfaces
//!
//! Boundary contracts implemented by `zonewatch-providers`. Infrastructure
//! only ever holds these as trait objects.
//!
//! | Port | Purpose |
//! |------|---------|
//! | [`InferenceProvider`] | Turn a captured frame into tasks |
//! | [`FrameSource`] | Capture a frame from a camera |
//! | [`BusConnector`] / [`BusConnection`] | Outbound message bus |

/// Message bus ports
pub mod bus;
/// Frame capture port
pub mod frames;
/// AI inference port
pub mod inference;

pub use bus::{BusConnection, BusConnector};
pub use frames::FrameSource;
pub use inference::InferenceProvider;
