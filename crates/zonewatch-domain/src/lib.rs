//! # zonewatch - Domain Layer
//!
//! Core types and port contracts shared by every other layer. Nothing in
//! this crate performs I/O; infrastructure and providers implement the
//! ports declared here.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | Error taxonomy, HTTP status mapping and classification |
//! | [`value_objects`] | Zones, providers, analysis requests/results, metrics |
//! | [`ports`] | `InferenceProvider`, `FrameSource`, `BusConnector` |
//! | [`events`] | Payloads published on the message bus |
//! | [`constants`] | Domain defaults |

/// Domain constants
pub mod constants;
/// Error handling types
pub mod error;
/// Message bus payloads and topic naming
pub mod events;
/// Port interfaces implemented by the provider layer
pub mod ports;
/// Immutable domain value objects
pub mod value_objects;

pub use error::{Error, ErrorKind, Result};
