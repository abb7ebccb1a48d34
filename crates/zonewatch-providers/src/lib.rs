//! # zonewatch - Provider Implementations
//!
//! Implementations of the ports declared in `zonewatch-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Inference | `InferenceProvider` | OpenAI-compatible, Ollama, Null |
//! | Frames | `FrameSource` | HTTP snapshot, File, Null |
//! | Events | `BusConnector` | Nats, Tokio, Null |
//!
//! ## Feature Flags
//!
//! NATS support sits behind `events-nats` (enabled by default).

pub use zonewatch_domain::error::{Error, Result};
pub use zonewatch_domain::ports::{BusConnection, BusConnector, FrameSource, InferenceProvider};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// Inference provider implementations
///
/// Implements `InferenceProvider` for vision-capable model APIs.
pub mod inference;

/// Frame source implementations
///
/// Implements `FrameSource` for camera snapshot backends.
pub mod frames;

/// Message bus implementations
///
/// Implements `BusConnector`/`BusConnection` for outbound publishing.
pub mod events;
