//! # zonewatch
//!
//! Scheduled analysis of camera zones by vision-capable inference
//! providers, with priority failover through per-provider circuit
//! breakers and results published on a message bus.
//!
//! This crate is the public facade. It re-exports the layers and hosts the
//! command line front end.
//!
//! ## Example
//!
//! ```ignore
//! use zonewatch::infrastructure::config::ConfigLoader;
//! use zonewatch::infrastructure::build_service;
//!
//! let loader = ConfigLoader::new().with_config_path("zonewatch.toml");
//! let service = build_service(loader.load()?, &loader, true).await?;
//! let result = service.control().run_zone_analysis("kitchen").await?;
//! service.shutdown().await;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - value objects, ports and the error taxonomy
//! - `providers` - inference, frame source and message bus adapters
//! - `infrastructure` - configuration, routing, scheduling, publishing

/// Command line front end
pub mod cli;

/// Domain layer - core types and port contracts
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use zonewatch_domain::*;
}

/// Provider layer - adapters behind the domain ports
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use zonewatch_providers::*;
}

/// Infrastructure layer - config, routing, scheduling and service assembly
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use zonewatch_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::{Error, ErrorKind, Result};

// Re-export the service entry points
pub use infrastructure::{ControlPlane, Service, build_service};
