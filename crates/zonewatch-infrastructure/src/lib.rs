//! # zonewatch - Infrastructure Layer
//!
//! Everything between the domain types and a running process.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | Figment loader, option tree merge, file watcher |
//! | [`routing`] | Circuit breakers and provider failover |
//! | [`metrics`] | Windowed usage aggregation, Prometheus export |
//! | [`scheduler`] | Per-zone triggers with single-flight |
//! | [`publisher`] | Message bus publishing across reconnects |
//! | [`context`] | Shared components passed to every cycle |
//! | [`control`] | Operator-facing operations |
//! | [`bootstrap`] | Service assembly |
//! | [`shutdown`] | Cancellation and draining |
//! | [`logging`] | Tracing subscriber setup |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod context;
pub mod control;
pub mod error_ext;
pub mod logging;
pub mod metrics;
pub mod publisher;
pub mod routing;
pub mod scheduler;
pub mod shutdown;

pub use bootstrap::{Service, build_service};
pub use context::ServiceContext;
pub use control::ControlPlane;
pub use shutdown::ShutdownCoordinator;
