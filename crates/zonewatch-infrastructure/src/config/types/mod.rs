//! Static service configuration types
//!
//! These are loaded once by [`ConfigLoader`](crate::config::ConfigLoader)
//! and only change through a file reload. Zone and provider topology lives
//! in the `options` tree and goes through the merge engine instead.

mod app;
mod event_bus;
mod frames;
mod logging;
mod metrics;
mod resilience;
mod scheduler;

pub use app::AppConfig;
pub use event_bus::{EventBusConfig, EventBusKind};
pub use frames::{FrameSourceConfig, FrameSourceKind};
pub use logging::LoggingConfig;
pub use metrics::MetricsConfig;
pub use resilience::ResilienceConfig;
pub use scheduler::SchedulerConfig;
