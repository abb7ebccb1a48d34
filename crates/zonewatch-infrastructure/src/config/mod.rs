//! Configuration
//!
//! Two layers:
//!
//! - **Service configuration** ([`AppConfig`]): logging, breaker tuning, bus,
//!   frames, metrics. Loaded by [`ConfigLoader`] through Figment.
//! - **Option data** (`AppConfig::options` and runtime `apply_config` calls):
//!   providers and zones. Converted to a [`ConfigNode`] tree, deep-merged,
//!   validated by the [`bridge`] and published as an immutable
//!   [`MergedConfig`] snapshot by the [`MergeEngine`].

pub mod bridge;
pub mod engine;
pub mod loader;
pub mod tree;
pub mod types;
pub mod watcher;

pub use bridge::MergedConfig;
pub use engine::{ApplyOutcome, MergeEngine};
pub use loader::ConfigLoader;
pub use tree::{ConfigNode, ScalarValue, deep_merge};
pub use types::{
    AppConfig, EventBusConfig, EventBusKind, FrameSourceConfig, FrameSourceKind, LoggingConfig,
    MetricsConfig, ResilienceConfig, SchedulerConfig,
};
pub use watcher::{ConfigWatcher, ReloadTarget};
