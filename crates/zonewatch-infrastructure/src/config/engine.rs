//! Merge engine
//!
//! Owns the current [`MergedConfig`] snapshot. Readers get an `Arc` that
//! stays valid for as long as they hold it; writers build a new snapshot
//! and swap it in atomically. Until a base configuration is installed the
//! engine refuses to merge anything.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use tracing::{debug, info};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::value_objects::ValidationWarning;

use super::bridge::{self, MergedConfig};

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Snapshot now installed
    pub config: Arc<MergedConfig>,
    /// Problems found in the option data
    pub warnings: Vec<ValidationWarning>,
}

/// Holder of the live configuration snapshot
pub struct MergeEngine {
    current: ArcSwapOption<MergedConfig>,
    // Serializes writers so concurrent applies cannot lose each other's overlay
    write_lock: Mutex<()>,
}

impl MergeEngine {
    /// Engine with no base configuration
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            write_lock: Mutex::new(()),
        }
    }

    /// Engine already initialized with `base`
    pub fn with_base(base: MergedConfig) -> Self {
        let engine = Self::new();
        engine.current.store(Some(Arc::new(base)));
        engine
    }

    /// Install the base configuration built from defaults plus `raw`
    pub fn initialize(&self, raw: &serde_json::Value) -> Result<ApplyOutcome> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (config, warnings) = bridge::from_raw(raw)?;
        let config = Arc::new(config);
        self.current.store(Some(Arc::clone(&config)));
        info!(
            providers = config.providers().len(),
            zones = config.zones().len(),
            warnings = warnings.len(),
            "Merge engine initialized"
        );
        Ok(ApplyOutcome { config, warnings })
    }

    /// Whether a base configuration is installed
    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Result<Arc<MergedConfig>> {
        self.current.load_full().ok_or(Error::MergeNotReady)
    }

    /// Merge `raw` over the current snapshot and install the result.
    ///
    /// Fails with `MergeNotReady` before reading `raw` when uninitialized.
    pub fn apply(&self, raw: &serde_json::Value) -> Result<ApplyOutcome> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let base = self.snapshot()?;
        let (merged, warnings) = bridge::apply(&base, raw)?;
        let config = Arc::new(merged);
        self.current.store(Some(Arc::clone(&config)));
        debug!(
            providers = config.providers().len(),
            zones = config.zones().len(),
            warnings = warnings.len(),
            "Option data merged"
        );
        Ok(ApplyOutcome { config, warnings })
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEngine")
            .field("ready", &self.is_ready())
            .finish()
    }
}
