//! Control plane
//!
//! The operations exposed to whatever drives the service: the CLI today,
//! an embedding application or a remote handler tomorrow. Errors carry an
//! HTTP-style status through [`Error::status_code`](zonewatch_domain::error::Error::status_code).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;
use zonewatch_domain::error::Result;
use zonewatch_domain::value_objects::{
    AnalysisResult, MetricsSnapshot, ProviderStatus, ValidationWarning,
};

use crate::config::watcher::ReloadTarget;
use crate::config::AppConfig;
use crate::context::ServiceContext;
use crate::scheduler::ZoneScheduler;

/// Operator-facing operations
pub struct ControlPlane {
    context: Arc<ServiceContext>,
    scheduler: Arc<ZoneScheduler>,
    // Held from install to activation so components follow the engine's order
    activation: Mutex<()>,
}

impl ControlPlane {
    /// Control plane over a running service
    pub fn new(context: Arc<ServiceContext>, scheduler: Arc<ZoneScheduler>) -> Self {
        Self {
            context,
            scheduler,
            activation: Mutex::new(()),
        }
    }

    /// Merge `raw` option data over the live configuration.
    ///
    /// Fails with `MergeNotReady` (503) before touching anything when no
    /// base configuration is installed, and with `ConfigValidation` (400)
    /// when `raw` is not a map. Entry-level problems come back as warnings.
    pub fn apply_config(&self, raw: &serde_json::Value) -> Result<Vec<ValidationWarning>> {
        let _activation = self.activation.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = self.context.engine().apply(raw)?;
        self.activate()?;
        Ok(outcome.warnings)
    }

    /// Replace the base configuration with `raw`, dropping earlier overlays
    pub fn replace_config(&self, raw: &serde_json::Value) -> Result<Vec<ValidationWarning>> {
        let _activation = self.activation.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = self.context.engine().initialize(raw)?;
        self.activate()?;
        Ok(outcome.warnings)
    }

    /// Reconcile components with the engine's current snapshot.
    ///
    /// Callers hold `activation`.
    fn activate(&self) -> Result<()> {
        let config = self.context.engine().snapshot()?;
        self.context.dispatcher().reconcile(config.providers());
        self.scheduler.reconcile(config.zones());
        self.context.announce_zones(config.zones());
        info!(
            providers = config.providers().len(),
            zones = config.zones().len(),
            "Configuration activated"
        );
        Ok(())
    }

    /// Breaker and preference state of every configured provider.
    ///
    /// Empty until a base configuration is installed.
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.context
            .config()
            .map(|config| self.context.dispatcher().provider_status(config.providers()))
            .unwrap_or_default()
    }

    /// Try `name` first from now on.
    ///
    /// `ProviderSwitch` (409) for unknown, disabled or open-circuit providers,
    /// `Authentication` (401) when its credential does not resolve.
    pub fn switch_provider(&self, name: &str) -> Result<()> {
        let config = self.context.config()?;
        self.context
            .dispatcher()
            .switch_provider(config.providers(), name)
    }

    /// Analyze `zone` now and return the result
    pub async fn run_zone_analysis(&self, zone: &str) -> Result<AnalysisResult> {
        self.scheduler.run_zone_analysis(zone).await
    }

    /// Usage over the trailing `window`
    pub fn metrics(&self, window: Duration) -> MetricsSnapshot {
        self.context.metrics().snapshot(window)
    }

    /// Usage since start
    pub fn lifetime_metrics(&self) -> MetricsSnapshot {
        self.context.metrics().lifetime()
    }

    /// Skipped triggers per zone
    pub fn skipped_triggers(&self) -> BTreeMap<String, u64> {
        self.context.in_flight().skipped_counts()
    }
}

#[async_trait]
impl ReloadTarget for ControlPlane {
    async fn reload(&self, config: AppConfig) -> Result<()> {
        let warnings = self.replace_config(&config.options)?;
        info!(warnings = warnings.len(), "Option data reloaded from file");
        Ok(())
    }
}
