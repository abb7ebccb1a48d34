//! Usage metrics
//!
//! [`MetricsAggregator`] answers windowed queries in-process; every sample
//! is also forwarded to the `metrics` facade, which a Prometheus exporter
//! can scrape when configured.

pub mod aggregator;

pub use aggregator::MetricsAggregator;

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use zonewatch_domain::error::{Error, Result};

use crate::config::MetricsConfig;
use crate::constants::METRICS_BUCKET_SECS;

/// Install the Prometheus exporter if a listen address is configured.
///
/// Must be called from within a Tokio runtime.
pub fn install_prometheus_exporter(config: &MetricsConfig) -> Result<bool> {
    let Some(addr) = config.prometheus_listen else {
        return Ok(false);
    };
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| Error::configuration_with_source("Failed to install Prometheus exporter", e))?;
    info!(%addr, "Prometheus exporter listening");
    Ok(true)
}

/// Prune expired series once per bucket until `cancel` fires
pub fn spawn_pruner(
    metrics: Arc<MetricsAggregator>,
    tracker: &TaskTracker,
    cancel: CancellationToken,
) {
    tracker.spawn(async move {
        let mut ticks = tokio::time::interval(Duration::from_secs(METRICS_BUCKET_SECS));
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticks.tick() => metrics.prune(),
            }
        }
        debug!("Metrics pruner stopped");
    });
}
