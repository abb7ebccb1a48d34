//! Configuration file watcher
//!
//! Reloads [`AppConfig`] when the file changes and hands it to a
//! [`ReloadTarget`]. A failed reload keeps the previous configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use zonewatch_domain::error::{Error, Result};

use super::loader::ConfigLoader;
use super::types::AppConfig;
use crate::constants::CONFIG_WATCH_DEBOUNCE_MS;

/// Receiver of reloaded configuration
#[async_trait]
pub trait ReloadTarget: Send + Sync {
    /// Apply a freshly loaded configuration
    async fn reload(&self, config: AppConfig) -> Result<()>;
}

/// Watches one configuration file
pub struct ConfigWatcher {
    loader: ConfigLoader,
    path: PathBuf,
    target: Arc<dyn ReloadTarget>,
}

impl ConfigWatcher {
    /// Watch `path`, reloading through `loader` into `target`
    pub fn new(loader: ConfigLoader, path: PathBuf, target: Arc<dyn ReloadTarget>) -> Self {
        Self {
            loader,
            path,
            target,
        }
    }

    /// Start watching until `cancel` fires.
    ///
    /// Returns the watch task handle; the notify watcher lives inside it.
    pub fn spawn(self, cancel: CancellationToken) -> Result<tokio::task::JoinHandle<()>> {
        let (tx, mut rx) = mpsc::channel(1);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let _ = tx.try_send(());
                    }
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::configuration_with_source("Failed to create watcher", e))?;

        let watched = if self.path.exists() {
            self.path.clone()
        } else {
            self.path
                .parent()
                .filter(|p| p.exists())
                .map(std::path::Path::to_path_buf)
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "Neither {} nor its directory exists",
                        self.path.display()
                    ))
                })?
        };
        watcher
            .watch(&watched, RecursiveMode::NonRecursive)
            .map_err(|e| Error::configuration_with_source("Failed to watch config file", e))?;

        info!("Watching configuration file: {}", self.path.display());

        Ok(tokio::spawn(async move {
            let _watcher = watcher;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    event = rx.recv() => {
                        if event.is_none() {
                            break;
                        }
                    }
                }
                // Editors write in bursts; wait for the file to settle
                tokio::time::sleep(Duration::from_millis(CONFIG_WATCH_DEBOUNCE_MS)).await;
                while rx.try_recv().is_ok() {}

                info!("Configuration change detected, reloading...");
                match self.loader.reload() {
                    Ok(config) => match self.target.reload(config).await {
                        Ok(()) => info!("Configuration reloaded successfully"),
                        Err(e) => error!(error = %e, "Reloaded configuration was rejected"),
                    },
                    Err(e) => error!(error = %e, "Failed to reload configuration"),
                }
            }
            info!("Configuration watcher stopped");
        }))
    }
}
