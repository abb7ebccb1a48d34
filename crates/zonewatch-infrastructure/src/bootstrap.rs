//! Service assembly
//!
//! Builds every component from [`AppConfig`] and wires them into a
//! running [`Service`].

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::events::BusTopics;
use zonewatch_domain::ports::{BusConnector, FrameSource};
use zonewatch_domain::value_objects::CredentialRef;
use zonewatch_providers::events::{NullBusConnector, TokioBusConnector};
use zonewatch_providers::frames::{FileFrameSource, HttpSnapshotSource, NullFrameSource};

use crate::config::{
    AppConfig, ConfigLoader, ConfigWatcher, EventBusConfig, EventBusKind, FrameSourceConfig,
    FrameSourceKind, MergeEngine,
};
use crate::constants::PUBLISHER_QUEUE_CAPACITY;
use crate::context::ServiceContext;
use crate::control::ControlPlane;
use crate::metrics::{MetricsAggregator, install_prometheus_exporter, spawn_pruner};
use crate::publisher::{PublisherManager, PublisherSettings};
use crate::routing::{CircuitBreakerRegistry, DefaultProviderResolver, ProviderDispatcher};
use crate::scheduler::ZoneScheduler;
use crate::shutdown::{ShutdownCoordinator, join_task};

/// A running service
pub struct Service {
    context: Arc<ServiceContext>,
    control: Arc<ControlPlane>,
    scheduler: Arc<ZoneScheduler>,
    publisher: PublisherManager,
    shutdown: ShutdownCoordinator,
    watcher: Option<JoinHandle<()>>,
}

impl Service {
    /// Control plane
    pub fn control(&self) -> &Arc<ControlPlane> {
        &self.control
    }

    /// Shared components
    pub fn context(&self) -> &Arc<ServiceContext> {
        &self.context
    }

    /// Publisher handle
    pub fn publisher(&self) -> &PublisherManager {
        &self.publisher
    }

    /// Scheduler
    pub fn scheduler(&self) -> &Arc<ZoneScheduler> {
        &self.scheduler
    }

    /// Stop triggers, cancel and await running cycles, then flush and stop
    /// the publisher.
    pub async fn shutdown(self) -> bool {
        info!("Shutting down");
        self.scheduler.stop();
        let clean = self.shutdown.shutdown().await;
        self.publisher.shutdown(self.shutdown.grace()).await;
        if let Some(watcher) = self.watcher {
            // The watcher listens to the root token, already cancelled
            join_task("config watcher", watcher).await;
        }
        clean
    }
}

/// Assemble and start the service.
///
/// `loader` is used again by the file watcher when `watch` is set and the
/// loader resolves to a file.
pub async fn build_service(config: AppConfig, loader: &ConfigLoader, watch: bool) -> Result<Service> {
    install_prometheus_exporter(&config.metrics)?;

    let http_client = Client::builder()
        .build()
        .map_err(|e| Error::configuration_with_source("Failed to build HTTP client", e))?;

    let engine = Arc::new(MergeEngine::new());
    let initial = engine.initialize(&config.options)?;
    for warning in &initial.warnings {
        warn!(%warning, "Option data warning");
    }

    let breakers = Arc::new(CircuitBreakerRegistry::new(config.resilience.clone()));
    breakers.reconcile(initial.config.providers());
    let metrics = Arc::new(MetricsAggregator::new(config.metrics.retention()));
    let dispatcher = Arc::new(ProviderDispatcher::new(
        breakers,
        Arc::clone(&metrics),
        Arc::new(DefaultProviderResolver::new(http_client.clone())),
    ));

    let topics = BusTopics::new(config.event_bus.topic_prefix.clone());
    let (outbound, receiver) = mpsc::channel(PUBLISHER_QUEUE_CAPACITY);
    let context = Arc::new(ServiceContext::new(
        engine,
        dispatcher,
        metrics,
        create_frame_source(&config.frames, http_client)?,
        outbound,
        topics.clone(),
    ));

    let publisher = PublisherManager::start(
        receiver,
        create_bus_connector(&config.event_bus),
        Arc::clone(&context) as _,
        PublisherSettings {
            reconnect_base_delay: config.event_bus.reconnect_base_delay(),
            reconnect_max_delay: config.event_bus.reconnect_max_delay(),
            topics,
        },
    );

    let shutdown = ShutdownCoordinator::new(config.scheduler.shutdown_timeout());
    spawn_pruner(Arc::clone(context.metrics()), &shutdown.tracker(), shutdown.token());
    let scheduler = Arc::new(ZoneScheduler::new(
        Arc::clone(&context),
        shutdown.token(),
        shutdown.tracker(),
        config.scheduler.enabled,
    ));
    scheduler.reconcile(initial.config.zones());

    let control = Arc::new(ControlPlane::new(Arc::clone(&context), Arc::clone(&scheduler)));

    let watcher = match (watch, loader.resolved_path()) {
        (true, Some(path)) => Some(
            ConfigWatcher::new(loader.clone(), path, Arc::clone(&control) as _)
                .spawn(shutdown.token())?,
        ),
        _ => None,
    };

    info!(
        providers = initial.config.providers().len(),
        zones = initial.config.zones().len(),
        bus = ?config.event_bus.provider,
        "Service started"
    );

    Ok(Service {
        context,
        control,
        scheduler,
        publisher,
        shutdown,
        watcher,
    })
}

/// Frame source selected by configuration
pub fn create_frame_source(config: &FrameSourceConfig, client: Client) -> Result<Arc<dyn FrameSource>> {
    Ok(match config.source {
        FrameSourceKind::Http => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                Error::configuration("frames.base_url is required for the http frame source")
            })?;
            let token = config.token.as_deref().map(CredentialRef::parse);
            Arc::new(HttpSnapshotSource::new(base_url, token, client))
        }
        FrameSourceKind::File => {
            let directory: PathBuf = config.directory.clone().ok_or_else(|| {
                Error::configuration("frames.directory is required for the file frame source")
            })?;
            Arc::new(FileFrameSource::new(directory))
        }
        FrameSourceKind::Null => Arc::new(NullFrameSource::new()),
    })
}

/// Bus connector selected by configuration
pub fn create_bus_connector(config: &EventBusConfig) -> Arc<dyn BusConnector> {
    match config.provider {
        EventBusKind::Tokio => Arc::new(TokioBusConnector::new()),
        EventBusKind::Null => Arc::new(NullBusConnector::new()),
        #[cfg(feature = "events-nats")]
        EventBusKind::Nats => Arc::new(zonewatch_providers::events::NatsBusConnector::new(
            config.nats_url.clone(),
            config.nats_client_name.clone(),
            config.connection_timeout(),
        )),
        #[cfg(not(feature = "events-nats"))]
        EventBusKind::Nats => {
            warn!("NATS support not compiled in, publishing to the null bus");
            Arc::new(NullBusConnector::new())
        }
    }
}
