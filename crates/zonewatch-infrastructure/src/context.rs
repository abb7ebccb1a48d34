//! Service context
//!
//! Everything a zone cycle needs, constructed once at startup and passed
//! explicitly. No part of the service reaches for global state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use zonewatch_domain::error::Result;
use zonewatch_domain::events::{
    BusTopics, OutboundMessage, ServiceStatusPayload, ZoneDiscoveryPayload,
};
use zonewatch_domain::ports::FrameSource;
use zonewatch_domain::value_objects::ZoneConfig;

use crate::config::{MergeEngine, MergedConfig};
use crate::metrics::MetricsAggregator;
use crate::publisher::DiscoverySource;
use crate::routing::ProviderDispatcher;
use crate::scheduler::InFlightRegistry;

/// Shared service components
pub struct ServiceContext {
    engine: Arc<MergeEngine>,
    dispatcher: Arc<ProviderDispatcher>,
    metrics: Arc<MetricsAggregator>,
    frames: Arc<dyn FrameSource>,
    outbound: mpsc::Sender<OutboundMessage>,
    in_flight: Arc<InFlightRegistry>,
    topics: BusTopics,
}

impl ServiceContext {
    /// Bundle the service components
    pub fn new(
        engine: Arc<MergeEngine>,
        dispatcher: Arc<ProviderDispatcher>,
        metrics: Arc<MetricsAggregator>,
        frames: Arc<dyn FrameSource>,
        outbound: mpsc::Sender<OutboundMessage>,
        topics: BusTopics,
    ) -> Self {
        Self {
            engine,
            dispatcher,
            metrics,
            frames,
            outbound,
            in_flight: Arc::new(InFlightRegistry::new()),
            topics,
        }
    }

    /// Merge engine holding the live configuration
    pub fn engine(&self) -> &Arc<MergeEngine> {
        &self.engine
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Result<Arc<MergedConfig>> {
        self.engine.snapshot()
    }

    /// Provider dispatcher
    pub fn dispatcher(&self) -> &Arc<ProviderDispatcher> {
        &self.dispatcher
    }

    /// Usage metrics
    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    /// Camera frame source
    pub fn frames(&self) -> &Arc<dyn FrameSource> {
        &self.frames
    }

    /// Per-zone single-flight registry
    pub fn in_flight(&self) -> &Arc<InFlightRegistry> {
        &self.in_flight
    }

    /// Topic scheme
    pub fn topics(&self) -> &BusTopics {
        &self.topics
    }

    /// Queue a message for the publisher without waiting.
    ///
    /// Returns false when the queue is full or the publisher is gone.
    pub fn enqueue(&self, message: OutboundMessage) -> bool {
        match self.outbound.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                warn!(topic = %message.topic, "Outbound queue full, message dropped");
                false
            }
            Err(TrySendError::Closed(message)) => {
                debug!(topic = %message.topic, "Publisher stopped, message dropped");
                false
            }
        }
    }

    /// Queue discovery messages for `zones`
    pub fn announce_zones(&self, zones: &[ZoneConfig]) {
        for zone in zones {
            match OutboundMessage::json(
                self.topics.zone_discovery(&zone.name),
                &ZoneDiscoveryPayload::from_zone(zone, &self.topics),
            ) {
                Ok(message) => {
                    self.enqueue(message);
                }
                Err(e) => warn!(zone = %zone.name, error = %e, "Discovery payload not serialized"),
            }
        }
    }
}

impl DiscoverySource for ServiceContext {
    fn discovery_messages(&self) -> Vec<OutboundMessage> {
        let zones: Vec<ZoneConfig> = self
            .engine
            .snapshot()
            .map(|config| config.zones().to_vec())
            .unwrap_or_default();

        let status = OutboundMessage::json(
            self.topics.status(),
            &ServiceStatusPayload::online(zones.len()),
        );
        let discovery = zones.iter().map(|zone| {
            OutboundMessage::json(
                self.topics.zone_discovery(&zone.name),
                &ZoneDiscoveryPayload::from_zone(zone, &self.topics),
            )
        });

        std::iter::once(status)
            .chain(discovery)
            .filter_map(|message| {
                message
                    .map_err(|e| warn!(error = %e, "Registration payload not serialized"))
                    .ok()
            })
            .collect()
    }
}
