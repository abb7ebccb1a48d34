//! Publisher lifecycle
//!
//! A supervisor task owns the bus connection and at most one publishing
//! task. When the connection drops it cancels and awaits that task, takes
//! back the outbound queue, reconnects with backoff, re-announces the
//! service and its zones, and only then starts the replacement.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use zonewatch_domain::error::Result;
use zonewatch_domain::events::{BusTopics, OutboundMessage, ServiceStatusPayload};
use zonewatch_domain::ports::{BusConnection, BusConnector};

use super::backoff::Backoff;

/// Supplies the registration messages sent after every (re)connect
pub trait DiscoverySource: Send + Sync {
    /// Status and per-zone discovery messages, in publish order
    fn discovery_messages(&self) -> Vec<OutboundMessage>;
}

/// Reconnect tuning
#[derive(Debug, Clone)]
pub struct PublisherSettings {
    /// First reconnect delay
    pub reconnect_base_delay: Duration,
    /// Reconnect delay cap
    pub reconnect_max_delay: Duration,
    /// Topic scheme, for the offline announcement
    pub topics: BusTopics,
}

/// Why a publishing task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherExit {
    /// The connection reported itself closed or a publish failed
    Disconnected,
    /// Shutdown was requested
    Cancelled,
    /// Every sender was dropped
    QueueClosed,
}

struct TaskReturn {
    receiver: mpsc::Receiver<OutboundMessage>,
    pending: Option<OutboundMessage>,
    exit: PublisherExit,
}

struct ActivePublisher {
    join: JoinHandle<TaskReturn>,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct PublisherCounters {
    active: AtomicUsize,
    connected: AtomicBool,
    connections: AtomicU64,
}

struct ActiveGuard(Arc<PublisherCounters>);

impl ActiveGuard {
    fn new(counters: Arc<PublisherCounters>) -> Self {
        counters.active.fetch_add(1, Ordering::SeqCst);
        Self(counters)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Handle to the running publisher
pub struct PublisherManager {
    counters: Arc<PublisherCounters>,
    cancel: CancellationToken,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl PublisherManager {
    /// Start publishing everything received on `receiver`
    pub fn start(
        receiver: mpsc::Receiver<OutboundMessage>,
        connector: Arc<dyn BusConnector>,
        discovery: Arc<dyn DiscoverySource>,
        settings: PublisherSettings,
    ) -> Self {
        let counters = Arc::new(PublisherCounters::default());
        let cancel = CancellationToken::new();
        let supervisor = Supervisor {
            connector,
            discovery,
            backoff: Backoff::new(settings.reconnect_base_delay, settings.reconnect_max_delay),
            topics: settings.topics,
            counters: Arc::clone(&counters),
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(supervisor.run(receiver));
        Self {
            counters,
            cancel,
            supervisor: Mutex::new(Some(join)),
        }
    }

    /// Number of publishing tasks alive right now (0 or 1)
    pub fn active_publishers(&self) -> usize {
        self.counters.active.load(Ordering::SeqCst)
    }

    /// Whether a connection is established
    pub fn is_connected(&self) -> bool {
        self.counters.connected.load(Ordering::SeqCst)
    }

    /// Successful connections so far, reconnects included
    pub fn connections(&self) -> u64 {
        self.counters.connections.load(Ordering::SeqCst)
    }

    /// Flush what is queued, announce offline and stop.
    ///
    /// Waits at most `grace` for the supervisor.
    pub async fn shutdown(&self, grace: Duration) {
        self.cancel.cancel();
        let Some(join) = self.supervisor.lock().await.take() else {
            return;
        };
        match tokio::time::timeout(grace, join).await {
            Ok(Ok(())) => info!("Publisher stopped"),
            Ok(Err(e)) => error!(error = %e, "Publisher supervisor failed"),
            Err(_) => warn!("Publisher did not stop within the grace period"),
        }
    }
}

struct Supervisor {
    connector: Arc<dyn BusConnector>,
    discovery: Arc<dyn DiscoverySource>,
    backoff: Backoff,
    topics: BusTopics,
    counters: Arc<PublisherCounters>,
    cancel: CancellationToken,
}

impl Supervisor {
    async fn run(mut self, mut receiver: mpsc::Receiver<OutboundMessage>) {
        let mut pending: Option<OutboundMessage> = None;

        loop {
            let Some(connection) = self.connect().await else {
                debug!("Publisher supervisor cancelled before connecting");
                return;
            };

            if let Err(e) = self.announce(connection.as_ref()).await {
                warn!(error = %e, "Failed to re-announce after connecting");
                self.counters.connected.store(false, Ordering::SeqCst);
                if !self.sleep_backoff().await {
                    return;
                }
                continue;
            }

            let task_cancel = self.cancel.child_token();
            let current = ActivePublisher {
                join: tokio::spawn(publish_loop(
                    connection,
                    receiver,
                    pending.take(),
                    self.topics.clone(),
                    task_cancel.clone(),
                    ActiveGuard::new(Arc::clone(&self.counters)),
                )),
                cancel: task_cancel,
            };

            // The old task must be gone before a replacement is spawned
            let joined = current.join.await;
            current.cancel.cancel();
            self.counters.connected.store(false, Ordering::SeqCst);
            let returned = match joined {
                Ok(returned) => returned,
                Err(e) => {
                    error!(error = %e, "Publishing task panicked, publisher stopped");
                    return;
                }
            };

            receiver = returned.receiver;
            pending = returned.pending;
            match returned.exit {
                PublisherExit::Disconnected => {
                    warn!("Message bus disconnected, reconnecting");
                    if !self.sleep_backoff().await {
                        return;
                    }
                }
                PublisherExit::Cancelled => return,
                PublisherExit::QueueClosed => {
                    info!("Outbound queue closed, publisher stopping");
                    return;
                }
            }
        }
    }

    /// Connect, retrying with backoff; `None` once cancelled
    async fn connect(&mut self) -> Option<Arc<dyn BusConnection>> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            let attempt = tokio::select! {
                () = self.cancel.cancelled() => return None,
                attempt = self.connector.connect() => attempt,
            };
            match attempt {
                Ok(connection) => {
                    let total = self.counters.connections.fetch_add(1, Ordering::SeqCst) + 1;
                    self.counters.connected.store(true, Ordering::SeqCst);
                    info!(
                        connector = self.connector.connector_name(),
                        connections = total,
                        "Connected to message bus"
                    );
                    self.backoff.reset();
                    return Some(connection);
                }
                Err(e) => {
                    warn!(
                        connector = self.connector.connector_name(),
                        attempt = self.backoff.attempts() + 1,
                        error = %e,
                        "Message bus connection failed"
                    );
                    if !self.sleep_backoff().await {
                        return None;
                    }
                }
            }
        }
    }

    /// Wait the next backoff delay; `false` when cancelled meanwhile
    async fn sleep_backoff(&mut self) -> bool {
        let delay = self.backoff.next_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Waiting before reconnect");
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    async fn announce(&self, connection: &dyn BusConnection) -> Result<()> {
        let messages = self.discovery.discovery_messages();
        let count = messages.len();
        for message in messages {
            connection.publish(&message.topic, message.payload).await?;
        }
        debug!(messages = count, "Registration state published");
        Ok(())
    }
}

async fn publish_loop(
    connection: Arc<dyn BusConnection>,
    mut receiver: mpsc::Receiver<OutboundMessage>,
    mut pending: Option<OutboundMessage>,
    topics: BusTopics,
    cancel: CancellationToken,
    _active: ActiveGuard,
) -> TaskReturn {
    loop {
        let message = match pending.take() {
            Some(message) => message,
            None => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        drain_and_go_offline(connection.as_ref(), &mut receiver, &topics).await;
                        return TaskReturn { receiver, pending: None, exit: PublisherExit::Cancelled };
                    }
                    () = connection.closed() => {
                        return TaskReturn { receiver, pending: None, exit: PublisherExit::Disconnected };
                    }
                    received = receiver.recv() => match received {
                        Some(message) => message,
                        None => return TaskReturn { receiver, pending: None, exit: PublisherExit::QueueClosed },
                    },
                }
            }
        };

        if let Err(e) = connection
            .publish(&message.topic, message.payload.clone())
            .await
        {
            warn!(topic = %message.topic, error = %e, "Publish failed, keeping message for retry");
            return TaskReturn {
                receiver,
                pending: Some(message),
                exit: PublisherExit::Disconnected,
            };
        }
    }
}

async fn drain_and_go_offline(
    connection: &dyn BusConnection,
    receiver: &mut mpsc::Receiver<OutboundMessage>,
    topics: &BusTopics,
) {
    while let Ok(message) = receiver.try_recv() {
        if let Err(e) = connection.publish(&message.topic, message.payload).await {
            warn!(error = %e, "Dropping queued messages on shutdown");
            return;
        }
    }
    match OutboundMessage::json(topics.status(), &ServiceStatusPayload::offline()) {
        Ok(offline) => {
            if let Err(e) = connection.publish(&offline.topic, offline.payload).await {
                debug!(error = %e, "Offline announcement not delivered");
            }
        }
        Err(e) => debug!(error = %e, "Offline announcement not serialized"),
    }
}
