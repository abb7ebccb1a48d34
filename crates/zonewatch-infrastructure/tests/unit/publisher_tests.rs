//! Tests for the publisher reconnect lifecycle

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use zonewatch_domain::events::{BusTopics, OutboundMessage, ServiceStatusPayload};
use zonewatch_domain::ports::BusConnector;
use zonewatch_infrastructure::publisher::{DiscoverySource, PublisherManager, PublisherSettings};

use crate::test_utils::{MockConnector, MockResolver, eventually, test_service};

fn settings() -> PublisherSettings {
    PublisherSettings {
        reconnect_base_delay: Duration::from_millis(10),
        reconnect_max_delay: Duration::from_millis(40),
        topics: BusTopics::new("zonewatch"),
    }
}

fn discovery() -> Arc<dyn DiscoverySource> {
    let service = test_service(
        json!({"zones": [{"name": "kitchen", "camera_entity": "camera.kitchen"}]}),
        MockResolver::default(),
    );
    service.context
}

fn message(topic: &str) -> OutboundMessage {
    OutboundMessage {
        topic: topic.to_string(),
        payload: b"{}".to_vec(),
    }
}

fn start(connector: &Arc<MockConnector>) -> (PublisherManager, mpsc::Sender<OutboundMessage>) {
    let (tx, rx) = mpsc::channel(16);
    let manager = PublisherManager::start(
        rx,
        Arc::clone(connector) as Arc<dyn BusConnector>,
        discovery(),
        settings(),
    );
    (manager, tx)
}

fn count(connector: &MockConnector, topic: &str) -> usize {
    connector
        .published_topics()
        .iter()
        .filter(|t| t.as_str() == topic)
        .count()
}

#[tokio::test]
async fn test_connect_announces_then_publishes() {
    let connector = Arc::new(MockConnector::default());
    let (manager, tx) = start(&connector);

    tx.send(message("zonewatch/zone/kitchen/state")).await.unwrap();
    assert!(eventually(|| count(&connector, "zonewatch/zone/kitchen/state") == 1).await);

    let topics = connector.published_topics();
    assert_eq!(topics[0], "zonewatch/status");
    assert_eq!(topics[1], "zonewatch/discovery/kitchen");
    assert!(manager.is_connected());
    assert_eq!(manager.active_publishers(), 1);

    manager.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_reconnect_leaves_exactly_one_publisher() {
    let connector = Arc::new(MockConnector::default());
    let (manager, tx) = start(&connector);
    assert!(eventually(|| manager.connections() == 1).await);

    connector.latest().unwrap().disconnect();
    tx.send(message("zonewatch/zone/kitchen/state")).await.unwrap();

    assert!(eventually(|| manager.connections() == 2).await);
    assert!(eventually(|| count(&connector, "zonewatch/zone/kitchen/state") == 1).await);
    assert_eq!(manager.active_publishers(), 1);
    assert_eq!(connector.connection_count(), 2);
    // Registration is repeated on the new connection
    assert_eq!(count(&connector, "zonewatch/status"), 2);
    assert_eq!(count(&connector, "zonewatch/discovery/kitchen"), 2);

    manager.shutdown(Duration::from_secs(1)).await;
    assert_eq!(manager.active_publishers(), 0);
}

#[tokio::test]
async fn test_repeated_disconnects_never_overlap_publishers() {
    let connector = Arc::new(MockConnector::default());
    let (manager, _tx) = start(&connector);

    for round in 1..=5u64 {
        assert!(eventually(|| manager.connections() == round).await);
        assert!(manager.active_publishers() <= 1);
        connector.latest().unwrap().disconnect();
    }

    assert!(eventually(|| manager.connections() == 6).await);
    assert!(eventually(|| manager.active_publishers() == 1).await);
    manager.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_failed_connects_are_retried() {
    let connector = Arc::new(MockConnector::failing_first(2));
    let (manager, _tx) = start(&connector);

    assert!(eventually(|| manager.is_connected()).await);
    assert_eq!(connector.attempts(), 3);
    assert_eq!(manager.connections(), 1);

    manager.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_shutdown_flushes_queue_and_goes_offline() {
    let connector = Arc::new(MockConnector::default());
    let (manager, tx) = start(&connector);
    assert!(eventually(|| manager.is_connected()).await);

    for _ in 0..3 {
        tx.send(message("zonewatch/zone/kitchen/state")).await.unwrap();
    }
    manager.shutdown(Duration::from_secs(1)).await;

    assert_eq!(count(&connector, "zonewatch/zone/kitchen/state"), 3);
    let published = connector.published();
    let last = published.last().unwrap();
    assert_eq!(last.topic, "zonewatch/status");
    let status: ServiceStatusPayload = serde_json::from_slice(&last.payload).unwrap();
    assert_eq!(status.status, "offline");
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_reconnecting_returns() {
    let connector = Arc::new(MockConnector::failing_first(usize::MAX / 2));
    let (manager, _tx) = start(&connector);

    tokio::time::sleep(Duration::from_millis(100)).await;
    manager.shutdown(Duration::from_secs(5)).await;

    assert!(!manager.is_connected());
    assert_eq!(manager.active_publishers(), 0);
}

#[tokio::test]
async fn test_dropped_queue_stops_publisher() {
    let connector = Arc::new(MockConnector::default());
    let (manager, tx) = start(&connector);
    assert!(eventually(|| manager.active_publishers() == 1).await);

    drop(tx);

    assert!(eventually(|| manager.active_publishers() == 0).await);
}
