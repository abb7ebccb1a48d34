//! Unit tests for bus payloads and topic naming

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;
use zonewatch_domain::constants::PROVIDERS_EXHAUSTED_MARKER;
use zonewatch_domain::events::{
    BusTopics, OutboundMessage, ZoneDiscoveryPayload, ZoneStatePayload,
};
use zonewatch_domain::value_objects::{
    AnalysisDetail, AnalysisResult, InferenceOutput, ZoneConfig,
};

fn result(detail: AnalysisDetail, success: bool) -> AnalysisResult {
    AnalysisResult {
        request_id: Uuid::new_v4(),
        zone: "Living Room".to_string(),
        provider_id: success.then(|| "primary".to_string()),
        success,
        latency: Duration::from_millis(1500),
        cost_estimate: 0.02,
        detail,
        completed_at: Utc::now(),
    }
}

#[test]
fn test_topics_are_slugged() {
    let topics = BusTopics::new("home/zonewatch/");
    assert_eq!(topics.status(), "home/zonewatch/status");
    assert_eq!(
        topics.zone_state("Living Room"),
        "home/zonewatch/zone/living_room/state"
    );
    assert_eq!(
        topics.zone_discovery("Living Room"),
        "home/zonewatch/discovery/living_room"
    );
}

#[test]
fn test_discovery_payload_points_at_state_topic() {
    let topics = BusTopics::default();
    let zone = ZoneConfig::new("kitchen", "camera.kitchen");
    let payload = ZoneDiscoveryPayload::from_zone(&zone, &topics);
    assert_eq!(payload.state_topic, "zonewatch/zone/kitchen/state");
    assert_eq!(payload.camera_entity, "camera.kitchen");
}

#[test]
fn test_state_payload_from_completed_result() {
    let detail = AnalysisDetail::Completed {
        output: InferenceOutput {
            summary: "Dishes in sink".to_string(),
            tasks: vec!["Wash dishes".to_string()],
        },
        attempts: Vec::new(),
    };
    let payload = ZoneStatePayload::from_result(&result(detail, true), None);
    assert!(payload.success);
    assert_eq!(payload.tasks, vec!["Wash dishes".to_string()]);
    assert_eq!(payload.error, None);
    assert!((payload.latency_ms - 1500.0).abs() < 1e-6);
}

#[test]
fn test_state_payload_from_exhausted_result() {
    let detail = AnalysisDetail::Exhausted {
        marker: PROVIDERS_EXHAUSTED_MARKER.to_string(),
        attempts: Vec::new(),
    };
    let payload = ZoneStatePayload::from_result(&result(detail, false), Some("todo.home".into()));
    assert!(!payload.success);
    assert!(payload.tasks.is_empty());
    assert_eq!(payload.error.as_deref(), Some(PROVIDERS_EXHAUSTED_MARKER));
    assert_eq!(payload.todo_list_entity.as_deref(), Some("todo.home"));
}

#[test]
fn test_outbound_message_serializes_json() {
    let message = OutboundMessage::json("t".to_string(), &serde_json::json!({"a": 1}))
        .expect("serialization should succeed");
    assert_eq!(message.payload, br#"{"a":1}"#.to_vec());
}
