//! Tests for the merge engine snapshot lifecycle

use std::sync::Arc;

use serde_json::json;
use zonewatch_domain::error::Error;
use zonewatch_infrastructure::config::MergeEngine;

#[test]
fn test_apply_before_initialize_is_not_ready() {
    let engine = MergeEngine::new();

    assert!(!engine.is_ready());
    let err = engine.apply(&json!({"zones": []})).unwrap_err();
    assert!(matches!(err, Error::MergeNotReady));
    assert_eq!(err.status_code(), 503);
    assert!(matches!(engine.snapshot(), Err(Error::MergeNotReady)));
}

#[test]
fn test_not_ready_wins_over_malformed_input() {
    let engine = MergeEngine::new();
    let err = engine.apply(&json!("not a map")).unwrap_err();
    assert!(matches!(err, Error::MergeNotReady));
}

#[test]
fn test_apply_overlays_current_snapshot() {
    let engine = MergeEngine::new();
    engine
        .initialize(&json!({
            "zones": [{"name": "kitchen", "camera_entity": "camera.kitchen", "ignore_rules": ["trash"]}]
        }))
        .unwrap();

    let outcome = engine
        .apply(&json!({"providers": [{"id": "local", "kind": "null"}]}))
        .unwrap();

    assert!(outcome.warnings.is_empty());
    let snapshot = engine.snapshot().unwrap();
    assert!(Arc::ptr_eq(&snapshot, &outcome.config));
    assert_eq!(snapshot.zones().len(), 1);
    assert_eq!(snapshot.providers().len(), 1);
}

#[test]
fn test_held_snapshot_is_unaffected_by_later_apply() {
    let engine = MergeEngine::new();
    engine.initialize(&json!({})).unwrap();
    let before = engine.snapshot().unwrap();

    engine
        .apply(&json!({"zones": [{"name": "hall", "camera_entity": "camera.hall"}]}))
        .unwrap();

    assert!(before.zones().is_empty());
    assert_eq!(engine.snapshot().unwrap().zones().len(), 1);
}

#[test]
fn test_malformed_apply_keeps_previous_snapshot() {
    let engine = MergeEngine::new();
    engine
        .initialize(&json!({"zones": [{"name": "hall", "camera_entity": "camera.hall"}]}))
        .unwrap();

    let err = engine.apply(&json!([1, 2, 3])).unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(engine.snapshot().unwrap().zone("hall").is_some());
}

#[test]
fn test_initialize_replaces_runtime_overlays() {
    let engine = MergeEngine::new();
    engine.initialize(&json!({})).unwrap();
    engine
        .apply(&json!({"zones": [{"name": "hall", "camera_entity": "camera.hall"}]}))
        .unwrap();

    engine
        .initialize(&json!({"zones": [{"name": "porch", "camera_entity": "camera.porch"}]}))
        .unwrap();

    let snapshot = engine.snapshot().unwrap();
    assert!(snapshot.zone("hall").is_none());
    assert!(snapshot.zone("porch").is_some());
}
