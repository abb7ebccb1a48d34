//! Tests for the operator-facing control plane

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use zonewatch_domain::error::Error;
use zonewatch_domain::value_objects::{CircuitState, WarningScope};
use zonewatch_infrastructure::ControlPlane;
use zonewatch_infrastructure::config::{AppConfig, ReloadTarget};
use zonewatch_infrastructure::scheduler::ZoneScheduler;

use crate::test_utils::{
    Behavior, MockProvider, MockResolver, TestService, test_service, uninitialized_service,
};

fn control(service: &TestService) -> ControlPlane {
    let scheduler = Arc::new(ZoneScheduler::new(
        Arc::clone(&service.context),
        CancellationToken::new(),
        TaskTracker::new(),
        false,
    ));
    ControlPlane::new(Arc::clone(&service.context), scheduler)
}

fn base_options() -> serde_json::Value {
    json!({
        "providers": [
            {"id": "primary", "kind": "null", "priority": 1},
            {"id": "secondary", "kind": "null", "priority": 2}
        ],
        "zones": [{"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 0}]
    })
}

#[tokio::test]
async fn test_apply_before_base_config_is_unavailable() {
    let service = uninitialized_service(MockResolver::default());
    let control = control(&service);

    let err = control.apply_config(&json!({"zones": []})).unwrap_err();

    assert!(matches!(err, Error::MergeNotReady));
    assert_eq!(err.status_code(), 503);
    assert!(control.provider_status().is_empty());
    assert_eq!(control.switch_provider("primary").unwrap_err().status_code(), 503);
}

#[tokio::test]
async fn test_apply_returns_warnings_and_announces_zones() {
    let mut service = test_service(base_options(), MockResolver::default());
    let control = control(&service);

    let warnings = control
        .apply_config(&json!({
            "zones": [
                {"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 0},
                {"camera_entity": "camera.nameless"}
            ]
        }))
        .unwrap();

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].scope, WarningScope::Zone);
    let message = service.outbound.try_recv().unwrap();
    assert_eq!(message.topic, "zonewatch/discovery/kitchen");
}

#[tokio::test]
async fn test_apply_rejects_non_map_data() {
    let service = test_service(base_options(), MockResolver::default());
    let control = control(&service);

    let err = control.apply_config(&json!("zones")).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn test_provider_status_and_switch() {
    let service = test_service(base_options(), MockResolver::default());
    let control = control(&service);
    control.replace_config(&base_options()).unwrap();

    control.switch_provider("secondary").unwrap();
    let status = control.provider_status();

    assert_eq!(status.len(), 2);
    assert_eq!(status[0].provider, "primary");
    assert!(!status[0].preferred);
    assert!(status[1].preferred);
    assert_eq!(status[1].circuit_state, CircuitState::Closed);
    assert_eq!(control.switch_provider("missing").unwrap_err().status_code(), 409);
}

#[tokio::test]
async fn test_run_zone_analysis_feeds_metrics() {
    let primary = MockProvider::new("primary", Behavior::Fail);
    let secondary = MockProvider::new("secondary", Behavior::Succeed);
    let service = test_service(
        base_options(),
        MockResolver::default().with(primary).with(secondary),
    );
    let control = control(&service);

    let result = control.run_zone_analysis("kitchen").await.unwrap();

    assert_eq!(result.provider_id.as_deref(), Some("secondary"));
    let metrics = control.metrics(Duration::from_secs(300));
    assert_eq!(metrics.get("primary", "kitchen").unwrap().failures, 1);
    assert_eq!(metrics.get("secondary", "kitchen").unwrap().successes, 1);
    assert_eq!(control.lifetime_metrics().totals().requests, 2);
    assert_eq!(control.skipped_triggers().get("kitchen"), Some(&0));
}

#[tokio::test]
async fn test_file_reload_replaces_overlays() {
    let service = test_service(base_options(), MockResolver::default());
    let control = control(&service);
    control
        .apply_config(&json!({"zones": [{"name": "porch", "camera_entity": "camera.porch"}]}))
        .unwrap();

    let mut reloaded = AppConfig::default();
    reloaded.options = json!({
        "zones": [{"name": "garage", "camera_entity": "camera.garage"}]
    });
    control.reload(reloaded).await.unwrap();

    let config = service.context.config().unwrap();
    assert!(config.zone("garage").is_some());
    assert!(config.zone("porch").is_none());
    assert!(config.providers().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_applies_activate_the_installed_snapshot() {
    let service = test_service(base_options(), MockResolver::default());
    let scheduler = Arc::new(ZoneScheduler::new(
        Arc::clone(&service.context),
        CancellationToken::new(),
        TaskTracker::new(),
        true,
    ));
    let control = Arc::new(ControlPlane::new(
        Arc::clone(&service.context),
        Arc::clone(&scheduler),
    ));

    let applies: Vec<_> = (0..16)
        .map(|i| {
            let control = Arc::clone(&control);
            tokio::spawn(async move {
                control.apply_config(&json!({
                    "providers": [{"id": format!("provider{i}"), "kind": "null"}],
                    "zones": [{
                        "name": format!("zone{i}"),
                        "camera_entity": "camera.shared",
                        "interval_minutes": 30
                    }]
                }))
            })
        })
        .collect();
    for outcome in futures::future::join_all(applies).await {
        outcome.unwrap().unwrap();
    }

    let config = service.context.config().unwrap();
    let zone = &config.zones()[0].name;
    assert_eq!(scheduler.scheduled_zones(), vec![zone.clone()]);
    let provider = &config.providers()[0].id;
    let breakers = service.context.dispatcher().breakers();
    assert_eq!(breakers.len(), 1);
    assert!(breakers.snapshot(provider).is_some());

    scheduler.stop();
}
