//! Tests for zone triggers and the single-flight rule

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use zonewatch_domain::error::Error;
use zonewatch_domain::events::ZoneStatePayload;
use zonewatch_infrastructure::ShutdownCoordinator;
use zonewatch_infrastructure::scheduler::ZoneScheduler;

use crate::test_utils::{Behavior, MockProvider, MockResolver, TestService, eventually, test_service};

fn options(zones: serde_json::Value) -> serde_json::Value {
    json!({
        "providers": [{"id": "vision", "kind": "null", "priority": 1}],
        "zones": zones
    })
}

fn kitchen_only() -> serde_json::Value {
    options(json!([{"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 0}]))
}

fn scheduler(service: &TestService, triggers_enabled: bool) -> ZoneScheduler {
    ZoneScheduler::new(
        Arc::clone(&service.context),
        CancellationToken::new(),
        TaskTracker::new(),
        triggers_enabled,
    )
}

#[tokio::test]
async fn test_busy_zone_skips_trigger_and_counts_it() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let service = test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let scheduler = scheduler(&service, false);

    assert!(scheduler.trigger("kitchen"));
    assert!(eventually(|| provider.calls() == 1).await);

    assert!(!scheduler.trigger("kitchen"));
    assert!(!scheduler.trigger("kitchen"));
    assert!(!scheduler.trigger("kitchen"));
    assert_eq!(service.context.in_flight().skipped("kitchen"), 3);
    assert_eq!(provider.calls(), 1);

    provider.open_gate(1);
    let in_flight = Arc::clone(service.context.in_flight());
    assert!(eventually(|| !in_flight.is_busy("kitchen")).await);

    provider.set_behavior(Behavior::Succeed);
    assert!(scheduler.trigger("kitchen"));
    assert!(eventually(|| provider.calls() == 2).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_start_one_cycle() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let service = test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let scheduler = Arc::new(scheduler(&service, false));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.trigger("kitchen") })
        })
        .collect();
    let started = futures::future::join_all(handles)
        .await
        .into_iter()
        .filter(|outcome| *outcome.as_ref().unwrap())
        .count();

    assert_eq!(started, 1);
    assert_eq!(service.context.in_flight().skipped("kitchen"), 15);
    assert!(eventually(|| provider.calls() == 1).await);
    provider.open_gate(1);
}

#[tokio::test]
async fn test_manual_run_returns_result_and_publishes_state() {
    let provider = MockProvider::new("vision", Behavior::Succeed);
    let mut service =
        test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let scheduler = scheduler(&service, false);

    let result = scheduler.run_zone_analysis("kitchen").await.unwrap();

    assert!(result.success);
    assert_eq!(result.provider_id.as_deref(), Some("vision"));
    assert_eq!(service.frames.captures(), 1);
    assert!(!service.context.in_flight().is_busy("kitchen"));

    let message = service.outbound.try_recv().unwrap();
    assert_eq!(message.topic, "zonewatch/zone/kitchen/state");
    let payload: ZoneStatePayload = serde_json::from_slice(&message.payload).unwrap();
    assert!(payload.success);
    assert_eq!(payload.tasks, vec!["tidy kitchen"]);
}

#[tokio::test]
async fn test_manual_run_on_busy_zone_is_refused() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let service = test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let scheduler = scheduler(&service, false);

    assert!(scheduler.trigger("kitchen"));
    assert!(eventually(|| provider.calls() == 1).await);

    let err = scheduler.run_zone_analysis("kitchen").await.unwrap_err();
    assert!(matches!(err, Error::ZoneBusy { .. }));
    assert_eq!(err.status_code(), 409);
    provider.open_gate(1);
}

#[tokio::test]
async fn test_manual_run_on_unknown_zone_is_not_found() {
    let service = test_service(kitchen_only(), MockResolver::default());
    let scheduler = scheduler(&service, false);

    let err = scheduler.run_zone_analysis("garage").await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_exhausted_providers_still_publish_state() {
    let provider = MockProvider::new("vision", Behavior::Fail);
    let mut service =
        test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let scheduler = scheduler(&service, false);

    let result = scheduler.run_zone_analysis("kitchen").await.unwrap();

    assert!(!result.success);
    let message = service.outbound.try_recv().unwrap();
    let payload: ZoneStatePayload = serde_json::from_slice(&message.payload).unwrap();
    assert!(!payload.success);
    assert!(payload.error.is_some());
}

#[tokio::test]
async fn test_reconcile_spawns_only_scheduled_zones() {
    let service = test_service(
        options(json!([
            {"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 60},
            {"name": "attic", "camera_entity": "camera.attic", "interval_minutes": 0},
            {"name": "hall", "camera_entity": "camera.hall", "interval_minutes": 0, "specific_times": ["07:30"]}
        ])),
        MockResolver::default(),
    );
    let scheduler = scheduler(&service, true);
    let zones = service.context.config().unwrap().zones().to_vec();

    scheduler.reconcile(&zones);
    assert_eq!(scheduler.scheduled_zones(), vec!["hall", "kitchen"]);

    scheduler.reconcile(&zones[..1]);
    assert_eq!(scheduler.scheduled_zones(), vec!["kitchen"]);

    scheduler.stop();
    assert!(scheduler.scheduled_zones().is_empty());
}

#[tokio::test]
async fn test_disabled_triggers_spawn_nothing() {
    let service = test_service(
        options(json!([{"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 5}])),
        MockResolver::default(),
    );
    let scheduler = scheduler(&service, false);

    scheduler.reconcile(service.context.config().unwrap().zones());

    assert!(scheduler.scheduled_zones().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interval_trigger_fires_after_interval() {
    let provider = MockProvider::new("vision", Behavior::Succeed);
    let service = test_service(
        options(json!([{"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 1}])),
        MockResolver::default().with(Arc::clone(&provider)),
    );
    let scheduler = scheduler(&service, true);
    scheduler.reconcile(service.context.config().unwrap().zones());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(provider.calls(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(provider.calls(), 1);

    scheduler.stop();
}

#[tokio::test(start_paused = true)]
async fn test_reconciling_a_changed_zone_lets_its_cycle_finish() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let mut service = test_service(
        options(json!([{"name": "kitchen", "camera_entity": "camera.kitchen", "interval_minutes": 1}])),
        MockResolver::default().with(Arc::clone(&provider)),
    );
    let scheduler = scheduler(&service, true);
    scheduler.reconcile(service.context.config().unwrap().zones());

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(provider.calls(), 1);
    assert!(service.context.in_flight().is_busy("kitchen"));

    let changed = service
        .context
        .engine()
        .apply(&json!({"zones": [{
            "name": "kitchen",
            "camera_entity": "camera.kitchen",
            "interval_minutes": 1,
            "purpose": "Keep the counters clear"
        }]}))
        .unwrap();
    scheduler.reconcile(changed.config.zones());
    assert_eq!(scheduler.scheduled_zones(), vec!["kitchen"]);
    assert!(service.context.in_flight().is_busy("kitchen"));

    provider.open_gate(1);
    let in_flight = Arc::clone(service.context.in_flight());
    assert!(eventually(|| !in_flight.is_busy("kitchen")).await);

    let message = service.outbound.try_recv().unwrap();
    assert_eq!(message.topic, "zonewatch/zone/kitchen/state");
    let payload: ZoneStatePayload = serde_json::from_slice(&message.payload).unwrap();
    assert!(payload.success);
    let lifetime = service.context.metrics().lifetime();
    assert_eq!(lifetime.get("vision", "kitchen").unwrap().successes, 1);

    scheduler.stop();
}

#[tokio::test]
async fn test_shutdown_cancels_and_awaits_running_cycles() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let mut service =
        test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
    let scheduler = Arc::new(ZoneScheduler::new(
        Arc::clone(&service.context),
        coordinator.token(),
        coordinator.tracker(),
        false,
    ));

    assert!(scheduler.trigger("kitchen"));
    assert!(eventually(|| provider.calls() == 1).await);

    scheduler.stop();
    assert!(coordinator.shutdown().await);

    assert!(!service.context.in_flight().is_busy("kitchen"));
    assert!(coordinator.tracker().is_empty());
    assert!(service.outbound.try_recv().is_err());
    assert!(service.context.metrics().lifetime().entries.is_empty());
}

#[tokio::test]
async fn test_shutdown_fails_a_waiting_manual_run() {
    let provider = MockProvider::new("vision", Behavior::Gated);
    let service = test_service(kitchen_only(), MockResolver::default().with(Arc::clone(&provider)));
    let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
    let scheduler = Arc::new(ZoneScheduler::new(
        Arc::clone(&service.context),
        coordinator.token(),
        coordinator.tracker(),
        false,
    ));

    let manual = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_zone_analysis("kitchen").await })
    };
    assert!(eventually(|| provider.calls() == 1).await);

    assert!(coordinator.shutdown().await);

    let err = manual.await.unwrap().unwrap_err();
    assert_eq!(err.status_code(), 500);
    assert!(!service.context.in_flight().is_busy("kitchen"));
}
