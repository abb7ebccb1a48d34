//! Tests for windowed usage aggregation

use std::time::Duration;

use zonewatch_infrastructure::metrics::MetricsAggregator;

const HOUR: Duration = Duration::from_secs(3600);

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[tokio::test(start_paused = true)]
async fn test_counts_per_provider_and_zone() {
    let metrics = MetricsAggregator::new(HOUR);

    metrics.record("primary", "kitchen", true, ms(120), 0.01);
    metrics.record("primary", "kitchen", false, ms(80), 0.01);
    metrics.record("primary", "office", true, ms(300), 0.01);
    metrics.record("secondary", "kitchen", true, ms(40), 0.0);

    let snapshot = metrics.snapshot(HOUR);
    assert_eq!(snapshot.entries.len(), 3);
    assert_eq!(snapshot.entries[0].provider, "primary");
    assert_eq!(snapshot.entries[0].zone, "kitchen");

    let kitchen = snapshot.get("primary", "kitchen").unwrap();
    assert_eq!(kitchen.requests, 2);
    assert_eq!(kitchen.successes, 1);
    assert_eq!(kitchen.failures, 1);
    assert!((kitchen.cost - 0.02).abs() < 1e-9);
    assert_eq!(kitchen.latency.count, 2);
    assert_eq!(kitchen.latency.min_ms, 80.0);
    assert_eq!(kitchen.latency.max_ms, 120.0);
    assert_eq!(kitchen.latency.mean_ms, 100.0);

    let totals = snapshot.provider_totals("primary");
    assert_eq!(totals.requests, 3);
    assert_eq!(snapshot.totals().requests, 4);
    assert!((snapshot.totals().success_rate() - 0.75).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_reads_do_not_reset_counters() {
    let metrics = MetricsAggregator::new(HOUR);
    metrics.record("primary", "kitchen", true, ms(100), 0.0);

    let first = metrics.snapshot(HOUR);
    let second = metrics.snapshot(HOUR);

    assert_eq!(first.entries, second.entries);
    assert_eq!(second.get("primary", "kitchen").unwrap().requests, 1);
}

#[tokio::test(start_paused = true)]
async fn test_window_excludes_older_buckets() {
    let metrics = MetricsAggregator::new(HOUR);
    metrics.record("primary", "kitchen", true, ms(100), 0.0);

    tokio::time::advance(Duration::from_secs(10 * 60)).await;
    metrics.record("primary", "kitchen", false, ms(100), 0.0);

    let recent = metrics.snapshot(Duration::from_secs(5 * 60));
    let stats = recent.get("primary", "kitchen").unwrap();
    assert_eq!(stats.requests, 1);
    assert_eq!(stats.failures, 1);

    let wide = metrics.snapshot(Duration::from_secs(30 * 60));
    assert_eq!(wide.get("primary", "kitchen").unwrap().requests, 2);
}

#[tokio::test(start_paused = true)]
async fn test_samples_expire_after_retention() {
    let metrics = MetricsAggregator::new(Duration::from_secs(15 * 60));
    metrics.record("primary", "kitchen", true, ms(100), 0.0);

    tokio::time::advance(Duration::from_secs(20 * 60)).await;

    assert!(metrics.snapshot(HOUR).entries.is_empty());
    assert_eq!(
        metrics.lifetime().get("primary", "kitchen").unwrap().requests,
        1
    );

    metrics.prune();
    assert!(metrics.snapshot(HOUR).entries.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_prune_keeps_lifetime_totals() {
    let metrics = MetricsAggregator::new(Duration::from_secs(120));
    metrics.record("primary", "kitchen", true, ms(100), 0.01);
    metrics.record("primary", "kitchen", false, ms(300), 0.01);

    tokio::time::advance(Duration::from_secs(600)).await;
    metrics.prune();

    assert!(metrics.snapshot(Duration::from_secs(120)).entries.is_empty());
    let lifetime = metrics.lifetime();
    let stats = lifetime.get("primary", "kitchen").unwrap();
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.failures, 1);

    metrics.record("primary", "kitchen", true, ms(50), 0.0);
    let recent = metrics.snapshot(Duration::from_secs(120));
    assert_eq!(recent.get("primary", "kitchen").unwrap().requests, 1);
    assert_eq!(
        metrics.lifetime().get("primary", "kitchen").unwrap().requests,
        3
    );
}

#[tokio::test(start_paused = true)]
async fn test_percentiles_come_from_bucket_bounds() {
    let metrics = MetricsAggregator::new(HOUR);
    for latency in [20, 30, 40, 200] {
        metrics.record("primary", "kitchen", true, ms(latency), 0.0);
    }

    let latency = metrics.snapshot(HOUR).get("primary", "kitchen").unwrap().latency;
    assert_eq!(latency.p50_ms, 50.0);
    assert_eq!(latency.p95_ms, 200.0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_aggregator_has_no_rows() {
    let metrics = MetricsAggregator::with_bucket_width(HOUR, Duration::from_secs(10));
    let snapshot = metrics.snapshot(HOUR);
    assert!(snapshot.entries.is_empty());
    assert_eq!(snapshot.totals().requests, 0);
    assert_eq!(snapshot.totals().success_rate(), 0.0);
}
