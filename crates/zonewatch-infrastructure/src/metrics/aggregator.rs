//! Windowed usage aggregation
//!
//! Samples land in fixed-width buckets per (provider, zone). A read sums
//! the buckets that overlap the requested trailing window and never
//! modifies state, so two reads without traffic in between agree.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use metrics::{counter, histogram};
use tokio::time::Instant;
use zonewatch_domain::value_objects::{
    LatencySummary, MetricsEntry, MetricsKey, MetricsSnapshot, UsageStats,
};

use crate::constants::{
    LATENCY_BUCKETS_MS, METRIC_PROVIDER_COST, METRIC_PROVIDER_LATENCY, METRIC_PROVIDER_REQUESTS,
    METRICS_BUCKET_SECS,
};

/// Fixed-bound latency histogram
#[derive(Debug, Clone, Default, PartialEq)]
struct LatencyHistogram {
    // One slot per bound plus an overflow slot
    counts: [u64; LATENCY_BUCKETS_MS.len() + 1],
    count: u64,
    sum_ms: f64,
    min_ms: f64,
    max_ms: f64,
}

impl LatencyHistogram {
    fn record(&mut self, latency_ms: f64) {
        let slot = LATENCY_BUCKETS_MS
            .iter()
            .position(|bound| latency_ms <= *bound)
            .unwrap_or(LATENCY_BUCKETS_MS.len());
        self.counts[slot] += 1;
        if self.count == 0 {
            self.min_ms = latency_ms;
            self.max_ms = latency_ms;
        } else {
            self.min_ms = self.min_ms.min(latency_ms);
            self.max_ms = self.max_ms.max(latency_ms);
        }
        self.count += 1;
        self.sum_ms += latency_ms;
    }

    fn absorb(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        for (slot, n) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot += n;
        }
        if self.count == 0 {
            self.min_ms = other.min_ms;
            self.max_ms = other.max_ms;
        } else {
            self.min_ms = self.min_ms.min(other.min_ms);
            self.max_ms = self.max_ms.max(other.max_ms);
        }
        self.count += other.count;
        self.sum_ms += other.sum_ms;
    }

    /// Upper bound of the bucket holding quantile `q`, capped at the max sample
    fn quantile(&self, q: f64) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let rank = ((q * self.count as f64).ceil() as u64).max(1);
        let mut seen = 0;
        for (slot, n) in self.counts.iter().enumerate() {
            seen += n;
            if seen >= rank {
                return LATENCY_BUCKETS_MS
                    .get(slot)
                    .map_or(self.max_ms, |bound| bound.min(self.max_ms));
            }
        }
        self.max_ms
    }

    fn summary(&self) -> LatencySummary {
        if self.count == 0 {
            return LatencySummary::default();
        }
        LatencySummary {
            count: self.count,
            min_ms: self.min_ms,
            max_ms: self.max_ms,
            mean_ms: self.sum_ms / self.count as f64,
            p50_ms: self.quantile(0.50),
            p95_ms: self.quantile(0.95),
        }
    }
}

/// Counters accumulated over some span of time
#[derive(Debug, Clone, Default, PartialEq)]
struct Tally {
    requests: u64,
    successes: u64,
    failures: u64,
    cost: f64,
    latency: LatencyHistogram,
}

impl Tally {
    fn record(&mut self, success: bool, latency: Duration, cost: f64) {
        self.requests += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.cost += cost;
        self.latency.record(latency.as_secs_f64() * 1000.0);
    }

    fn absorb(&mut self, other: &Self) {
        self.requests += other.requests;
        self.successes += other.successes;
        self.failures += other.failures;
        self.cost += other.cost;
        self.latency.absorb(&other.latency);
    }

    fn stats(&self) -> UsageStats {
        UsageStats {
            requests: self.requests,
            successes: self.successes,
            failures: self.failures,
            cost: self.cost,
            latency: self.latency.summary(),
        }
    }
}

#[derive(Debug, Default)]
struct Series {
    // (bucket index, tally), oldest first
    buckets: VecDeque<(u64, Tally)>,
    lifetime: Tally,
}

/// Per (provider, zone) usage aggregator
#[derive(Debug)]
pub struct MetricsAggregator {
    started: Instant,
    bucket_width: Duration,
    retention: Duration,
    series: DashMap<MetricsKey, Mutex<Series>>,
}

impl MetricsAggregator {
    /// Aggregator keeping samples for `retention`
    pub fn new(retention: Duration) -> Self {
        Self::with_bucket_width(retention, Duration::from_secs(METRICS_BUCKET_SECS))
    }

    /// Aggregator with a custom bucket width
    pub fn with_bucket_width(retention: Duration, bucket_width: Duration) -> Self {
        Self {
            started: Instant::now(),
            bucket_width: bucket_width.max(Duration::from_secs(1)),
            retention,
            series: DashMap::new(),
        }
    }

    fn current_bucket(&self) -> u64 {
        let elapsed = Instant::now().saturating_duration_since(self.started);
        elapsed.as_secs() / self.bucket_width.as_secs()
    }

    fn buckets_in(&self, span: Duration) -> u64 {
        span.as_secs().div_ceil(self.bucket_width.as_secs()).max(1)
    }

    /// Record one provider attempt
    pub fn record(&self, provider: &str, zone: &str, success: bool, latency: Duration, cost: f64) {
        let status = if success { "success" } else { "failure" };
        counter!(
            METRIC_PROVIDER_REQUESTS,
            "provider" => provider.to_string(),
            "zone" => zone.to_string(),
            "status" => status
        )
        .increment(1);
        histogram!(METRIC_PROVIDER_LATENCY, "provider" => provider.to_string())
            .record(latency.as_secs_f64());
        // Counters are integral; cost is exported in thousandths
        counter!(METRIC_PROVIDER_COST, "provider" => provider.to_string())
            .increment((cost.max(0.0) * 1000.0).round() as u64);

        let index = self.current_bucket();
        let oldest_kept = index.saturating_sub(self.buckets_in(self.retention) - 1);
        let key = MetricsKey::new(provider, zone);

        let entry = self.series.entry(key).or_default();
        let mut series = entry.lock().unwrap_or_else(PoisonError::into_inner);
        series.lifetime.record(success, latency, cost);
        match series.buckets.back_mut() {
            Some((last, tally)) if *last == index => tally.record(success, latency, cost),
            _ => {
                let mut tally = Tally::default();
                tally.record(success, latency, cost);
                series.buckets.push_back((index, tally));
            }
        }
        while series
            .buckets
            .front()
            .is_some_and(|(i, _)| *i < oldest_kept)
        {
            series.buckets.pop_front();
        }
    }

    /// Totals over the trailing `window`.
    ///
    /// The window is rounded up to whole buckets and clamped to retention.
    pub fn snapshot(&self, window: Duration) -> MetricsSnapshot {
        let index = self.current_bucket();
        let span = self.buckets_in(window.min(self.retention));
        let first = index.saturating_sub(span - 1);

        self.collect(window, |series| {
            let mut tally = Tally::default();
            for (_, bucket) in series.buckets.iter().filter(|(i, _)| *i >= first) {
                tally.absorb(bucket);
            }
            tally
        })
    }

    /// Totals since the aggregator was created
    pub fn lifetime(&self) -> MetricsSnapshot {
        let elapsed = Instant::now().saturating_duration_since(self.started);
        self.collect(elapsed, |series| series.lifetime.clone())
    }

    fn collect<F>(&self, window: Duration, tally_of: F) -> MetricsSnapshot
    where
        F: Fn(&Series) -> Tally,
    {
        let mut entries: Vec<MetricsEntry> = self
            .series
            .iter()
            .filter_map(|item| {
                let series = item.value().lock().unwrap_or_else(PoisonError::into_inner);
                let tally = tally_of(&series);
                (tally.requests > 0).then(|| MetricsEntry {
                    provider: item.key().provider.clone(),
                    zone: item.key().zone.clone(),
                    stats: tally.stats(),
                })
            })
            .collect();
        entries.sort_by(|a, b| (&a.provider, &a.zone).cmp(&(&b.provider, &b.zone)));

        MetricsSnapshot {
            window,
            generated_at: Utc::now(),
            entries,
        }
    }

    /// Drop buckets that fell out of retention.
    ///
    /// Series themselves are kept: their lifetime totals outlive any window.
    pub fn prune(&self) {
        let oldest_kept = self
            .current_bucket()
            .saturating_sub(self.buckets_in(self.retention) - 1);
        for mut entry in self.series.iter_mut() {
            let series = entry
                .value_mut()
                .get_mut()
                .unwrap_or_else(PoisonError::into_inner);
            series.buckets.retain(|(i, _)| *i >= oldest_kept);
        }
    }
}
