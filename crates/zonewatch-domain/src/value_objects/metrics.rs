use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregation key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricsKey {
    /// Provider identifier
    pub provider: String,
    /// Zone name
    pub zone: String,
}

impl MetricsKey {
    /// Build a key
    pub fn new<P: Into<String>, Z: Into<String>>(provider: P, zone: Z) -> Self {
        Self {
            provider: provider.into(),
            zone: zone.into(),
        }
    }
}

/// Latency distribution summary, all values in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Number of samples
    pub count: u64,
    /// Fastest sample
    pub min_ms: f64,
    /// Slowest sample
    pub max_ms: f64,
    /// Arithmetic mean
    pub mean_ms: f64,
    /// Median estimate (histogram bucket bound)
    pub p50_ms: f64,
    /// 95th percentile estimate (histogram bucket bound)
    pub p95_ms: f64,
}

/// Counters for one key over one window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageStats {
    /// Attempts made
    pub requests: u64,
    /// Attempts that succeeded
    pub successes: u64,
    /// Attempts that failed or timed out
    pub failures: u64,
    /// Summed cost estimate
    pub cost: f64,
    /// Latency summary
    pub latency: LatencySummary,
}

impl UsageStats {
    /// Fraction of successful attempts, `0.0` when there were none
    pub fn success_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.successes as f64 / self.requests as f64
        }
    }
}

/// One row of a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    /// Provider identifier
    pub provider: String,
    /// Zone name
    pub zone: String,
    /// Counters
    pub stats: UsageStats,
}

/// Trailing-window aggregate keyed by (provider, zone)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Window covered
    pub window: Duration,
    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,
    /// Rows sorted by provider, then zone
    pub entries: Vec<MetricsEntry>,
}

impl MetricsSnapshot {
    /// Row for a key
    pub fn get(&self, provider: &str, zone: &str) -> Option<&UsageStats> {
        self.entries
            .iter()
            .find(|e| e.provider == provider && e.zone == zone)
            .map(|e| &e.stats)
    }

    /// Summed counters for one provider across zones
    pub fn provider_totals(&self, provider: &str) -> UsageStats {
        sum_counts(self.entries.iter().filter(|e| e.provider == provider))
    }

    /// Summed counters across all rows
    pub fn totals(&self) -> UsageStats {
        sum_counts(self.entries.iter())
    }
}

// Latency summaries do not add up across rows, so only counters are summed.
fn sum_counts<'a>(entries: impl Iterator<Item = &'a MetricsEntry>) -> UsageStats {
    entries.fold(UsageStats::default(), |mut acc, e| {
        acc.requests += e.stats.requests;
        acc.successes += e.stats.successes;
        acc.failures += e.stats.failures;
        acc.cost += e.stats.cost;
        acc.latency.count += e.stats.latency.count;
        acc
    })
}
