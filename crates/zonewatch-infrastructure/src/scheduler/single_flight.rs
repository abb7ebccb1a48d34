//! Per-zone single-flight guard
//!
//! A zone holds at most one analysis at a time. A trigger that finds the
//! zone busy is skipped and counted; it is never queued.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use metrics::counter;
use tracing::warn;

use crate::constants::METRIC_ZONE_TRIGGERS_SKIPPED;

#[derive(Debug, Default)]
struct ZoneSlot {
    busy: AtomicBool,
    sequence: AtomicU64,
    skipped: AtomicU64,
}

/// Proof that a zone's slot is held; releases it on drop
#[derive(Debug)]
pub struct InFlightGuard {
    slot: Arc<ZoneSlot>,
    zone: String,
    sequence: u64,
}

impl InFlightGuard {
    /// Zone this guard holds
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Attempt sequence number assigned on acquisition (starts at 1)
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}

/// Registry of zone slots
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    slots: DashMap<String, Arc<ZoneSlot>>,
}

impl InFlightRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, zone: &str) -> Arc<ZoneSlot> {
        if let Some(slot) = self.slots.get(zone) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(zone.to_string()).or_default().value())
    }

    /// Claim the zone, or `None` when an analysis is already running
    pub fn try_acquire(&self, zone: &str) -> Option<InFlightGuard> {
        let slot = self.slot(zone);
        slot.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let sequence = slot.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Some(InFlightGuard {
            slot,
            zone: zone.to_string(),
            sequence,
        })
    }

    /// Count and log a trigger that found the zone busy
    pub fn record_skip(&self, zone: &str) -> u64 {
        let skipped = self.slot(zone).skipped.fetch_add(1, Ordering::Relaxed) + 1;
        counter!(METRIC_ZONE_TRIGGERS_SKIPPED, "zone" => zone.to_string()).increment(1);
        warn!(zone = %zone, skipped, "Previous analysis still running, trigger skipped");
        skipped
    }

    /// Whether `zone` has an analysis in flight
    pub fn is_busy(&self, zone: &str) -> bool {
        self.slots
            .get(zone)
            .is_some_and(|slot| slot.busy.load(Ordering::Acquire))
    }

    /// Skipped triggers for `zone`
    pub fn skipped(&self, zone: &str) -> u64 {
        self.slots
            .get(zone)
            .map_or(0, |slot| slot.skipped.load(Ordering::Relaxed))
    }

    /// Skipped triggers for every known zone
    pub fn skipped_counts(&self) -> BTreeMap<String, u64> {
        self.slots
            .iter()
            .map(|slot| (slot.key().clone(), slot.skipped.load(Ordering::Relaxed)))
            .collect()
    }

    /// Number of zones currently running an analysis
    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.busy.load(Ordering::Acquire))
            .count()
    }

    /// Forget zones no longer configured, keeping busy slots until released
    pub fn retain_zones<'a, I>(&self, zones: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: std::collections::HashSet<&str> = zones.into_iter().collect();
        self.slots
            .retain(|zone, slot| keep.contains(zone.as_str()) || slot.busy.load(Ordering::Acquire));
    }
}
