//! Zone scheduler
//!
//! One trigger task per zone. A trigger spawns a cycle into the shared
//! task tracker unless the zone is already busy, in which case the
//! trigger is skipped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Local, Utc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::value_objects::{AnalysisResult, ZoneConfig};

use super::runner::run_cycle;
use super::schedule::{next_fire, random_offset};
use crate::context::ServiceContext;
use crate::error_ext::ErrorContext;

struct ZoneTrigger {
    config: ZoneConfig,
    cancel: CancellationToken,
}

/// Owns the per-zone trigger tasks
pub struct ZoneScheduler {
    context: Arc<ServiceContext>,
    cancel: CancellationToken,
    tracker: TaskTracker,
    triggers_enabled: bool,
    triggers: Mutex<HashMap<String, ZoneTrigger>>,
}

impl ZoneScheduler {
    /// Scheduler whose tasks stop when `cancel` fires and are tracked by `tracker`.
    ///
    /// With `triggers_enabled` false only manual runs happen.
    pub fn new(
        context: Arc<ServiceContext>,
        cancel: CancellationToken,
        tracker: TaskTracker,
        triggers_enabled: bool,
    ) -> Self {
        Self {
            context,
            cancel,
            tracker,
            triggers_enabled,
            triggers: Mutex::new(HashMap::new()),
        }
    }

    /// Align trigger tasks with `zones`.
    ///
    /// Unchanged zones keep their task; changed and new zones get a fresh
    /// one; removed zones are stopped. In-flight cycles are never touched.
    pub fn reconcile(&self, zones: &[ZoneConfig]) {
        let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);

        triggers.retain(|name, trigger| {
            let keep = zones.iter().any(|z| *z == trigger.config);
            if !keep {
                trigger.cancel.cancel();
                debug!(zone = %name, "Zone trigger stopped");
            }
            keep
        });

        if self.triggers_enabled {
            for zone in zones {
                if triggers.contains_key(&zone.name) || zone.schedule.is_manual_only() {
                    continue;
                }
                let cancel = self.cancel.child_token();
                self.spawn_trigger(zone.clone(), cancel.clone());
                triggers.insert(
                    zone.name.clone(),
                    ZoneTrigger {
                        config: zone.clone(),
                        cancel,
                    },
                );
            }
        }
        self.context
            .in_flight()
            .retain_zones(zones.iter().map(|z| z.name.as_str()));
        info!(zones = zones.len(), triggers = triggers.len(), "Zone schedule reconciled");
    }

    /// `cancel` stops the trigger loop only; cycles it starts answer to
    /// the scheduler token, so reconciling a zone never aborts its cycle.
    fn spawn_trigger(&self, zone: ZoneConfig, cancel: CancellationToken) {
        let context = Arc::clone(&self.context);
        let tracker = self.tracker.clone();
        let cycle_cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            debug!(zone = %zone.name, "Zone trigger started");
            loop {
                let offset = random_offset(&zone.schedule);
                let Some(next) = next_fire(&zone.schedule, &Local::now(), offset) else {
                    break;
                };
                let wait = (next.with_timezone(&Utc) - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                debug!(zone = %zone.name, next = %next, "Next trigger scheduled");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(wait) => {}
                }
                fire(&context, &tracker, &cycle_cancel, &zone.name);
            }
            debug!(zone = %zone.name, "Zone trigger finished");
        });
    }

    /// Fire a trigger for `zone` now, as a scheduled trigger would.
    ///
    /// Returns false when the trigger was skipped because the zone is busy.
    pub fn trigger(&self, zone: &str) -> bool {
        fire(&self.context, &self.tracker, &self.cancel, zone)
    }

    /// Run an analysis for `zone` and wait for its result.
    ///
    /// Fails with `NotFound` for unknown zones and `ZoneBusy` when a cycle is
    /// already running; manual runs obey the same single-flight rule.
    pub async fn run_zone_analysis(&self, zone: &str) -> Result<AnalysisResult> {
        let config = self.context.config()?;
        if config.zone(zone).is_none() {
            return Err(Error::not_found(format!("zone {zone}")));
        }
        let guard = self
            .context
            .in_flight()
            .try_acquire(zone)
            .ok_or_else(|| Error::ZoneBusy {
                zone: zone.to_string(),
            })?;

        let context = Arc::clone(&self.context);
        let cancel = self.cancel.clone();
        let handle = self.tracker.spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => Err(Error::internal("analysis cancelled by shutdown")),
                result = run_cycle(&context, guard) => result,
            }
        });
        handle.await.context("analysis task failed")?
    }

    /// Zones with a running trigger task
    pub fn scheduled_zones(&self) -> Vec<String> {
        let triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut zones: Vec<String> = triggers.keys().cloned().collect();
        zones.sort();
        zones
    }

    /// Stop every trigger task; running cycles are left to the shutdown token
    pub fn stop(&self) {
        let mut triggers = self.triggers.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, trigger) in triggers.drain() {
            trigger.cancel.cancel();
        }
    }
}

fn fire(
    context: &Arc<ServiceContext>,
    tracker: &TaskTracker,
    cancel: &CancellationToken,
    zone: &str,
) -> bool {
    let Some(guard) = context.in_flight().try_acquire(zone) else {
        context.in_flight().record_skip(zone);
        return false;
    };
    let context = Arc::clone(context);
    let cancel = cancel.clone();
    tracker.spawn(async move {
        let zone = guard.zone().to_string();
        tokio::select! {
            () = cancel.cancelled() => debug!(zone = %zone, "Zone cycle cancelled"),
            result = run_cycle(&context, guard) => {
                if let Err(e) = result {
                    error!(zone = %zone, kind = %e.kind(), error = %e, "Zone cycle failed");
                }
            }
        }
    });
    true
}
