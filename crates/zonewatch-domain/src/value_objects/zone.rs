use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// When a zone's analysis fires.
///
/// Interval and specific times may both be set; the earliest upcoming one
/// wins. The random offset is added on top of whichever fires.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleSpec {
    /// Fixed interval, `0` disables interval triggering
    pub interval_minutes: u64,
    /// Wall-clock times of day
    pub specific_times: Vec<NaiveTime>,
    /// Upper bound of the random delay added to each trigger
    pub random_offset_minutes: u64,
}

impl ScheduleSpec {
    /// Fixed interval, if enabled
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_minutes > 0).then(|| Duration::from_secs(self.interval_minutes * 60))
    }

    /// Upper bound of the random offset
    pub fn random_offset(&self) -> Duration {
        Duration::from_secs(self.random_offset_minutes * 60)
    }

    /// True when only manual triggers can run the zone
    pub fn is_manual_only(&self) -> bool {
        self.interval_minutes == 0 && self.specific_times.is_empty()
    }
}

/// A monitored zone.
///
/// `name` is the unique key in the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Unique zone name
    pub name: String,
    /// Camera the frame is captured from
    pub camera_entity: String,
    /// Task list results are written to
    pub todo_list_entity: Option<String>,
    /// What the zone is for, fed to the prompt
    pub purpose: String,
    /// Trigger schedule
    pub schedule: ScheduleSpec,
    /// Things the model must not report, in order
    pub ignore_rules: Vec<String>,
}

impl ZoneConfig {
    /// Zone with an empty schedule and no rules
    pub fn new<N: Into<String>, C: Into<String>>(name: N, camera_entity: C) -> Self {
        Self {
            name: name.into(),
            camera_entity: camera_entity.into(),
            todo_list_entity: None,
            purpose: crate::constants::DEFAULT_ZONE_PURPOSE.to_string(),
            schedule: ScheduleSpec::default(),
            ignore_rules: Vec::new(),
        }
    }

    /// Set the schedule
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleSpec) -> Self {
        self.schedule = schedule;
        self
    }

    /// Set the ignore rules
    #[must_use]
    pub fn with_ignore_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_rules = rules.into_iter().map(Into::into).collect();
        self
    }
}
