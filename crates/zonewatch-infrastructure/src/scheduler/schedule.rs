//! Trigger time computation
//!
//! Pure functions over a [`ScheduleSpec`]: the earliest of the next
//! interval tick and the next listed wall-clock time, pushed back by a
//! random offset.

use std::time::Duration;

use chrono::{DateTime, Days, TimeDelta, TimeZone};
use rand::Rng;
use zonewatch_domain::value_objects::ScheduleSpec;

// A listed time that falls in a DST gap on two consecutive days is not
// going to appear on the third.
const SPECIFIC_TIME_LOOKAHEAD_DAYS: u64 = 3;

/// Next trigger strictly after `now`, or `None` for manual-only zones
pub fn next_fire<Tz: TimeZone>(
    schedule: &ScheduleSpec,
    now: &DateTime<Tz>,
    offset: Duration,
) -> Option<DateTime<Tz>> {
    let by_interval = schedule
        .interval()
        .and_then(|interval| TimeDelta::from_std(interval).ok())
        .and_then(|delta| now.clone().checked_add_signed(delta));
    let by_time = next_specific_time(schedule, now);

    let base = match (by_interval, by_time) {
        (Some(a), Some(b)) => Some(if b < a { b } else { a }),
        (a, b) => a.or(b),
    }?;
    let offset = TimeDelta::from_std(offset).unwrap_or(TimeDelta::zero());
    base.checked_add_signed(offset)
}

/// Next occurrence of any listed time strictly after `now`
pub fn next_specific_time<Tz: TimeZone>(
    schedule: &ScheduleSpec,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let timezone = now.timezone();
    let today = now.date_naive();

    (0..SPECIFIC_TIME_LOOKAHEAD_DAYS)
        .filter_map(|days| today.checked_add_days(Days::new(days)))
        .flat_map(|date| schedule.specific_times.iter().map(move |t| date.and_time(*t)))
        .filter_map(|naive| timezone.from_local_datetime(&naive).earliest())
        .filter(|candidate| candidate > now)
        .min()
}

/// Uniform random offset in `[0, random_offset_minutes]` at second resolution
pub fn random_offset(schedule: &ScheduleSpec) -> Duration {
    let max_secs = schedule.random_offset().as_secs();
    if max_secs == 0 {
        return Duration::ZERO;
    }
    Duration::from_secs(rand::rng().random_range(0..=max_secs))
}
