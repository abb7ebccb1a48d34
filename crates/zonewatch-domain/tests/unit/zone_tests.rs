//! Unit tests for zone and analysis value objects

use std::time::Duration;

use chrono::NaiveTime;
use zonewatch_domain::value_objects::{
    AnalysisRequest, CapturedFrame, ScheduleSpec, ValidationWarning, WarningScope, ZoneConfig,
};

#[test]
fn test_schedule_interval_and_offset() {
    let schedule = ScheduleSpec {
        interval_minutes: 15,
        specific_times: Vec::new(),
        random_offset_minutes: 2,
    };
    assert_eq!(schedule.interval(), Some(Duration::from_secs(900)));
    assert_eq!(schedule.random_offset(), Duration::from_secs(120));
    assert!(!schedule.is_manual_only());
}

#[test]
fn test_zero_interval_without_times_is_manual_only() {
    let schedule = ScheduleSpec::default();
    assert_eq!(schedule.interval(), None);
    assert!(schedule.is_manual_only());

    let timed = ScheduleSpec {
        specific_times: vec![NaiveTime::from_hms_opt(8, 0, 0).unwrap()],
        ..ScheduleSpec::default()
    };
    assert!(!timed.is_manual_only());
}

#[test]
fn test_request_carries_zone_instructions() {
    let zone = ZoneConfig::new("kitchen", "camera.kitchen").with_ignore_rules(["trash"]);
    let request = AnalysisRequest::new(&zone, CapturedFrame::new(vec![1, 2, 3], "image/jpeg"), 7);

    assert_eq!(request.zone, "kitchen");
    assert_eq!(request.sequence, 7);
    assert_eq!(request.instructions.ignore_rules, vec!["trash".to_string()]);

    let prompt = request.instructions.prompt();
    assert!(prompt.contains(&zone.purpose));
    assert!(prompt.contains("- trash"));
}

#[test]
fn test_prompt_without_rules_has_no_rule_section() {
    let zone = ZoneConfig::new("garage", "camera.garage");
    let request = AnalysisRequest::new(&zone, CapturedFrame::new(Vec::new(), "image/jpeg"), 1);
    assert!(!request.instructions.prompt().contains("Do not report"));
}

#[test]
fn test_frame_debug_hides_bytes() {
    let frame = CapturedFrame::new(vec![0xFF; 4096], "image/jpeg");
    let debug = format!("{frame:?}");
    assert!(debug.contains("4096"));
    assert!(!debug.contains("255"));
}

#[test]
fn test_warning_display() {
    let warning =
        ValidationWarning::field(WarningScope::Zone, "kitchen", "interval_minutes", "not a number");
    assert_eq!(
        warning.to_string(),
        "zone 'kitchen' field 'interval_minutes': not a number"
    );
    assert_eq!(
        ValidationWarning::options("zones must be a list").to_string(),
        "options: zones must be a list"
    );
}
