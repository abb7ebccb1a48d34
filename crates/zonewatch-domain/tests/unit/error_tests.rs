//! Unit tests for error classification and status mapping

use std::time::Duration;

use zonewatch_domain::error::{Error, ErrorKind};
use zonewatch_domain::value_objects::AttemptOutcome;

#[test]
fn test_authentication_maps_to_401() {
    let err = Error::authentication("missing api key");
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_malformed_config_maps_to_400() {
    assert_eq!(Error::config_validation("zones must be a list").status_code(), 400);
    assert_eq!(Error::configuration("bad toml").status_code(), 400);
}

#[test]
fn test_switch_failure_and_busy_zone_map_to_409() {
    assert_eq!(
        Error::provider_switch("backup", "circuit open").status_code(),
        409
    );
    assert_eq!(
        Error::ZoneBusy {
            zone: "kitchen".to_string()
        }
        .status_code(),
        409
    );
}

#[test]
fn test_unclassified_failures_map_to_500() {
    assert_eq!(Error::internal("boom").status_code(), 500);
    assert_eq!(
        Error::provider_timeout("primary", Duration::from_secs(5)).status_code(),
        500
    );
    assert_eq!(
        Error::AllProvidersExhausted {
            attempted: vec!["a".to_string()]
        }
        .status_code(),
        500
    );
}

#[test]
fn test_merge_not_ready_is_its_own_kind() {
    let err = Error::MergeNotReady;
    assert_eq!(err.kind(), ErrorKind::MergeNotReady);
    assert_eq!(err.status_code(), 503);
}

#[test]
fn test_provider_failures_count_against_breaker() {
    assert!(Error::provider("p", "500 from upstream").is_provider_failure());
    assert!(Error::provider_timeout("p", Duration::from_millis(10)).is_provider_failure());
    assert!(Error::authentication("rejected").is_provider_failure());
    assert!(
        !Error::ProviderUnavailable {
            provider: "p".to_string()
        }
        .is_provider_failure()
    );
}

#[test]
fn test_classify_free_form_messages() {
    assert_eq!(
        ErrorKind::classify("HTTP 401 Unauthorized"),
        ErrorKind::Authentication
    );
    assert_eq!(
        ErrorKind::classify("malformed options document"),
        ErrorKind::ConfigValidation
    );
    assert_eq!(
        ErrorKind::classify("operation timed out"),
        ErrorKind::ProviderTimeout
    );
    assert_eq!(
        ErrorKind::classify("something odd happened"),
        ErrorKind::Internal
    );
}

#[test]
fn test_from_unclassified_keeps_domain_errors() {
    let original = Error::provider_switch("backup", "disabled");
    let converted = Error::from_unclassified(&original);
    assert_eq!(converted.kind(), ErrorKind::Conflict);
    assert_eq!(converted.to_string(), original.to_string());
}

#[test]
fn test_from_unclassified_classifies_foreign_errors() {
    let io = std::io::Error::other("credential file unreadable");
    assert_eq!(
        Error::from_unclassified(&io).kind(),
        ErrorKind::Authentication
    );

    let io = std::io::Error::other("disk on fire");
    assert_eq!(Error::from_unclassified(&io).kind(), ErrorKind::Internal);
}

#[test]
fn test_exhausted_message_lists_providers() {
    let err = Error::AllProvidersExhausted {
        attempted: vec!["primary".to_string(), "secondary".to_string()],
    };
    assert!(err.to_string().contains("primary, secondary"));
}

#[test]
fn test_attempt_outcome_follows_error_kind() {
    assert_eq!(
        AttemptOutcome::from_error(&Error::provider_unavailable("primary")),
        AttemptOutcome::ShortCircuited
    );
    assert_eq!(
        AttemptOutcome::from_error(&Error::provider_timeout("primary", Duration::from_secs(2))),
        AttemptOutcome::TimedOut
    );
    assert_eq!(
        AttemptOutcome::from_error(&Error::provider("primary", "HTTP 502")),
        AttemptOutcome::Failed("Provider primary error: HTTP 502".to_string())
    );
}

#[test]
fn test_exhausted_error_lists_candidates() {
    let err = Error::providers_exhausted(["primary", "secondary"]);
    assert_eq!(err.kind(), ErrorKind::AllProvidersExhausted);
    assert_eq!(
        err.to_string(),
        "All providers exhausted (attempted: primary, secondary)"
    );
}
