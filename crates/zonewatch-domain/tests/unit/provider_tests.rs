//! Unit tests for provider value objects

use std::time::Duration;

use zonewatch_domain::error::ErrorKind;
use zonewatch_domain::value_objects::{CredentialRef, ProviderConfig, ProviderKind};

#[test]
fn test_provider_kind_parsing() {
    assert_eq!("openai".parse::<ProviderKind>().ok(), Some(ProviderKind::OpenAi));
    assert_eq!(" Ollama ".parse::<ProviderKind>().ok(), Some(ProviderKind::Ollama));
    assert_eq!("mock".parse::<ProviderKind>().ok(), Some(ProviderKind::Null));

    let err = "gpt-9000".parse::<ProviderKind>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigValidation);
}

#[test]
fn test_provider_defaults() {
    let provider = ProviderConfig::new("primary", ProviderKind::OpenAi);
    assert!(provider.enabled);
    assert_eq!(provider.priority, 100);
    assert_eq!(provider.timeout(), Duration::from_secs(30));
}

#[test]
fn test_provider_builders() {
    let provider = ProviderConfig::new("p", ProviderKind::Null)
        .with_priority(1)
        .with_timeout(Duration::from_millis(250))
        .with_cost(0.01)
        .with_enabled(false);
    assert_eq!(provider.priority, 1);
    assert_eq!(provider.timeout(), Duration::from_millis(250));
    assert!((provider.cost_per_request - 0.01).abs() < f64::EPSILON);
    assert!(!provider.enabled);
}

#[test]
fn test_credential_reference_parsing() {
    assert_eq!(
        CredentialRef::parse("env:OPENAI_API_KEY"),
        CredentialRef::Env("OPENAI_API_KEY".to_string())
    );
    assert_eq!(
        CredentialRef::parse("sk-inline"),
        CredentialRef::Literal("sk-inline".to_string())
    );
}

#[test]
fn test_missing_env_credential_is_authentication_error() {
    let reference = CredentialRef::Env("ZONEWATCH_TEST_SURELY_UNSET_VARIABLE".to_string());
    let err = reference.resolve().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_literal_credential_is_not_printed() {
    let reference = CredentialRef::Literal("sk-secret".to_string());
    assert_eq!(reference.resolve().ok().as_deref(), Some("sk-secret"));
    assert!(!format!("{reference:?}").contains("sk-secret"));
}
