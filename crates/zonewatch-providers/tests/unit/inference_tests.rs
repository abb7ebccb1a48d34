//! Tests for inference provider construction

use zonewatch_domain::error::ErrorKind;
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{
    AnalysisRequest, CapturedFrame, CredentialRef, ProviderConfig, ProviderKind, ZoneConfig,
};
use zonewatch_providers::inference::{OpenAiVisionProvider, create_provider};

fn request() -> AnalysisRequest {
    let zone = ZoneConfig::new("kitchen", "camera.kitchen");
    AnalysisRequest::new(&zone, CapturedFrame::new(vec![0xFF, 0xD8], "image/jpeg"), 1)
}

#[test]
fn test_create_provider_for_each_kind() {
    let client = reqwest::Client::new();
    for (kind, name) in [
        (ProviderKind::OpenAi, "openai"),
        (ProviderKind::Ollama, "ollama"),
        (ProviderKind::Null, "null"),
    ] {
        let config = ProviderConfig::new("p", kind);
        let provider = create_provider(&config, client.clone()).expect("provider");
        assert_eq!(provider.provider_name(), name);
    }
}

#[tokio::test]
async fn test_null_provider_answers_without_tasks() {
    let config = ProviderConfig::new("fallback", ProviderKind::Null);
    let provider = create_provider(&config, reqwest::Client::new()).expect("provider");
    let output = provider.analyze(&request()).await.expect("output");
    assert!(output.tasks.is_empty());
}

#[tokio::test]
async fn test_openai_without_credential_is_authentication_error() {
    let provider = OpenAiVisionProvider::new(
        "primary".to_string(),
        None,
        None,
        None,
        reqwest::Client::new(),
    );
    let err = provider.analyze(&request()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_openai_with_unset_env_credential_fails_before_network() {
    let provider = OpenAiVisionProvider::new(
        "primary".to_string(),
        Some(CredentialRef::Env("ZONEWATCH_TEST_UNSET_KEY_FOR_PROVIDER".to_string())),
        Some("http://127.0.0.1:9".to_string()),
        None,
        reqwest::Client::new(),
    );
    let err = provider.analyze(&request()).await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}

#[test]
fn test_openai_defaults() {
    let provider = OpenAiVisionProvider::new(
        "p".to_string(),
        None,
        Some("https://gateway.example/v1/".to_string()),
        None,
        reqwest::Client::new(),
    );
    assert_eq!(provider.base_url(), "https://gateway.example/v1");
    assert_eq!(provider.model(), "gpt-4o-mini");
}
