//! Inference Provider Implementations
//!
//! | Provider | Kind | Description |
//! |----------|------|-------------|
//! | [`OpenAiVisionProvider`] | `openai` | OpenAI-compatible chat completions |
//! | [`OllamaVisionProvider`] | `ollama` | Local Ollama server |
//! | [`NullInferenceProvider`] | `null` | Always answers, never finds anything |
//!
//! [`create_provider`] builds the right implementation from a
//! [`ProviderConfig`](zonewatch_domain::value_objects::ProviderConfig).

pub mod helpers;
pub mod null;
pub mod ollama;
pub mod openai;

use std::sync::Arc;

use reqwest::Client;
use zonewatch_domain::error::Result;
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{ProviderConfig, ProviderKind};

pub use null::NullInferenceProvider;
pub use ollama::OllamaVisionProvider;
pub use openai::OpenAiVisionProvider;

/// Build the inference provider described by `config`
pub fn create_provider(config: &ProviderConfig, client: Client) -> Result<Arc<dyn InferenceProvider>> {
    let provider: Arc<dyn InferenceProvider> = match config.kind {
        ProviderKind::OpenAi => Arc::new(OpenAiVisionProvider::new(
            config.id.clone(),
            config.credential.clone(),
            config.base_url.clone(),
            config.model.clone(),
            client,
        )),
        ProviderKind::Ollama => Arc::new(OllamaVisionProvider::new(
            config.id.clone(),
            config.base_url.clone(),
            config.model.clone(),
            client,
        )),
        ProviderKind::Null => Arc::new(NullInferenceProvider::new(config.id.clone())),
    };
    Ok(provider)
}
