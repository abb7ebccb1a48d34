//! OpenAI Vision Provider
//!
//! Implements the InferenceProvider port against any OpenAI-compatible
//! `/chat/completions` endpoint that accepts `image_url` content parts.

use async_trait::async_trait;
use reqwest::Client;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{AnalysisRequest, CredentialRef, InferenceOutput};

use crate::constants::{
    CONTENT_TYPE_JSON, INFERENCE_MAX_TOKENS, OPENAI_DEFAULT_BASE_URL, OPENAI_DEFAULT_MODEL,
};
use crate::inference::helpers::{constructor, frame_data_url, parse_model_output};
use crate::utils::HttpResponseUtils;

/// OpenAI-compatible vision provider
///
/// The credential is resolved on every call, so a rotated environment
/// variable takes effect without a reload.
pub struct OpenAiVisionProvider {
    id: String,
    credential: Option<CredentialRef>,
    base_url: String,
    model: String,
    http_client: Client,
}

impl OpenAiVisionProvider {
    /// Create a new OpenAI vision provider
    ///
    /// # Arguments
    /// * `id` - Provider identifier used in errors and logs
    /// * `credential` - API key reference
    /// * `base_url` - Optional custom base URL (defaults to OpenAI API)
    /// * `model` - Optional model name
    /// * `http_client` - Shared reqwest client
    pub fn new(
        id: String,
        credential: Option<CredentialRef>,
        base_url: Option<String>,
        model: Option<String>,
        http_client: Client,
    ) -> Self {
        Self {
            id,
            credential,
            base_url: constructor::effective_url(base_url.as_deref(), OPENAI_DEFAULT_BASE_URL),
            model: constructor::effective_model(model.as_deref(), OPENAI_DEFAULT_MODEL),
            http_client,
        }
    }

    /// Get the base URL for this provider
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_payload(&self, request: &AnalysisRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": INFERENCE_MAX_TOKENS,
            "response_format": { "type": "json_object" },
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.instructions.prompt() },
                    { "type": "image_url", "image_url": { "url": frame_data_url(&request.frame) } }
                ]
            }]
        })
    }
}

impl std::fmt::Debug for OpenAiVisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiVisionProvider")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl InferenceProvider for OpenAiVisionProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<InferenceOutput> {
        let api_key = match &self.credential {
            Some(credential) => credential.resolve()?,
            None => {
                return Err(Error::authentication(format!(
                    "provider {} has no credential configured",
                    self.id
                )));
            }
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .json(&self.build_payload(request))
            .send()
            .await
            .map_err(|e| HttpResponseUtils::transport_error(&self.id, e))?;

        let body = HttpResponseUtils::check_and_parse(response, &self.id).await?;

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| Error::provider(&self.id, "response has no message content"))?;

        parse_model_output(&self.id, content)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
