//! Ollama Vision Provider
//!
//! Implements the InferenceProvider port using Ollama's `/api/generate`
//! endpoint with base64 images and JSON output mode.

use async_trait::async_trait;
use reqwest::Client;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{AnalysisRequest, InferenceOutput};

use crate::constants::{CONTENT_TYPE_JSON, OLLAMA_DEFAULT_BASE_URL, OLLAMA_DEFAULT_MODEL};
use crate::inference::helpers::{constructor, encode_frame, parse_model_output};
use crate::utils::HttpResponseUtils;

/// Ollama vision provider
#[derive(Debug)]
pub struct OllamaVisionProvider {
    id: String,
    base_url: String,
    model: String,
    http_client: Client,
}

impl OllamaVisionProvider {
    /// Create a new Ollama vision provider
    ///
    /// # Arguments
    /// * `id` - Provider identifier used in errors and logs
    /// * `base_url` - Ollama server URL (defaults to `http://localhost:11434`)
    /// * `model` - Optional model name (defaults to `llava`)
    /// * `http_client` - Shared reqwest client
    pub fn new(id: String, base_url: Option<String>, model: Option<String>, http_client: Client) -> Self {
        Self {
            id,
            base_url: constructor::effective_url(base_url.as_deref(), OLLAMA_DEFAULT_BASE_URL),
            model: constructor::effective_model(model.as_deref(), OLLAMA_DEFAULT_MODEL),
            http_client,
        }
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceProvider for OllamaVisionProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<InferenceOutput> {
        let payload = serde_json::json!({
            "model": self.model,
            "prompt": request.instructions.prompt(),
            "images": [encode_frame(&request.frame)],
            "format": "json",
            "stream": false
        });

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .header("Content-Type", CONTENT_TYPE_JSON)
            .json(&payload)
            .send()
            .await
            .map_err(|e| HttpResponseUtils::transport_error(&self.id, e))?;

        let body = HttpResponseUtils::check_and_parse(response, &self.id).await?;

        let text = body["response"]
            .as_str()
            .ok_or_else(|| Error::provider(&self.id, "response field missing"))?;

        parse_model_output(&self.id, text)
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}
