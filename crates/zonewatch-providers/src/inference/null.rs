//! Null Inference Provider
//!
//! Answers every request with an empty task list. Useful as a last-resort
//! provider and in tests.

use async_trait::async_trait;
use zonewatch_domain::error::Result;
use zonewatch_domain::ports::InferenceProvider;
use zonewatch_domain::value_objects::{AnalysisRequest, InferenceOutput};

/// Provider that never calls out
#[derive(Debug, Clone)]
pub struct NullInferenceProvider {
    id: String,
}

impl NullInferenceProvider {
    /// Create a null provider with the given identifier
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    /// Provider identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[async_trait]
impl InferenceProvider for NullInferenceProvider {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<InferenceOutput> {
        Ok(InferenceOutput {
            summary: "no analysis performed".to_string(),
            tasks: Vec::new(),
        })
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
