//! Inference Provider Port
//!
//! One call, one answer. Timeouts and retries belong to the dispatcher,
//! so implementations must not retry internally.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{AnalysisRequest, InferenceOutput};

/// AI backend that analyzes a captured frame
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Analyze the frame in `request` and return parsed tasks
    async fn analyze(&self, request: &AnalysisRequest) -> Result<InferenceOutput>;

    /// Backend name for logging
    fn provider_name(&self) -> &str;
}
