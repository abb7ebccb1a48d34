use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::zone::ZoneConfig;
use crate::error::Error;

/// Raw image captured from a camera
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFrame {
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
    /// When the frame was taken
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    /// Frame captured now
    pub fn new<M: Into<String>>(data: Vec<u8>, mime_type: M) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            captured_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Zone context handed to the model alongside the frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInstructions {
    /// What the zone is for
    pub purpose: String,
    /// Things not to report
    pub ignore_rules: Vec<String>,
}

impl AnalysisInstructions {
    /// Prompt text shared by every backend
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "You are inspecting a camera image of an area whose purpose is: {}.\n\
             List concrete cleanup or maintenance tasks a person should do so the area \
             matches its purpose.",
            self.purpose
        );
        if !self.ignore_rules.is_empty() {
            prompt.push_str("\nDo not report anything matching these rules:");
            for rule in &self.ignore_rules {
                prompt.push_str("\n- ");
                prompt.push_str(rule);
            }
        }
        prompt.push_str(
            "\nRespond with JSON only: {\"summary\": \"<one sentence>\", \"tasks\": [\"<task>\", ...]}. \
             Use an empty list when nothing needs doing.",
        );
        prompt
    }
}

/// One frame on its way to a provider.
///
/// Created by the scheduler, consumed by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Request identifier
    pub id: Uuid,
    /// Zone the frame belongs to
    pub zone: String,
    /// Captured input
    pub frame: CapturedFrame,
    /// Prompt context
    pub instructions: AnalysisInstructions,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Per-zone attempt sequence number
    pub sequence: u64,
}

impl AnalysisRequest {
    /// Build a request for `zone`
    pub fn new(zone: &ZoneConfig, frame: CapturedFrame, sequence: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            zone: zone.name.clone(),
            frame,
            instructions: AnalysisInstructions {
                purpose: zone.purpose.clone(),
                ignore_rules: zone.ignore_rules.clone(),
            },
            created_at: Utc::now(),
            sequence,
        }
    }
}

/// What a provider produced for a request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InferenceOutput {
    /// One-line description of the scene
    pub summary: String,
    /// Tasks to add to the zone's task list
    pub tasks: Vec<String>,
}

/// How a single provider attempt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Provider answered
    Succeeded,
    /// Provider did not answer within its timeout
    TimedOut,
    /// Provider returned an error
    Failed(String),
    /// Skipped without a call because the circuit was open
    ShortCircuited,
}

impl AttemptOutcome {
    /// Outcome recorded for a provider call that ended in `error`
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::ProviderUnavailable { .. } => Self::ShortCircuited,
            Error::ProviderTimeout { .. } => Self::TimedOut,
            other => Self::Failed(other.to_string()),
        }
    }
}

/// One entry in the dispatch trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    /// Provider identifier
    pub provider: String,
    /// How it went
    pub outcome: AttemptOutcome,
    /// Time spent on the call (zero when short-circuited)
    pub latency: Duration,
}

/// Payload or error detail of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisDetail {
    /// A provider answered
    Completed {
        /// Parsed provider output
        output: InferenceOutput,
        /// Every attempt, the successful one last
        attempts: Vec<ProviderAttempt>,
    },
    /// No provider answered
    Exhausted {
        /// Always [`crate::constants::PROVIDERS_EXHAUSTED_MARKER`]
        marker: String,
        /// Every candidate, in order
        attempts: Vec<ProviderAttempt>,
    },
}

/// Outcome of a dispatch cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Request this result answers
    pub request_id: Uuid,
    /// Zone name
    pub zone: String,
    /// Provider that produced the output, `None` when exhausted
    pub provider_id: Option<String>,
    /// Whether any provider succeeded
    pub success: bool,
    /// Total time spent across attempts
    pub latency: Duration,
    /// Summed cost estimate across attempts
    pub cost_estimate: f64,
    /// Output or failure detail
    pub detail: AnalysisDetail,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// True when every candidate failed or was skipped
    pub fn is_exhausted(&self) -> bool {
        matches!(self.detail, AnalysisDetail::Exhausted { .. })
    }

    /// Parsed output, if any provider answered
    pub fn output(&self) -> Option<&InferenceOutput> {
        match &self.detail {
            AnalysisDetail::Completed { output, .. } => Some(output),
            AnalysisDetail::Exhausted { .. } => None,
        }
    }

    /// Terminal error of an exhausted dispatch, naming every candidate
    pub fn error(&self) -> Option<Error> {
        match &self.detail {
            AnalysisDetail::Completed { .. } => None,
            AnalysisDetail::Exhausted { attempts, .. } => Some(Error::providers_exhausted(
                attempts.iter().map(|a| a.provider.as_str()),
            )),
        }
    }

    /// Dispatch trail
    pub fn attempts(&self) -> &[ProviderAttempt] {
        match &self.detail {
            AnalysisDetail::Completed { attempts, .. } | AnalysisDetail::Exhausted { attempts, .. } => {
                attempts
            }
        }
    }
}
