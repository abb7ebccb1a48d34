//! Domain Value Objects
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ProviderConfig`] | One inference backend and how to reach it |
//! | [`ZoneConfig`] | A monitored area with its schedule and rules |
//! | [`AnalysisRequest`] | A captured frame on its way to a provider |
//! | [`AnalysisResult`] | What came back, or why nothing did |
//! | [`MetricsSnapshot`] | Windowed usage per (provider, zone) |
//! | [`ProviderStatus`] | Breaker view of a provider |
//! | [`ValidationWarning`] | Non-fatal problem found in option data |

/// Analysis request and result types
pub mod analysis;
/// Usage metrics types
pub mod metrics;
/// Provider configuration types
pub mod provider;
/// Provider health status types
pub mod status;
/// Validation warning types
pub mod warning;
/// Zone configuration types
pub mod zone;

pub use analysis::{
    AnalysisDetail, AnalysisInstructions, AnalysisRequest, AnalysisResult, AttemptOutcome,
    CapturedFrame, InferenceOutput, ProviderAttempt,
};
pub use metrics::{LatencySummary, MetricsEntry, MetricsKey, MetricsSnapshot, UsageStats};
pub use provider::{CredentialRef, ProviderConfig, ProviderKind};
pub use status::{CircuitState, ProviderStatus};
pub use warning::{ValidationWarning, WarningScope};
pub use zone::{ScheduleSpec, ZoneConfig};
