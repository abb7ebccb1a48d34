use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally visible breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Requests flow normally
    Closed,
    /// Requests are short-circuited
    Open,
    /// One trial request is allowed
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Provider health as reported by `provider_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    /// Provider identifier
    pub provider: String,
    /// Configured enabled flag
    pub enabled: bool,
    /// Configured priority
    pub priority: i64,
    /// Current breaker state
    pub circuit_state: CircuitState,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Most recent failure
    pub last_failure: Option<DateTime<Utc>>,
    /// When an open circuit becomes eligible for a trial
    pub open_until: Option<DateTime<Utc>>,
    /// Current cooldown in seconds
    pub cooldown_secs: f64,
    /// Latency of the most recent recorded call in milliseconds
    pub last_latency_ms: Option<f64>,
    /// Whether this provider was chosen through `switch_provider`
    pub preferred: bool,
}
