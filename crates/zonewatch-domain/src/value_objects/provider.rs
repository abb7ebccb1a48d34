use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CREDENTIAL_ENV_PREFIX, DEFAULT_PROVIDER_COST, DEFAULT_PROVIDER_PRIORITY,
    DEFAULT_PROVIDER_TIMEOUT_SECS,
};
use crate::error::{Error, Result};

/// Inference backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions with image input
    #[default]
    OpenAi,
    /// Ollama `/api/generate` with base64 images
    Ollama,
    /// Always succeeds with an empty result
    Null,
}

impl ProviderKind {
    /// Configuration name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "openai-compatible" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "null" | "none" | "mock" => Ok(Self::Null),
            other => Err(Error::config_validation(format!(
                "unknown provider kind '{other}'"
            ))),
        }
    }
}

/// Where a provider credential comes from
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum CredentialRef {
    /// Read from the named environment variable at call time
    Env(String),
    /// Inline secret
    Literal(String),
}

impl CredentialRef {
    /// Parse a reference: `env:NAME` names a variable, anything else is literal
    pub fn parse(reference: &str) -> Self {
        match reference.strip_prefix(CREDENTIAL_ENV_PREFIX) {
            Some(var) => Self::Env(var.trim().to_string()),
            None => Self::Literal(reference.to_string()),
        }
    }

    /// Resolve the secret value
    pub fn resolve(&self) -> Result<String> {
        match self {
            Self::Env(var) => match std::env::var(var) {
                Ok(value) if !value.is_empty() => Ok(value),
                _ => Err(Error::authentication(format!(
                    "credential environment variable {var} is not set"
                ))),
            },
            Self::Literal(value) if value.is_empty() => {
                Err(Error::authentication("credential is empty"))
            }
            Self::Literal(value) => Ok(value.clone()),
        }
    }
}

impl fmt::Debug for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
            Self::Literal(_) => f.write_str("Literal(***)"),
        }
    }
}

/// One inference backend as described by the merged configuration.
///
/// Replaced wholesale on reload, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider identifier
    pub id: String,
    /// Backend family
    pub kind: ProviderKind,
    /// Model name passed to the backend
    pub model: Option<String>,
    /// Endpoint override
    pub base_url: Option<String>,
    /// Credential reference
    pub credential: Option<CredentialRef>,
    /// Lower is tried first
    pub priority: i64,
    /// Disabled providers are never candidates
    pub enabled: bool,
    /// Estimated cost of one request
    pub cost_per_request: f64,
    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

impl ProviderConfig {
    /// Provider with defaults for everything but id and kind
    pub fn new<S: Into<String>>(id: S, kind: ProviderKind) -> Self {
        Self {
            id: id.into(),
            kind,
            model: None,
            base_url: None,
            credential: None,
            priority: DEFAULT_PROVIDER_PRIORITY,
            enabled: true,
            cost_per_request: DEFAULT_PROVIDER_COST,
            timeout_ms: DEFAULT_PROVIDER_TIMEOUT_SECS * 1000,
        }
    }

    /// Set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    /// Set the cost estimate
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost_per_request = cost;
        self
    }

    /// Set the enabled flag
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
