//! Error handling types
//!
//! | Variant | Kind | HTTP status |
//! |---------|------|-------------|
//! | `Authentication` | `Authentication` | 401 |
//! | `ConfigValidation`, `Configuration` | `ConfigValidation` | 400 |
//! | `NotFound` | `NotFound` | 404 |
//! | `ProviderSwitch`, `ZoneBusy` | `Conflict` | 409 |
//! | `MergeNotReady` | `MergeNotReady` | 503 |
//! | everything else | see [`Error::kind`] | 500 |

use std::fmt;

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zonewatch
#[derive(Error, Debug)]
pub enum Error {
    /// External option data failed validation
    #[error("Configuration validation error: {message}")]
    ConfigValidation {
        /// What was wrong with the data
        message: String,
    },

    /// Configuration could not be loaded or is malformed
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The merge engine has not received its base configuration yet
    #[error("Merge engine is not ready: no base configuration has been installed")]
    MergeNotReady,

    /// Provider skipped because its circuit is open
    #[error("Provider {provider} is unavailable: circuit open")]
    ProviderUnavailable {
        /// Provider identifier
        provider: String,
    },

    /// Provider call exceeded its configured timeout
    #[error("Provider {provider} timed out after {timeout_ms}ms")]
    ProviderTimeout {
        /// Provider identifier
        provider: String,
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// Provider reported an error
    #[error("Provider {provider} error: {message}")]
    Provider {
        /// Provider identifier
        provider: String,
        /// Description of the provider error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Every candidate provider failed or was short-circuited
    #[error("All providers exhausted (attempted: {})", .attempted.join(", "))]
    AllProvidersExhausted {
        /// Providers that were tried or skipped, in order
        attempted: Vec<String>,
    },

    /// Message bus connection failure
    #[error("Message bus connection error: {message}")]
    BusConnection {
        /// Description of the bus error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credentials missing or rejected
    #[error("Authentication error: {message}")]
    Authentication {
        /// Description of the authentication error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider switch request could not be honored
    #[error("Cannot switch to provider {provider}: {reason}")]
    ProviderSwitch {
        /// Requested provider
        provider: String,
        /// Why the switch was refused
        reason: String,
    },

    /// Zone already has an analysis in flight
    #[error("Zone {zone} already has an analysis in flight")]
    ZoneBusy {
        /// Zone name
        zone: String,
    },

    /// Camera frame could not be captured
    #[error("Frame capture failed for {camera}: {message}")]
    FrameCapture {
        /// Camera entity reference
        camera: String,
        /// Description of the capture failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

/// Coarse classification used for status mapping and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed configuration or option data
    ConfigValidation,
    /// Merge engine not initialized
    MergeNotReady,
    /// Circuit open
    ProviderUnavailable,
    /// Provider call timed out
    ProviderTimeout,
    /// Provider call failed
    ProviderError,
    /// No provider produced a result
    AllProvidersExhausted,
    /// Message bus failure
    BusConnection,
    /// Credentials missing or rejected
    Authentication,
    /// Request conflicts with current state
    Conflict,
    /// Resource missing
    NotFound,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// HTTP status code reported to the boundary layer
    pub fn status_code(self) -> u16 {
        match self {
            Self::Authentication => 401,
            Self::ConfigValidation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::MergeNotReady => 503,
            Self::ProviderUnavailable
            | Self::ProviderTimeout
            | Self::ProviderError
            | Self::AllProvidersExhausted
            | Self::BusConnection
            | Self::Internal => 500,
        }
    }

    /// Stable lowercase label, used as a metrics/log field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigValidation => "config_validation",
            Self::MergeNotReady => "merge_not_ready",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ProviderTimeout => "provider_timeout",
            Self::ProviderError => "provider_error",
            Self::AllProvidersExhausted => "providers_exhausted",
            Self::BusConnection => "bus_connection",
            Self::Authentication => "authentication",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }

    /// Classify free-form error text.
    ///
    /// Used by catch-all handlers before they fall back to `Internal`.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["unauthorized", "forbidden", "api key", "apikey", "credential", "401"]) {
            Self::Authentication
        } else if has(&["not ready"]) {
            Self::MergeNotReady
        } else if has(&["invalid config", "malformed", "configuration", "validation"]) {
            Self::ConfigValidation
        } else if has(&["timed out", "timeout"]) {
            Self::ProviderTimeout
        } else if has(&["exhausted"]) {
            Self::AllProvidersExhausted
        } else if has(&["connection refused", "disconnected", "broken pipe"]) {
            Self::BusConnection
        } else if has(&["not found"]) {
            Self::NotFound
        } else {
            Self::Internal
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigValidation { .. } | Self::Configuration { .. } | Self::Json { .. } => {
                ErrorKind::ConfigValidation
            }
            Self::MergeNotReady => ErrorKind::MergeNotReady,
            Self::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            Self::ProviderTimeout { .. } => ErrorKind::ProviderTimeout,
            Self::Provider { .. } => ErrorKind::ProviderError,
            Self::AllProvidersExhausted { .. } => ErrorKind::AllProvidersExhausted,
            Self::BusConnection { .. } => ErrorKind::BusConnection,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::ProviderSwitch { .. } | Self::ZoneBusy { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::FrameCapture { .. } | Self::Io { .. } | Self::Internal { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status code for the boundary layer
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Whether the error should count against a provider's circuit breaker
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ProviderTimeout | ErrorKind::ProviderError | ErrorKind::Authentication
        )
    }

    /// Turn an arbitrary foreign error into a classified domain error.
    ///
    /// Domain errors pass through unchanged; anything else is classified
    /// from its message and only becomes `Internal` when nothing matches.
    pub fn from_unclassified(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(domain) = err.downcast_ref::<Self>() {
            return domain.shallow_clone();
        }
        let message = err.to_string();
        match ErrorKind::classify(&message) {
            ErrorKind::Authentication => Self::authentication(message),
            ErrorKind::ConfigValidation => Self::config_validation(message),
            ErrorKind::MergeNotReady => Self::MergeNotReady,
            ErrorKind::NotFound => Self::not_found(message),
            ErrorKind::BusConnection => Self::bus_connection(message),
            _ => Self::internal(message),
        }
    }

    /// Copy of the error without its source chain
    fn shallow_clone(&self) -> Self {
        match self {
            Self::ConfigValidation { message } => Self::config_validation(message.clone()),
            Self::Configuration { message, .. } => Self::configuration(message.clone()),
            Self::MergeNotReady => Self::MergeNotReady,
            Self::ProviderUnavailable { provider } => Self::ProviderUnavailable {
                provider: provider.clone(),
            },
            Self::ProviderTimeout {
                provider,
                timeout_ms,
            } => Self::ProviderTimeout {
                provider: provider.clone(),
                timeout_ms: *timeout_ms,
            },
            Self::Provider {
                provider, message, ..
            } => Self::provider(provider.clone(), message.clone()),
            Self::AllProvidersExhausted { attempted } => Self::AllProvidersExhausted {
                attempted: attempted.clone(),
            },
            Self::BusConnection { message, .. } => Self::bus_connection(message.clone()),
            Self::Authentication { message, .. } => Self::authentication(message.clone()),
            Self::ProviderSwitch { provider, reason } => {
                Self::provider_switch(provider.clone(), reason.clone())
            }
            Self::ZoneBusy { zone } => Self::ZoneBusy { zone: zone.clone() },
            Self::FrameCapture {
                camera, message, ..
            } => Self::frame_capture(camera.clone(), message.clone()),
            Self::NotFound { resource } => Self::not_found(resource.clone()),
            other => Self::internal(other.to_string()),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a validation error for external option data
    pub fn config_validation<S: Into<String>>(message: S) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Provider error creation methods
impl Error {
    /// Create a provider error
    pub fn provider<P: Into<String>, S: Into<String>>(provider: P, message: S) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a provider error with source
    pub fn provider_with_source<
        P: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        provider: P,
        message: S,
        source: E,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for a provider skipped by its open circuit
    pub fn provider_unavailable<P: Into<String>>(provider: P) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
        }
    }

    /// Create the terminal error of a dispatch where no provider answered
    pub fn providers_exhausted<I, S>(attempted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllProvidersExhausted {
            attempted: attempted.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a provider timeout error
    pub fn provider_timeout<P: Into<String>>(provider: P, timeout: std::time::Duration) -> Self {
        Self::ProviderTimeout {
            provider: provider.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a provider switch error
    pub fn provider_switch<P: Into<String>, S: Into<String>>(provider: P, reason: S) -> Self {
        Self::ProviderSwitch {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

// Runtime error creation methods
impl Error {
    /// Create an authentication error
    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::Authentication {
            message: message.into(),
            source: None,
        }
    }

    /// Create a bus connection error
    pub fn bus_connection<S: Into<String>>(message: S) -> Self {
        Self::BusConnection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a bus connection error with source
    pub fn bus_connection_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::BusConnection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a frame capture error
    pub fn frame_capture<C: Into<String>, S: Into<String>>(camera: C, message: S) -> Self {
        Self::FrameCapture {
            camera: camera.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a frame capture error with source
    pub fn frame_capture_with_source<
        C: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        camera: C,
        message: S,
        source: E,
    ) -> Self {
        Self::FrameCapture {
            camera: camera.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
