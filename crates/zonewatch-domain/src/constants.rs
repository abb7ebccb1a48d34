//! Domain layer constants
//!
//! Defaults applied when external option data omits or mangles a field.
//! Infrastructure-specific constants live in `zonewatch-infrastructure`.

// ============================================================================
// ZONE DEFAULTS
// ============================================================================

/// Interval used when `interval_minutes` is missing or cannot be coerced
pub const DEFAULT_INTERVAL_MINUTES: u64 = 60;

/// Random offset bound used when `random_offset_minutes` cannot be coerced
pub const DEFAULT_RANDOM_OFFSET_MINUTES: u64 = 0;

/// Purpose text used when a zone entry has none
pub const DEFAULT_ZONE_PURPOSE: &str = "Keep this area tidy";

// ============================================================================
// PROVIDER DEFAULTS
// ============================================================================

/// Priority assigned to providers that do not declare one
pub const DEFAULT_PROVIDER_PRIORITY: i64 = 100;

/// Per-call timeout when `timeout_secs` is missing or invalid
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Cost estimate when `cost_per_request` is missing or invalid
pub const DEFAULT_PROVIDER_COST: f64 = 0.0;

/// Prefix marking a credential reference that names an environment variable
pub const CREDENTIAL_ENV_PREFIX: &str = "env:";

// ============================================================================
// BUS TOPICS
// ============================================================================

/// Default topic prefix for all published messages
pub const DEFAULT_TOPIC_PREFIX: &str = "zonewatch";

/// Marker stored in exhausted results
pub const PROVIDERS_EXHAUSTED_MARKER: &str = "providers exhausted";
