//! Infrastructure layer constants
//!
//! Domain defaults (zone intervals, provider priority) live in
//! `zonewatch_domain::constants`.

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "zonewatch.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "zonewatch";

/// Environment variable prefix
pub const CONFIG_ENV_PREFIX: &str = "ZONEWATCH";

/// Separator for nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "ZONEWATCH_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Debounce window for config file change events
pub const CONFIG_WATCH_DEBOUNCE_MS: u64 = 500;

// ============================================================================
// CIRCUIT BREAKER
// ============================================================================

/// Consecutive failures that open a circuit
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 3;

/// Failures older than this no longer count towards the threshold
pub const CIRCUIT_BREAKER_TRACKING_WINDOW_SECS: u64 = 600;

/// Cooldown after the first opening
pub const CIRCUIT_BREAKER_BASE_COOLDOWN_SECS: u64 = 30;

/// Upper bound for the doubled cooldown
pub const CIRCUIT_BREAKER_MAX_COOLDOWN_SECS: u64 = 600;

// ============================================================================
// EVENT BUS
// ============================================================================

/// Default NATS server URL
pub const DEFAULT_NATS_URL: &str = "nats://localhost:4222";

/// Default NATS client name
pub const DEFAULT_NATS_CLIENT_NAME: &str = "zonewatch";

/// First reconnect delay
pub const BUS_RECONNECT_BASE_DELAY_MS: u64 = 500;

/// Reconnect delay cap
pub const BUS_RECONNECT_MAX_DELAY_MS: u64 = 30_000;

/// Connection attempt timeout
pub const BUS_CONNECTION_TIMEOUT_MS: u64 = 5_000;

/// Outbound queue depth between zone runners and the publisher
pub const PUBLISHER_QUEUE_CAPACITY: usize = 256;

// ============================================================================
// SCHEDULER
// ============================================================================

/// Grace period for in-flight work on shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// METRICS
// ============================================================================

/// How long minute buckets are kept
pub const METRICS_RETENTION_SECS: u64 = 24 * 60 * 60;

/// Bucket width
pub const METRICS_BUCKET_SECS: u64 = 60;

/// Upper bounds (ms) of the latency histogram buckets
pub const LATENCY_BUCKETS_MS: [f64; 10] = [
    50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 30_000.0, 60_000.0,
];

/// Metric name: provider attempts
pub const METRIC_PROVIDER_REQUESTS: &str = "zonewatch_provider_requests_total";

/// Metric name: provider latency
pub const METRIC_PROVIDER_LATENCY: &str = "zonewatch_provider_latency_seconds";

/// Metric name: provider cost
pub const METRIC_PROVIDER_COST: &str = "zonewatch_provider_cost_total";

/// Metric name: skipped zone triggers
pub const METRIC_ZONE_TRIGGERS_SKIPPED: &str = "zonewatch_zone_triggers_skipped_total";

/// Metric name: breaker state gauge (0 closed, 1 half-open, 2 open)
pub const METRIC_CIRCUIT_STATE: &str = "zonewatch_circuit_state";

// ============================================================================
// FRAMES
// ============================================================================

/// Default snapshot server for the http frame source
pub const DEFAULT_FRAME_BASE_URL: &str = "http://localhost:8123";
