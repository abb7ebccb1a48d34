//! Provider Constants
//!
//! Constants specific to provider implementations. Domain defaults live in
//! `zonewatch-domain`.

// ============================================================================
// HTTP
// ============================================================================

/// JSON content type header value
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// MIME type assumed when a snapshot response carries none
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

// ============================================================================
// INFERENCE PROVIDER CONSTANTS
// ============================================================================

/// OpenAI API base URL
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI default vision model
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Ollama local server URL
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama default vision model
pub const OLLAMA_DEFAULT_MODEL: &str = "llava";

/// Completion token cap for vision requests
pub const INFERENCE_MAX_TOKENS: u32 = 500;

// ============================================================================
// EVENT BUS CONSTANTS
// ============================================================================

/// Default tokio broadcast channel capacity
pub const TOKIO_BUS_CAPACITY: usize = 1024;

/// How often a NATS connection's state is polled for loss
pub const NATS_STATE_POLL_INTERVAL_MS: u64 = 500;

// ============================================================================
// FRAME SOURCE CONSTANTS
// ============================================================================

/// Extensions tried, in order, by the file frame source
pub const FILE_FRAME_EXTENSIONS: [(&str, &str); 3] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];
