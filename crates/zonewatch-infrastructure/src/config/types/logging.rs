//! Logging configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LOG_LEVEL;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter (`trace`..`error`), overridden by `ZONEWATCH_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
    /// Daily-rolling log file; stdout only when unset
    pub file_output: Option<PathBuf>,
}

/// Returns default logging configuration with:
/// - `info` level
/// - plain text output to stdout only
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
