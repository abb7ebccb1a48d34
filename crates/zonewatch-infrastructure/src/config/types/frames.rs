//! Frame source configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_FRAME_BASE_URL;

/// Frame source types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrameSourceKind {
    /// HTTP snapshot endpoint
    #[default]
    Http,
    /// Directory of still images
    File,
    /// Empty frames
    Null,
}

/// Frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSourceConfig {
    /// Source implementation
    pub source: FrameSourceKind,
    /// Snapshot base URL (`http`)
    pub base_url: Option<String>,
    /// Bearer token reference (`env:VAR` or literal) for `http`
    pub token: Option<String>,
    /// Image directory (`file`)
    pub directory: Option<PathBuf>,
}

/// Returns default frame source configuration: HTTP snapshots from a
/// local home automation server, no token
impl Default for FrameSourceConfig {
    fn default() -> Self {
        Self {
            source: FrameSourceKind::default(),
            base_url: Some(DEFAULT_FRAME_BASE_URL.to_string()),
            token: None,
            directory: None,
        }
    }
}
