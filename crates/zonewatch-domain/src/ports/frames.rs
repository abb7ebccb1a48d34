//! Frame Source Port

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::CapturedFrame;

/// Captures still images from cameras
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture one frame from `camera_entity`
    async fn capture(&self, camera_entity: &str) -> Result<CapturedFrame>;

    /// Source name for logging
    fn source_name(&self) -> &str;
}
