//! Null frame source

use async_trait::async_trait;
use zonewatch_domain::error::Result;
use zonewatch_domain::ports::FrameSource;
use zonewatch_domain::value_objects::CapturedFrame;

use crate::constants::DEFAULT_IMAGE_MIME;

/// Returns an empty frame for every camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrameSource;

impl NullFrameSource {
    /// Create a null frame source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameSource for NullFrameSource {
    async fn capture(&self, _camera_entity: &str) -> Result<CapturedFrame> {
        Ok(CapturedFrame::new(Vec::new(), DEFAULT_IMAGE_MIME))
    }

    fn source_name(&self) -> &str {
        "null"
    }
}
