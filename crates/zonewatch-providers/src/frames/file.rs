//! File system frame source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::FrameSource;
use zonewatch_domain::value_objects::CapturedFrame;

use crate::constants::FILE_FRAME_EXTENSIONS;

/// Reads the latest still for a camera from a directory.
///
/// Some external process (an NVR export, a cron job) is expected to keep
/// `<dir>/<camera_entity>.jpg` fresh.
#[derive(Debug, Clone)]
pub struct FileFrameSource {
    directory: PathBuf,
}

impl FileFrameSource {
    /// Source reading from `directory`
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Directory frames are read from
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

#[async_trait]
impl FrameSource for FileFrameSource {
    async fn capture(&self, camera_entity: &str) -> Result<CapturedFrame> {
        if camera_entity.contains('/') || camera_entity.contains('\\') || camera_entity.contains("..") {
            return Err(Error::frame_capture(camera_entity, "camera reference is not a plain name"));
        }

        for (extension, mime) in FILE_FRAME_EXTENSIONS {
            let path = self.directory.join(format!("{camera_entity}.{extension}"));
            match tokio::fs::read(&path).await {
                Ok(data) if data.is_empty() => {
                    return Err(Error::frame_capture(camera_entity, format!("{} is empty", path.display())));
                }
                Ok(data) => return Ok(CapturedFrame::new(data, mime)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(Error::frame_capture_with_source(
                        camera_entity,
                        format!("failed to read {}", path.display()),
                        e,
                    ));
                }
            }
        }

        Err(Error::frame_capture(
            camera_entity,
            format!("no frame found in {}", self.directory.display()),
        ))
    }

    fn source_name(&self) -> &str {
        "file"
    }
}
