//! HTTP snapshot frame source
//!
//! Works with camera proxies such as `/api/camera_proxy/<entity>`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use zonewatch_domain::error::{Error, Result};
use zonewatch_domain::ports::FrameSource;
use zonewatch_domain::value_objects::{CapturedFrame, CredentialRef};

use crate::constants::DEFAULT_IMAGE_MIME;

/// Fetches still images over HTTP
pub struct HttpSnapshotSource {
    base_url: String,
    token: Option<CredentialRef>,
    http_client: Client,
}

impl HttpSnapshotSource {
    /// Create a snapshot source rooted at `base_url`
    pub fn new<S: Into<String>>(base_url: S, token: Option<CredentialRef>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            http_client,
        }
    }

    /// URL a camera's snapshot is fetched from
    pub fn snapshot_url(&self, camera_entity: &str) -> String {
        format!("{}/{}", self.base_url, camera_entity)
    }
}

impl std::fmt::Debug for HttpSnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSnapshotSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FrameSource for HttpSnapshotSource {
    async fn capture(&self, camera_entity: &str) -> Result<CapturedFrame> {
        let url = self.snapshot_url(camera_entity);
        let mut request = self.http_client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.resolve()?);
        }

        let response = request.send().await.map_err(|e| {
            Error::frame_capture_with_source(camera_entity, "snapshot request failed", e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::authentication(format!(
                "snapshot endpoint rejected credentials ({status})"
            )));
        }
        if !status.is_success() {
            return Err(Error::frame_capture(
                camera_entity,
                format!("snapshot endpoint returned {status}"),
            ));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or_else(|| DEFAULT_IMAGE_MIME.to_string(), str::to_string);

        let data = response.bytes().await.map_err(|e| {
            Error::frame_capture_with_source(camera_entity, "snapshot body read failed", e)
        })?;
        if data.is_empty() {
            return Err(Error::frame_capture(camera_entity, "snapshot is empty"));
        }

        debug!(camera = %camera_entity, bytes = data.len(), "Captured snapshot");
        Ok(CapturedFrame::new(data.to_vec(), mime_type))
    }

    fn source_name(&self) -> &str {
        "http"
    }
}
