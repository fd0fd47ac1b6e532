//! Video upload targets.
//!
//! Every uploader checks that the file exists and is non-empty before making
//! any network call. Uploaders never retry.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use social_tools::{DriveAction, ToolRegistry};
use tracing::{info, warn};

use crate::error::MediaError;
use crate::metadata::VideoMetadata;
use crate::storage::ensure_video_file;

/// Default UploadPost endpoint.
pub const DEFAULT_UPLOADPOST_URL: &str = "https://api.upload-post.com/api/upload";

/// Folder generated videos are filed under on cloud storage.
pub const DRIVE_FOLDER_NAME: &str = "AI Video";

const UPLOAD_TIMEOUT_SECS: u64 = 300;

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    /// Target name.
    pub target: String,
    /// Target's response payload.
    pub response: Value,
}

/// A destination for finished videos.
#[async_trait]
pub trait VideoUploader: Send + Sync {
    /// Target name for logs and receipts.
    fn target(&self) -> &str;

    /// Upload the video at `path` with `metadata`.
    async fn upload(&self, path: &Path, metadata: &VideoMetadata)
        -> Result<UploadReceipt, MediaError>;
}

fn http_client(timeout: Duration) -> Result<Client, MediaError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MediaError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Parse a response body as JSON, keeping plain text bodies as `{"text": ..}`.
fn body_value(text: String) -> Value {
    if text.is_empty() {
        return json!({});
    }
    serde_json::from_str(&text).unwrap_or_else(|_| json!({ "text": text }))
}

/// Configuration for [`UploadPostUploader`].
#[derive(Debug, Clone)]
pub struct UploadPostConfig {
    pub api_key: String,
    pub user: String,
    pub platforms: Vec<String>,
    pub url: String,
}

impl UploadPostConfig {
    /// Create a configuration publishing to YouTube.
    pub fn new(api_key: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            user: user.into(),
            platforms: vec!["youtube".to_string()],
            url: DEFAULT_UPLOADPOST_URL.to_string(),
        }
    }

    /// Read `UPLOADPOST_API_KEY`, `UPLOADPOST_USER` and `UPLOADPOST_PLATFORMS`.
    ///
    /// Returns `None` when the key or user is missing.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("UPLOADPOST_API_KEY").ok().filter(|k| !k.is_empty())?;
        let user = env::var("UPLOADPOST_USER").ok().filter(|u| !u.is_empty())?;

        let mut config = Self::new(api_key, user);
        if let Ok(platforms) = env::var("UPLOADPOST_PLATFORMS") {
            let platforms: Vec<String> = platforms
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            if !platforms.is_empty() {
                config.platforms = platforms;
            }
        }
        Some(config)
    }

    /// Override the endpoint URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Multi-platform short-video publisher.
pub struct UploadPostUploader {
    client: Client,
    config: UploadPostConfig,
}

impl UploadPostUploader {
    pub fn new(config: UploadPostConfig) -> Result<Self, MediaError> {
        Ok(Self {
            client: http_client(Duration::from_secs(UPLOAD_TIMEOUT_SECS))?,
            config,
        })
    }
}

#[async_trait]
impl VideoUploader for UploadPostUploader {
    fn target(&self) -> &str {
        "uploadpost"
    }

    async fn upload(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<UploadReceipt, MediaError> {
        let size = ensure_video_file(path).await?;
        info!(
            "Uploading {} ({} bytes) to {:?}",
            path.display(),
            size,
            self.config.platforms
        );

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "video.mp4".to_string());

        let mut form = Form::new()
            .text("title", metadata.title.clone())
            .text("description", metadata.description.clone())
            .text("user", self.config.user.clone());
        for platform in &self.config.platforms {
            form = form.text("platform[]", platform.clone());
        }
        form = form.part(
            "video",
            Part::bytes(bytes).file_name(file_name).mime_str("video/mp4")?,
        );

        let response = self
            .client
            .post(&self.config.url)
            .header("Authorization", format!("Apikey {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MediaError::Upload {
                target: self.target().to_string(),
                reason: format!("status {}: {}", status.as_u16(), text),
            });
        }

        Ok(UploadReceipt {
            target: self.target().to_string(),
            response: body_value(text),
        })
    }
}

/// Files videos into a named cloud storage folder through the capability registry.
pub struct DriveUploader {
    registry: Arc<ToolRegistry>,
    account: String,
    folder: String,
}

impl DriveUploader {
    /// Create an uploader acting as the storage connection `account`.
    pub fn new(registry: Arc<ToolRegistry>, account: impl Into<String>) -> Self {
        Self {
            registry,
            account: account.into(),
            folder: DRIVE_FOLDER_NAME.to_string(),
        }
    }

    async fn find_folder(&self) -> Option<String> {
        let params = HashMap::from([("name_exact".to_string(), json!(self.folder))]);
        let output = match self
            .registry
            .execute(DriveAction::FindFolder.name(), params, Some(&self.account))
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Folder lookup failed: {}", e);
                return None;
            }
        };

        if !output.successful {
            warn!("Folder lookup failed: {}", output.error_text());
            return None;
        }

        let id = output
            .data
            .get("files")
            .and_then(|f| f.get(0))
            .and_then(|f| f.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(id) = &id {
            info!("Found folder {} ({})", self.folder, id);
        }
        id
    }
}

#[async_trait]
impl VideoUploader for DriveUploader {
    fn target(&self) -> &str {
        "drive"
    }

    async fn upload(
        &self,
        path: &Path,
        _metadata: &VideoMetadata,
    ) -> Result<UploadReceipt, MediaError> {
        let size = ensure_video_file(path).await?;
        info!("Uploading {} ({} bytes) to drive", path.display(), size);

        let folder_id = self.find_folder().await;
        let params = HashMap::from([
            (
                "file_to_upload".to_string(),
                json!(path.to_string_lossy()),
            ),
            ("folder_to_upload_to".to_string(), json!(folder_id)),
        ]);

        let output = self
            .registry
            .execute(DriveAction::UploadFile.name(), params, Some(&self.account))
            .await?;

        if !output.successful {
            return Err(MediaError::Upload {
                target: self.target().to_string(),
                reason: output.error_text(),
            });
        }

        info!("Drive upload complete, file id {:?}", output.id());
        Ok(UploadReceipt {
            target: self.target().to_string(),
            response: output.data,
        })
    }
}

/// Notifies an automation webhook that a video is ready.
pub struct WebhookUploader {
    client: Client,
    url: String,
}

impl WebhookUploader {
    pub fn new(url: impl Into<String>) -> Result<Self, MediaError> {
        Ok(Self {
            client: http_client(Duration::from_secs(60))?,
            url: url.into(),
        })
    }

    /// Create from `MAKE_WEBHOOK_URL`; `None` when unset.
    pub fn from_env() -> Option<Result<Self, MediaError>> {
        env::var("MAKE_WEBHOOK_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .map(Self::new)
    }
}

#[async_trait]
impl VideoUploader for WebhookUploader {
    fn target(&self) -> &str {
        "webhook"
    }

    async fn upload(
        &self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<UploadReceipt, MediaError> {
        let size = ensure_video_file(path).await?;
        let absolute = tokio::fs::canonicalize(path).await?;

        let payload = json!({
            "title": metadata.title,
            "description": metadata.description,
            "filename": path.file_name().map(|n| n.to_string_lossy().to_string()),
            "video_path": absolute.to_string_lossy(),
            "file_size_bytes": size,
            "status": "video_ready",
        });

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(MediaError::Upload {
                target: self.target().to_string(),
                reason: format!("status {}: {}", status.as_u16(), text),
            });
        }

        info!("Webhook accepted video notification ({})", status.as_u16());
        Ok(UploadReceipt {
            target: self.target().to_string(),
            response: body_value(text),
        })
    }
}
