//! Process-local storage for generated media.
//!
//! Files are named with a timestamp (and the post's uniqueness token for
//! images) so consecutive runs never collide. Nothing here deletes files.

use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::debug;

use crate::error::MediaError;

/// Default root directory for generated media.
pub const DEFAULT_TEMP_DIR: &str = "temp_media";

/// Directory layout for generated images and videos.
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
}

impl TempStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store from `MEDIA_TEMP_DIR` (default: `temp_media`).
    pub fn from_env() -> Self {
        Self::new(env::var("MEDIA_TEMP_DIR").unwrap_or_else(|_| DEFAULT_TEMP_DIR.to_string()))
    }

    fn stamp() -> String {
        Utc::now().format("%Y%m%d%H%M%S%3f").to_string()
    }

    /// Write a generated image and return its path.
    pub async fn save_image(&self, token: u32, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        let dir = self.root.join("images");
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("generated_{}_{}.png", token, Self::stamp()));
        fs::write(&path, bytes).await?;
        debug!("Saved image ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Write a generated video and return its path.
    ///
    /// An empty payload is rejected so later uploads never see a zero-byte file.
    pub async fn save_video(&self, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        let dir = self.root.join("videos");
        fs::create_dir_all(&dir).await?;

        let path = dir.join(format!("reel_{}.mp4", Self::stamp()));
        if bytes.is_empty() {
            return Err(MediaError::UnusableFile(path));
        }

        fs::write(&path, bytes).await?;
        debug!("Saved video ({} bytes) to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Check that a video file exists and is non-empty; returns its size.
pub async fn ensure_video_file(path: &Path) -> Result<u64, MediaError> {
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(meta.len()),
        _ => Err(MediaError::UnusableFile(path.to_path_buf())),
    }
}
