//! Error types for media enrichment.

use std::path::PathBuf;

use social_tools::ToolError;
use thiserror::Error;

/// Errors that can occur while generating or uploading media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generative API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model answered without the expected output.
    #[error("no output: {0}")]
    NoOutput(String),

    /// Generated payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Long-running generation did not finish within the polling ceiling.
    #[error("generation still running after {attempts} polls")]
    PollLimitReached { attempts: u32 },

    /// Generation was cancelled.
    #[error("generation cancelled")]
    Cancelled,

    /// Every provider in a fallback chain failed.
    #[error("all providers failed: {}", .0.join("; "))]
    AllProvidersFailed(Vec<String>),

    /// Video file is missing or empty.
    #[error("video file unusable: {}", .0.display())]
    UnusableFile(PathBuf),

    /// Upload target rejected the file.
    #[error("upload to {target} failed: {reason}")]
    Upload { target: String, reason: String },

    /// Capability endpoint call failed.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),
}
