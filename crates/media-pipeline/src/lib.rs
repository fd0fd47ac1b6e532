//! Best-effort media enrichment for promo posts.
//!
//! Given a synthesized post, this crate can produce:
//!
//! - a square image ([`GeminiImageGenerator`]),
//! - a short vertical video from an ordered provider chain ([`VideoChain`]
//!   over [`VeoProvider`]s),
//! - upload metadata ([`GeminiMetadataGenerator`]),
//!
//! and hand the video to any number of [`VideoUploader`] targets
//! ([`UploadPostUploader`], [`DriveUploader`], [`WebhookUploader`]).
//!
//! Nothing in this crate decides whether a post gets published. Callers
//! treat every error here as a reason to skip enrichment, not to fail.

mod api_types;
mod error;
pub mod gemini;
pub mod image;
pub mod metadata;
pub mod storage;
pub mod upload;
pub mod video;

pub use error::MediaError;
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_API_URL};
pub use image::{GeminiImageGenerator, ImageGenerator};
pub use metadata::{GeminiMetadataGenerator, MetadataGenerator, VideoMetadata, FALLBACK_TITLE};
pub use storage::{ensure_video_file, TempStore};
pub use upload::{
    DriveUploader, UploadPostConfig, UploadPostUploader, UploadReceipt, VideoUploader,
    WebhookUploader,
};
pub use video::{
    PollPolicy, VeoProvider, VideoChain, VideoGenerator, VideoProvider, VideoRequest,
};

/// Re-exported so callers can cancel in-flight video generation.
pub use tokio_util::sync::CancellationToken;
