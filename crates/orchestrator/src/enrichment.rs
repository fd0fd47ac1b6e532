//! Best-effort media enrichment for publish drafts.
//!
//! Image → platform media upload → video → metadata → video uploads. Every
//! step is optional and every failure is logged and swallowed; the draft is
//! always left publishable.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use media_pipeline::{
    ImageGenerator, MetadataGenerator, UploadReceipt, VideoGenerator, VideoMetadata,
    VideoUploader, FALLBACK_TITLE,
};
use tracing::{info, warn};

use crate::dispatcher::Dispatcher;
use crate::draft::PostDraft;

/// What enrichment produced for one draft.
#[derive(Debug, Default)]
pub struct EnrichmentReport {
    pub image: Option<PathBuf>,
    pub media_id: Option<String>,
    pub video: Option<PathBuf>,
    pub metadata: Option<VideoMetadata>,
    /// Successful uploads, by target.
    pub uploads: Vec<UploadReceipt>,
    /// Failed steps, as `(step, error)`.
    pub failures: Vec<(String, String)>,
}

impl EnrichmentReport {
    fn failed(&mut self, step: &str, error: impl ToString) {
        let error = error.to_string();
        warn!("Enrichment step '{}' failed: {}", step, error);
        self.failures.push((step.to_string(), error));
    }
}

/// Optional media capabilities attached to publish drafts.
#[derive(Default)]
pub struct Enricher {
    images: Option<Arc<dyn ImageGenerator>>,
    video: Option<Arc<dyn VideoGenerator>>,
    metadata: Option<Arc<dyn MetadataGenerator>>,
    uploaders: Vec<Arc<dyn VideoUploader>>,
}

impl Enricher {
    /// Enricher with nothing configured (text-only posts).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_video(mut self, video: Arc<dyn VideoGenerator>) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataGenerator>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn VideoUploader>) -> Self {
        self.uploaders.push(uploader);
        self
    }

    /// Enrich `draft` in place. Never fails.
    pub async fn enrich(&self, draft: &mut PostDraft, dispatcher: &Dispatcher) -> EnrichmentReport {
        let mut report = EnrichmentReport::default();
        let token = draft.token.unwrap_or_default();

        if let Some(images) = &self.images {
            match images.generate(&draft.body, token).await {
                Ok(path) => {
                    match dispatcher.upload_media(&path).await {
                        Ok(media_id) => {
                            info!("Uploaded media ID: {}", media_id);
                            draft.media_ids.push(media_id.clone());
                            report.media_id = Some(media_id);
                        }
                        Err(e) => report.failed("media_upload", e),
                    }
                    draft.image = Some(path.clone());
                    report.image = Some(path);
                }
                Err(e) => report.failed("image", e),
            }
        }

        let Some(video) = &self.video else {
            return report;
        };

        let path = match video.generate(&draft.body, draft.image.as_deref()).await {
            Ok(path) => path,
            Err(e) => {
                report.failed("video", e);
                return report;
            }
        };
        info!("Video generated: {}", path.display());
        draft.video = Some(path.clone());
        report.video = Some(path.clone());

        let metadata = match &self.metadata {
            Some(generator) => generator.generate(&draft.body).await,
            None => VideoMetadata {
                title: FALLBACK_TITLE.to_string(),
                description: draft.body.clone(),
            },
        };

        let video_path = path.as_path();
        let meta = &metadata;
        let uploads = join_all(self.uploaders.iter().map(|uploader| async move {
            (uploader.target().to_string(), uploader.upload(video_path, meta).await)
        }))
        .await;

        for (target, outcome) in uploads {
            match outcome {
                Ok(receipt) => {
                    info!("Video uploaded to {}", target);
                    report.uploads.push(receipt);
                }
                Err(e) => report.failed(&format!("upload:{}", target), e),
            }
        }

        report.metadata = Some(metadata);
        report
    }
}
