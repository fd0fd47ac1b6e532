//! Short vertical video generation.
//!
//! A [`VideoChain`] rewrites the post into a video prompt and tries each
//! [`VideoProvider`] in order; the first success wins. Long-running provider
//! operations are polled under a [`PollPolicy`] ceiling and can be cancelled.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api_types::{Operation, PredictVideoRequest, VideoImage, VideoInstance, VideoParameters};
use crate::error::MediaError;
use crate::gemini::GeminiClient;
use crate::storage::TempStore;

/// Prompt used when the post cannot be rewritten into a video prompt.
pub const FALLBACK_VIDEO_PROMPT: &str = "Cinematic vertical video of festive holiday magic. \
     Vibrant colors, dynamic camera movement. Audio: upbeat holiday music, jingle bells.";

/// How often and how long a long-running generation is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between polls.
    pub interval: Duration,
    /// Maximum number of polls before giving up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    /// Create a policy.
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Read `VIDEO_POLL_INTERVAL_SECS` and `VIDEO_POLL_MAX_ATTEMPTS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval = env::var("VIDEO_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.interval);
        let max_attempts = env::var("VIDEO_POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_attempts);
        Self::new(interval, max_attempts)
    }
}

/// Input for a single provider attempt.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// Video prompt with audio cues.
    pub prompt: String,
    /// Optional reference image.
    pub image: Option<PathBuf>,
}

/// One video generation backend.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Provider name for logs and aggregate errors.
    fn name(&self) -> &str;

    /// Generate a video and return its local path.
    async fn generate(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaError>;
}

/// Produces a local video file for a post.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generate a video from the post text and an optional reference image.
    async fn generate(&self, post_text: &str, image: Option<&Path>) -> Result<PathBuf, MediaError>;
}

/// Veo text/image-to-video provider.
pub struct VeoProvider {
    client: Arc<GeminiClient>,
    model: String,
    poll: PollPolicy,
    store: TempStore,
    parameters: VideoParameters,
}

impl VeoProvider {
    /// Create a provider for the given Veo model.
    pub fn new(
        client: Arc<GeminiClient>,
        model: impl Into<String>,
        poll: PollPolicy,
        store: TempStore,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            poll,
            store,
            parameters: VideoParameters::default(),
        }
    }

    async fn reference_image(path: &Path) -> Option<VideoImage> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Some(VideoImage {
                bytes_base64_encoded: STANDARD.encode(bytes),
                mime_type: "image/png".to_string(),
            }),
            Err(e) => {
                warn!("Could not read reference image {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Poll `operation` until done, the ceiling is hit, or `cancel` fires.
    async fn wait(
        &self,
        mut operation: Operation,
        cancel: &CancellationToken,
    ) -> Result<Operation, MediaError> {
        let mut attempts = 0;
        while !operation.done {
            if attempts >= self.poll.max_attempts {
                return Err(MediaError::PollLimitReached { attempts });
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(MediaError::Cancelled),
                _ = tokio::time::sleep(self.poll.interval) => {}
            }

            attempts += 1;
            operation = self.client.get_operation(&operation.name).await?;
            info!(
                "Still generating video ({} poll {}/{})",
                self.model, attempts, self.poll.max_attempts
            );
        }
        Ok(operation)
    }
}

#[async_trait]
impl VideoProvider for VeoProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        request: &VideoRequest,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, MediaError> {
        let image = match request.image.as_deref() {
            Some(path) => Self::reference_image(path).await,
            None => None,
        };

        let body = PredictVideoRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image,
            }],
            parameters: self.parameters.clone(),
        };

        info!("Generating video with {}", self.model);
        let operation = self.client.start_video(&self.model, &body).await?;
        let operation = self.wait(operation, cancel).await?;

        if let Some(error) = operation.error.as_ref() {
            return Err(MediaError::NoOutput(format!(
                "video operation failed ({}): {}",
                error.code, error.message
            )));
        }

        let uri = operation
            .video_uri()
            .ok_or_else(|| MediaError::NoOutput("operation finished without a video".to_string()))?;

        info!("Downloading generated video");
        let bytes = self.client.download(uri).await?;
        let path = self.store.save_video(&bytes).await?;
        info!("Video saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Build the prompt asking a text model to rewrite a post into a video prompt.
pub fn video_prompt_request(post_text: &str) -> String {
    format!(
        "Convert this social media post into a dynamic 8-second vertical video prompt with audio \
         for Instagram/TikTok reels.\n\n\
         SOCIAL MEDIA POST:\n{}\n\n\
         REQUIREMENTS:\n\
         - 9:16 vertical format (portrait)\n\
         - 8 seconds duration\n\
         - Dynamic camera movement (dolly, pan, or tracking shot)\n\
         - Cinematic style with vibrant colors\n\
         - Include specific actions and motion\n\
         - Add audio cues: music, sound effects, ambient sounds\n\n\
         FORMAT:\n\
         [Camera movement] of [subject] [action] in [setting]. [Visual details]. \
         [Lighting/ambiance]. Audio: [sound effects, music, ambient noise].\n\n\
         OUTPUT:\nReturn ONLY the video prompt with audio cues. No explanations.",
        post_text
    )
}

/// Ordered provider chain; first success wins.
pub struct VideoChain {
    providers: Vec<Arc<dyn VideoProvider>>,
    prompter: Option<Arc<GeminiClient>>,
    cancel: CancellationToken,
}

impl VideoChain {
    /// Create a chain over `providers`, tried in order.
    pub fn new(providers: Vec<Arc<dyn VideoProvider>>) -> Self {
        Self {
            providers,
            prompter: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Rewrite posts into video prompts with a text model.
    pub fn with_prompter(mut self, client: Arc<GeminiClient>) -> Self {
        self.prompter = Some(client);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    async fn video_prompt(&self, post_text: &str) -> String {
        let Some(client) = self.prompter.as_ref() else {
            return format!("{} Inspired by: {}", FALLBACK_VIDEO_PROMPT, post_text);
        };

        match client.generate_text(&video_prompt_request(post_text), 0.8).await {
            Ok(prompt) => {
                info!("Enhanced video prompt: {}", prompt);
                prompt
            }
            Err(e) => {
                warn!("Failed to enhance video prompt: {}", e);
                FALLBACK_VIDEO_PROMPT.to_string()
            }
        }
    }
}

#[async_trait]
impl VideoGenerator for VideoChain {
    async fn generate(&self, post_text: &str, image: Option<&Path>) -> Result<PathBuf, MediaError> {
        if self.providers.is_empty() {
            return Err(MediaError::Configuration(
                "no video providers configured".to_string(),
            ));
        }

        let request = VideoRequest {
            prompt: self.video_prompt(post_text).await,
            image: image.map(Path::to_path_buf),
        };

        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.generate(&request, &self.cancel).await {
                Ok(path) => return Ok(path),
                Err(MediaError::Cancelled) => return Err(MediaError::Cancelled),
                Err(e) => {
                    warn!("Video provider {} failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(MediaError::AllProvidersFailed(failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiConfig;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeProvider {
        name: &'static str,
        result: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl VideoProvider for FakeProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(
            &self,
            _request: &VideoRequest,
            _cancel: &CancellationToken,
        ) -> Result<PathBuf, MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Some(p) => Ok(PathBuf::from(p)),
                None => Err(MediaError::NoOutput(format!("{} down", self.name))),
            }
        }
    }

    fn fake(name: &'static str, result: Option<&'static str>, calls: &Arc<AtomicUsize>) -> Arc<dyn VideoProvider> {
        Arc::new(FakeProvider {
            name,
            result,
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn test_chain_falls_back_to_secondary() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = VideoChain::new(vec![
            fake("primary", None, &calls),
            fake("secondary", Some("/tmp/b.mp4"), &calls),
        ]);

        let path = chain.generate("post", None).await.unwrap();
        assert_eq!(path, PathBuf::from("/tmp/b.mp4"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = VideoChain::new(vec![
            fake("primary", Some("/tmp/a.mp4"), &calls),
            fake("secondary", Some("/tmp/b.mp4"), &calls),
        ]);

        assert_eq!(chain.generate("post", None).await.unwrap(), PathBuf::from("/tmp/a.mp4"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_aggregates_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = VideoChain::new(vec![fake("primary", None, &calls), fake("secondary", None, &calls)]);

        match chain.generate("post", None).await {
            Err(MediaError::AllProvidersFailed(errors)) => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].starts_with("primary:"));
                assert!(errors[1].starts_with("secondary:"));
            }
            other => panic!("Expected AllProvidersFailed, got {:?}", other),
        }
    }

    struct WaitingProvider;

    #[async_trait]
    impl VideoProvider for WaitingProvider {
        fn name(&self) -> &str {
            "waiting"
        }

        async fn generate(
            &self,
            _request: &VideoRequest,
            cancel: &CancellationToken,
        ) -> Result<PathBuf, MediaError> {
            cancel.cancelled().await;
            Err(MediaError::Cancelled)
        }
    }

    #[tokio::test]
    async fn test_external_cancel_stops_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let chain = VideoChain::new(vec![
            Arc::new(WaitingProvider) as Arc<dyn VideoProvider>,
            fake("secondary", Some("/tmp/b.mp4"), &calls),
        ])
        .with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        assert!(matches!(
            chain.generate("post", None).await,
            Err(MediaError::Cancelled)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_chain_is_configuration_error() {
        let chain = VideoChain::new(Vec::new());
        assert!(matches!(
            chain.generate("post", None).await,
            Err(MediaError::Configuration(_))
        ));
    }

    fn veo(server: &MockServer, dir: &Path, poll: PollPolicy) -> VeoProvider {
        let client =
            Arc::new(GeminiClient::new(GeminiConfig::new("k").with_api_url(server.uri())).unwrap());
        VeoProvider::new(client, "veo-test", poll, TempStore::new(dir))
    }

    #[tokio::test]
    async fn test_veo_polls_and_downloads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/veo-test:predictLongRunning"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op1",
                "done": false
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op1",
                "done": true,
                "response": {"generateVideoResponse": {"generatedSamples": [
                    {"video": {"uri": format!("{}/files/clip", server.uri())}}
                ]}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/files/clip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4data".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = veo(&server, dir.path(), PollPolicy::new(Duration::from_millis(5), 3));
        let request = VideoRequest {
            prompt: "a sleigh".to_string(),
            image: None,
        };

        let path = provider
            .generate(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"mp4data");
    }

    #[tokio::test]
    async fn test_veo_poll_ceiling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/slow"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1beta/operations/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/slow",
                "done": false
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = veo(&server, dir.path(), PollPolicy::new(Duration::from_millis(1), 2));
        let request = VideoRequest {
            prompt: "x".to_string(),
            image: None,
        };

        assert!(matches!(
            provider.generate(&request, &CancellationToken::new()).await,
            Err(MediaError::PollLimitReached { attempts: 2 })
        ));
    }

    #[tokio::test]
    async fn test_veo_cancelled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/slow"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = veo(&server, dir.path(), PollPolicy::new(Duration::from_secs(60), 10));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = VideoRequest {
            prompt: "x".to_string(),
            image: None,
        };
        assert!(matches!(
            provider.generate(&request, &cancel).await,
            Err(MediaError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_veo_operation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/bad",
                "done": true,
                "error": {"code": 3, "message": "prompt blocked"}
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let provider = veo(&server, dir.path(), PollPolicy::default());
        let request = VideoRequest {
            prompt: "x".to_string(),
            image: None,
        };

        match provider.generate(&request, &CancellationToken::new()).await {
            Err(MediaError::NoOutput(msg)) => assert!(msg.contains("prompt blocked")),
            other => panic!("Expected NoOutput, got {:?}", other),
        }
    }
}
