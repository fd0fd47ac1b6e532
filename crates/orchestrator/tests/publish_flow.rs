//! End-to-end runs against scripted platform tools and fake media capabilities.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use media_pipeline::{
    ImageGenerator, MediaError, VideoChain, VideoGenerator, VideoProvider, VideoRequest,
};
use orchestrator::{
    auto_reply_text, BotConfig, CancellationToken, Enricher, Instruction, PublishOrchestrator,
    Tool, ToolArgs, ToolError, ToolOutput, ToolRegistry, DEFAULT_PROMO_LINK,
};
use serde_json::json;

type Calls = Arc<Mutex<Vec<(String, ToolArgs)>>>;

/// Returns queued outputs in order, repeating the last one.
struct ScriptedTool {
    name: &'static str,
    outputs: Mutex<VecDeque<ToolOutput>>,
    calls: Calls,
}

#[async_trait]
impl Tool for ScriptedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        self.calls.lock().unwrap().push((self.name.to_string(), args));
        let mut outputs = self.outputs.lock().unwrap();
        let output = if outputs.len() > 1 {
            outputs.pop_front()
        } else {
            outputs.front().cloned()
        };
        output.ok_or_else(|| ToolError::ExecutionFailed("no scripted output".to_string()))
    }
}

struct Harness {
    registry: ToolRegistry,
    calls: Calls,
}

impl Harness {
    fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn tool(mut self, name: &'static str, outputs: Vec<ToolOutput>) -> Self {
        self.registry.register(ScriptedTool {
            name,
            outputs: Mutex::new(outputs.into()),
            calls: self.calls.clone(),
        });
        self
    }

    fn build(self, enricher: Enricher) -> (PublishOrchestrator, Calls) {
        let config = BotConfig::new("test-key", "ca_conn").with_publisher("ca_pub");
        let orchestrator =
            PublishOrchestrator::new(Arc::new(self.registry), &config).with_enricher(enricher);
        (orchestrator, self.calls)
    }
}

struct FailingImage;

#[async_trait]
impl ImageGenerator for FailingImage {
    async fn generate(&self, _post_text: &str, _token: u32) -> Result<PathBuf, MediaError> {
        Err(MediaError::NoOutput("model returned no image".to_string()))
    }
}

struct FixedImage;

#[async_trait]
impl ImageGenerator for FixedImage {
    async fn generate(&self, _post_text: &str, token: u32) -> Result<PathBuf, MediaError> {
        Ok(PathBuf::from(format!("/tmp/generated_{}.png", token)))
    }
}

struct FailingVideo;

#[async_trait]
impl VideoGenerator for FailingVideo {
    async fn generate(&self, _post_text: &str, _image: Option<&Path>) -> Result<PathBuf, MediaError> {
        Err(MediaError::AllProvidersFailed(vec![
            "veo-primary: quota".to_string(),
            "veo-fallback: quota".to_string(),
        ]))
    }
}

/// Never finishes on its own; returns once cancelled.
struct StalledProvider;

#[async_trait]
impl VideoProvider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
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

fn created(id: &str) -> ToolOutput {
    ToolOutput::success(json!({"data": {"id": id, "text": "ok"}}))
}

#[tokio::test]
async fn test_new_post_is_decorated_and_auto_replied() {
    let (orchestrator, calls) = Harness::new()
        .tool("creation_of_a_post", vec![created("1001"), created("1002")])
        .build(Enricher::new());

    let result = orchestrator.run_query("post a new tweet: check this out").await;
    assert!(result.success);
    assert_eq!(result.id().as_deref(), Some("1001"));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);

    let post = &calls[0].1;
    let text = post.params["text"].as_str().unwrap();
    assert!(text.starts_with("check this out "));
    assert!(text.contains(DEFAULT_PROMO_LINK));
    assert!(text.contains("#SantaSpot"));
    assert!(["🎄", "❄️", "🎅", "🦌"].iter().any(|e| text.contains(e)));
    assert!(text
        .split_whitespace()
        .filter_map(|t| t.parse::<u32>().ok())
        .any(|n| (1000..=9999).contains(&n)));
    assert!(!post.params.contains_key("reply_in_reply_to_tweet_id"));
    assert_eq!(post.account.as_deref(), Some("ca_pub"));

    let reply = &calls[1].1;
    assert_eq!(reply.params["text"], auto_reply_text(DEFAULT_PROMO_LINK));
    assert_eq!(reply.params["reply_in_reply_to_tweet_id"], "1001");
}

#[tokio::test]
async fn test_image_failure_still_publishes_text() {
    let enricher = Enricher::new()
        .with_images(Arc::new(FailingImage))
        .with_video(Arc::new(FailingVideo));
    let (orchestrator, calls) = Harness::new()
        .tool("creation_of_a_post", vec![created("1001")])
        .tool("upload_media", vec![created("m-1")])
        .build(enricher);

    let result = orchestrator.run_query("post a new tweet: check this out").await;
    assert!(result.success);
    assert!(result.error.is_none());

    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|(name, _)| name != "upload_media"));
    assert!(!calls[0].1.params.contains_key("media_media_ids"));
}

#[tokio::test]
async fn test_generated_image_is_attached() {
    let enricher = Enricher::new().with_images(Arc::new(FixedImage));
    let (orchestrator, calls) = Harness::new()
        .tool("upload_media", vec![ToolOutput::success(json!({"data": {"id": 777}}))])
        .tool("creation_of_a_post", vec![created("1001")])
        .build(enricher);

    let result = orchestrator.run_query("post a new tweet: sleigh bells").await;
    assert!(result.success);

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].0, "upload_media");
    assert_eq!(calls[0].1.account.as_deref(), Some("ca_pub"));
    assert_eq!(calls[1].0, "creation_of_a_post");
    assert_eq!(calls[1].1.params["media_media_ids"], json!(["777"]));
}

#[tokio::test]
async fn test_failed_upload_still_publishes() {
    let enricher = Enricher::new().with_images(Arc::new(FixedImage));
    let (orchestrator, calls) = Harness::new()
        .tool("upload_media", vec![ToolOutput::failure("media too large")])
        .tool("creation_of_a_post", vec![created("1001")])
        .build(enricher);

    assert!(orchestrator.run_query("post a new tweet: sleigh bells").await.success);
    let calls = calls.lock().unwrap();
    let post = calls.iter().find(|(n, _)| n == "creation_of_a_post").unwrap();
    assert!(!post.1.params.contains_key("media_media_ids"));
}

#[tokio::test]
async fn test_auto_reply_failure_is_swallowed() {
    let (orchestrator, calls) = Harness::new()
        .tool(
            "creation_of_a_post",
            vec![created("1001"), ToolOutput::failure("duplicate content")],
        )
        .build(Enricher::new());

    let result = orchestrator.run_query("post a new tweet: check this out").await;
    assert!(result.success);
    assert_eq!(result.id().as_deref(), Some("1001"));
    assert_eq!(calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_post_has_no_auto_reply() {
    let (orchestrator, calls) = Harness::new()
        .tool("creation_of_a_post", vec![ToolOutput::failure("duplicate content")])
        .build(Enricher::new());

    let result = orchestrator.run_query("post a new tweet: check this out").await;
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("duplicate content"));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_publish_ignores_trigger_words() {
    let (orchestrator, calls) = Harness::new()
        .tool("recent_search", vec![ToolOutput::success(json!({"data": []}))])
        .tool("creation_of_a_post", vec![created("4004"), created("4005")])
        .build(Enricher::new());

    let idea = "just found Gift Finder Pro and it's perfect for the holidays";
    let result = orchestrator.publish(idea).await;
    assert!(result.success);
    assert_eq!(result.id().as_deref(), Some("4004"));

    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|(name, _)| name == "creation_of_a_post"));
    assert_eq!(calls.len(), 2);
    assert!(calls[0].1.params["text"].as_str().unwrap().starts_with(idea));
    assert_eq!(calls[1].1.params["reply_in_reply_to_tweet_id"], "4004");
}

#[tokio::test]
async fn test_cancelled_video_still_publishes() {
    let cancel = CancellationToken::new();
    let chain = VideoChain::new(vec![Arc::new(StalledProvider) as Arc<dyn VideoProvider>])
        .with_cancellation(cancel.clone());
    let (orchestrator, calls) = Harness::new()
        .tool("creation_of_a_post", vec![created("5005")])
        .build(Enricher::new().with_video(Arc::new(chain)));
    let orchestrator = orchestrator.with_cancellation(cancel);

    let trigger = orchestrator.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        trigger.cancel();
    });

    let result = orchestrator.run_query("post a new tweet: reindeer games").await;
    assert!(result.success);
    assert_eq!(calls.lock().unwrap()[0].0, "creation_of_a_post");
}

#[tokio::test]
async fn test_reply_has_no_auto_reply() {
    let (orchestrator, calls) = Harness::new()
        .tool("creation_of_a_post", vec![created("2002")])
        .build(Enricher::new());

    let result = orchestrator.run_query("reply 1867 so festive").await;
    assert!(result.success);

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.params["reply_in_reply_to_tweet_id"], "1867");
    assert!(calls[0].1.params["text"]
        .as_str()
        .unwrap()
        .starts_with("so festive "));
}

#[tokio::test]
async fn test_poll_skips_enrichment() {
    let enricher = Enricher::new().with_images(Arc::new(FixedImage));
    let (orchestrator, calls) = Harness::new()
        .tool("upload_media", vec![created("m-1")])
        .tool("creation_of_a_post", vec![created("3003")])
        .build(enricher);

    let result = orchestrator
        .run_query("create a poll: Pick one? Cocoa, Cider, Eggnog")
        .await;
    assert!(result.success);

    let calls = calls.lock().unwrap();
    assert!(calls.iter().all(|(name, _)| name != "upload_media"));

    let post = &calls[0].1;
    let text = post.params["text"].as_str().unwrap();
    assert!(text.starts_with("Pick one? "));
    assert!(!text.contains(DEFAULT_PROMO_LINK));
    assert_eq!(post.params["poll"]["options"], json!(["Cocoa", "Cider", "Eggnog"]));
}

#[tokio::test]
async fn test_retweet_without_id_makes_no_call() {
    let (orchestrator, calls) = Harness::new()
        .tool("user_lookup_me", vec![created("u1")])
        .tool("retweet_post", vec![ToolOutput::success(json!({}))])
        .build(Enricher::new());

    let result = orchestrator.run_query("retweet").await;
    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Retweet requested but no tweet ID was found in the query.")
    );
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dm_parameters() {
    let (orchestrator, calls) = Harness::new()
        .tool("send_dm_user", vec![ToolOutput::success(json!({"dm_event_id": "9"}))])
        .build(Enricher::new());

    assert!(orchestrator.run_query("dm 555 hello there").await.success);

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].1.params["participant_id"], "555");
    assert_eq!(calls[0].1.params["text"], "hello there");
    assert_eq!(calls[0].1.account.as_deref(), Some("ca_conn"));
}

#[tokio::test]
async fn test_search_wins_over_other_triggers() {
    let (orchestrator, calls) = Harness::new()
        .tool("recent_search", vec![ToolOutput::success(json!({"data": []}))])
        .build(Enricher::new());

    let query = "search for retweet 1867 and like";
    let result = orchestrator.run_query(query).await;
    assert!(result.success);
    assert!(result.analysis(query).starts_with("Query: search for retweet 1867 and like\n\nTwitter Results:\n"));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.params["query"], "retweet 1867 and like");
}

#[tokio::test]
async fn test_unknown_intent() {
    let (orchestrator, calls) = Harness::new()
        .tool("post_lookup_by_post_id", vec![ToolOutput::success(json!({}))])
        .build(Enricher::new());

    let result = orchestrator.run_query("hello santa").await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("Could not determine intent."));
    assert!(calls.lock().unwrap().is_empty());

    let with_account = Instruction::new("hello santa").with_account("42");
    assert!(orchestrator.run(&with_account).await.success);
    assert_eq!(calls.lock().unwrap()[0].1.params["id"], "42");
}
