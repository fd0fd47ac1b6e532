//! Publish orchestrator implementation.

use std::sync::Arc;

use media_pipeline::CancellationToken;
use social_tools::{register_drive_actions, twitter_registry, ComposioClient, ToolRegistry};
use tracing::{debug, info, warn};

use crate::actions::{extract, ActionRequest};
use crate::classifier::{classify, Intent, PublishKind};
use crate::config::{enricher_from_env, BotConfig, MISSING_CREDENTIALS};
use crate::dispatcher::Dispatcher;
use crate::draft::PostDraft;
use crate::enrichment::Enricher;
use crate::error::OrchestratorError;
use crate::instruction::Instruction;
use crate::result::ActionResult;
use crate::synthesizer::Synthesizer;

/// Follow-up reply posted under every new top-level post.
pub fn auto_reply_text(link: &str) -> String {
    format!("Check out more holiday magic at {}! 🎅 #SantaSpot", link)
}

/// Runs one instruction end to end.
///
/// Classify → extract → (decorate, enrich) → dispatch → (auto-reply).
/// Runs are sequential; the orchestrator holds no state between them.
pub struct PublishOrchestrator {
    /// `None` when credentials are missing; every run then fails fast.
    dispatcher: Option<Dispatcher>,
    synthesizer: Synthesizer,
    enricher: Enricher,
    /// Fired to abort in-flight media generation.
    cancel: CancellationToken,
}

impl PublishOrchestrator {
    /// Create an orchestrator over an existing tool registry.
    pub fn new(registry: Arc<ToolRegistry>, config: &BotConfig) -> Self {
        let dispatcher = match config.accounts() {
            Ok(accounts) => Some(Dispatcher::new(registry, accounts)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        Self {
            dispatcher,
            synthesizer: Synthesizer::new(config.decoration.clone()),
            enricher: Enricher::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Create an orchestrator from environment variables.
    ///
    /// See [`BotConfig::from_env`] and [`enricher_from_env`] for the variables
    /// read. Missing credentials do not fail here; they fail each run.
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let config = BotConfig::from_env();
        let client = Arc::new(ComposioClient::new(config.composio.clone())?);

        let mut registry = twitter_registry(client.clone()).with_timeout(config.tool_timeout);
        if config.drive_connection.is_some() {
            register_drive_actions(&mut registry, client);
        }
        let registry = Arc::new(registry);

        let cancel = CancellationToken::new();
        let enricher = enricher_from_env(&config, registry.clone(), cancel.clone())?;
        Ok(Self::new(registry, &config)
            .with_enricher(enricher)
            .with_cancellation(cancel))
    }

    pub fn with_enricher(mut self, enricher: Enricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Synthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Share `cancel` with the media steps built for this orchestrator.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that aborts in-flight media generation when fired. The current
    /// run still publishes, without the aborted media.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether credentials are present.
    pub fn is_configured(&self) -> bool {
        self.dispatcher.is_some()
    }

    /// Run a plain-text instruction.
    pub async fn run_query(&self, query: &str) -> ActionResult {
        self.run(&Instruction::new(query)).await
    }

    /// Run one instruction. Never fails; errors are folded into the result.
    pub async fn run(&self, instruction: &Instruction) -> ActionResult {
        let Some(dispatcher) = &self.dispatcher else {
            return ActionResult::failure(MISSING_CREDENTIALS);
        };

        let intent = classify(instruction);
        info!(%intent, "Handling instruction");

        match extract(instruction, intent) {
            Ok(request) => self.execute(request, dispatcher).await,
            Err(e) => {
                info!("Parameter extraction failed: {}", e);
                ActionResult::failure(e.to_string())
            }
        }
    }

    /// Publish `text` as a new top-level post without classifying it.
    ///
    /// For callers that already know they want a post; words like "find" in
    /// the text cannot turn it into another action.
    pub async fn publish(&self, text: &str) -> ActionResult {
        let Some(dispatcher) = &self.dispatcher else {
            return ActionResult::failure(MISSING_CREDENTIALS);
        };

        info!(intent = %Intent::Publish(PublishKind::Tweet), "Publishing post");
        let draft = PostDraft::new(PublishKind::Tweet, text.trim(), None);
        self.execute(ActionRequest::Publish(draft), dispatcher).await
    }

    /// Prepare, dispatch, then auto-reply under new top-level posts.
    async fn execute(&self, request: ActionRequest, dispatcher: &Dispatcher) -> ActionResult {
        let request = match request {
            ActionRequest::Publish(mut draft) => {
                self.prepare(&mut draft, dispatcher).await;
                ActionRequest::Publish(draft)
            }
            other => other,
        };

        let result = dispatcher.dispatch(&request).await;

        if let ActionRequest::Publish(draft) = &request {
            if result.success && draft.is_top_level() {
                self.auto_reply(&result, dispatcher).await;
            }
        }

        result
    }

    /// Decorate, then enrich unless the draft is a poll.
    async fn prepare(&self, draft: &mut PostDraft, dispatcher: &Dispatcher) {
        self.synthesizer.decorate(draft);
        debug!("Decorated post: {}", draft.body);

        if draft.kind == PublishKind::Poll {
            return;
        }

        let report = self.enricher.enrich(draft, dispatcher).await;
        if !report.failures.is_empty() {
            info!(
                "Publishing with {} enrichment step(s) skipped",
                report.failures.len()
            );
        }
    }

    async fn auto_reply(&self, result: &ActionResult, dispatcher: &Dispatcher) {
        let Some(post_id) = result.id() else {
            debug!("Created post has no id, skipping auto-reply");
            return;
        };

        let text = auto_reply_text(&self.synthesizer.rules().link);
        let reply = PostDraft::new(PublishKind::Reply, text, Some(post_id.clone()));
        let outcome = dispatcher.dispatch(&ActionRequest::Publish(reply)).await;

        if outcome.success {
            info!("Auto-reply posted under {}", post_id);
        } else {
            warn!(
                "Auto-reply under {} failed: {}",
                post_id,
                outcome.error.as_deref().unwrap_or("Unknown error")
            );
        }
    }
}
