//! Intent routing, post synthesis and publish orchestration.
//!
//! This crate provides the [`PublishOrchestrator`], which turns a free-text
//! instruction into exactly one capability call on the microblogging
//! platform, plus an optional follow-up reply.
//!
//! # Architecture
//!
//! ```text
//! Instruction ("post a new tweet: cocoa night")
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PUBLISH ORCHESTRATOR                      │
//! │                                                             │
//! │  1. Classify (ordered keyword rules)         classifier     │
//! │         ↓                                                   │
//! │  2. Extract parameters (pure)                actions        │
//! │         ↓                                                   │
//! │  3. Publish only:                                           │
//! │     • decorate: token, link, emoji, hashtags synthesizer    │
//! │     • enrich: image, video, uploads          enrichment     │
//! │         ↓                                                   │
//! │  4. Dispatch (one call, no retry)            dispatcher     │
//! │         ↓                                                   │
//! │  5. New top-level post: auto-reply                          │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! ActionResult { success, payload | error }
//! ```
//!
//! Enrichment and auto-reply are best-effort. Missing credentials, missing
//! parameters and failed calls all come back as a failed [`ActionResult`];
//! a run never panics or returns an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::PublishOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = PublishOrchestrator::from_env()?;
//!     let result = orchestrator.run_query("post a new tweet: cozy cocoa night").await;
//!     println!("{}", result.analysis("post a new tweet: cozy cocoa night"));
//!     Ok(())
//! }
//! ```

mod actions;
mod classifier;
mod config;
mod dispatcher;
mod draft;
mod enrichment;
mod error;
mod instruction;
mod orchestrator;
mod result;
mod synthesizer;

// Public exports
pub use actions::{extract, search_term, ActionRequest, SEARCH_MAX_RESULTS, SEARCH_TWEET_FIELDS};
pub use classifier::{classify, publish_kind, Intent, PublishKind, NEW_POST_MARKER, POLL_MARKER};
pub use config::{
    enricher_from_env, BotConfig, DEFAULT_TOOL_TIMEOUT, DEFAULT_VEO_MODEL, MISSING_CREDENTIALS,
};
pub use dispatcher::{publish_params, Accounts, Dispatcher};
pub use draft::{
    extract_poll, truncate_to_limit, PollSpec, PostDraft, MAX_POLL_OPTIONS, POLL_DURATION_MINUTES,
};
pub use enrichment::{Enricher, EnrichmentReport};
pub use error::{ExtractError, OrchestratorError};
pub use instruction::Instruction;
pub use orchestrator::{auto_reply_text, PublishOrchestrator};
pub use result::ActionResult;
pub use synthesizer::{DecorationRules, Synthesizer, DEFAULT_CHAR_LIMIT, DEFAULT_PROMO_LINK};

// Re-export commonly used types from dependencies
pub use media_pipeline::CancellationToken;
pub use social_tools::{Tool, ToolArgs, ToolError, ToolOutput, ToolRegistry};
