//! Error types for orchestrator operations.

use media_pipeline::MediaError;
use social_tools::ToolError;
use thiserror::Error;

/// An intent was recognized but the instruction lacks a required parameter.
///
/// The display text is the user-facing explanation returned in the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Retweet requested but no tweet ID was found in the query.")]
    MissingRetweetId,

    #[error("Like requested but no tweet ID was found in the query.")]
    MissingLikeId,

    #[error("DM requested but no recipient user ID was found. Use 'dm <user_id> <message>' format.")]
    MissingRecipient,

    #[error("DM requested but no message text provided.")]
    MissingMessageText,

    #[error("Could not determine intent. Please ask to 'search', 'lookup <id>', 'retweet <id>', 'like <id>', 'dm <user_id> <message>' or 'reply <tweet_id> <text>'.")]
    UnknownIntent,
}

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Required credentials or settings are missing.
    #[error("{0}")]
    Configuration(String),

    /// Parameter extraction failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The authenticated account could not be resolved.
    #[error("{0}")]
    ActorUnresolved(String),

    /// Capability answered without the expected result.
    #[error("{0}")]
    CallFailed(String),

    /// Capability call failed before producing a response.
    #[error("tool execution failed: {0}")]
    Tool(#[from] ToolError),

    /// Media client construction failed.
    #[error("media setup failed: {0}")]
    Media(#[from] MediaError),
}
