//! Action dispatch: one request, one capability call.
//!
//! The dispatcher never retries and never batches. Engagements (retweet,
//! like) first resolve the authenticated account; that lookup failing ends
//! the request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use social_tools::{ToolOutput, ToolRegistry, TwitterAction};
use tracing::{debug, info, warn};

use crate::actions::{ActionRequest, SEARCH_MAX_RESULTS, SEARCH_TWEET_FIELDS};
use crate::classifier::PublishKind;
use crate::draft::PostDraft;
use crate::error::OrchestratorError;
use crate::result::ActionResult;

/// Connected accounts the dispatcher acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounts {
    /// Account for lookups, search, engagements and messages.
    pub connection: String,
    /// Account for post creation and media upload.
    pub publisher: String,
}

impl Accounts {
    /// Use the same account for everything.
    pub fn single(account: impl Into<String>) -> Self {
        let account = account.into();
        Self {
            connection: account.clone(),
            publisher: account,
        }
    }
}

type Params = HashMap<String, Value>;

fn params<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Creation parameters for a finished draft.
pub fn publish_params(draft: &PostDraft) -> Params {
    let mut p = params([("text", json!(draft.body))]);
    if let Some(reply_to) = &draft.reply_to {
        p.insert("reply_in_reply_to_tweet_id".to_string(), json!(reply_to));
    }
    if !draft.media_ids.is_empty() {
        p.insert("media_media_ids".to_string(), json!(draft.media_ids));
    }
    if let Some(poll) = &draft.poll {
        p.insert(
            "poll".to_string(),
            json!({
                "options": poll.options,
                "duration_minutes": poll.duration_minutes,
            }),
        );
    }
    p
}

/// Maps action requests onto capability calls.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    accounts: Accounts,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, accounts: Accounts) -> Self {
        Self { registry, accounts }
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    async fn call(
        &self,
        action: TwitterAction,
        params: Params,
        account: &str,
    ) -> Result<ToolOutput, OrchestratorError> {
        debug!("Calling {} as {}", action.name(), account);
        Ok(self
            .registry
            .execute(action.name(), params, Some(account))
            .await?)
    }

    /// Resolve the authenticated account's user id.
    async fn resolve_actor(&self) -> Result<String, OrchestratorError> {
        let me = self
            .call(TwitterAction::UserLookupMe, Params::new(), &self.accounts.connection)
            .await?;

        if !me.successful {
            return Err(OrchestratorError::ActorUnresolved(format!(
                "Failed to get authenticated user: {}",
                me.error_text()
            )));
        }

        me.id().ok_or_else(|| {
            OrchestratorError::ActorUnresolved("Could not retrieve authenticated user ID.".to_string())
        })
    }

    async fn engage(&self, action: TwitterAction, tweet_id: &str) -> Result<ToolOutput, OrchestratorError> {
        let user_id = self.resolve_actor().await?;
        self.call(
            action,
            params([("id", json!(user_id)), ("tweet_id", json!(tweet_id))]),
            &self.accounts.connection,
        )
        .await
    }

    async fn try_dispatch(&self, request: &ActionRequest) -> Result<ToolOutput, OrchestratorError> {
        let connection = self.accounts.connection.as_str();

        match request {
            ActionRequest::Search { query } => {
                self.call(
                    TwitterAction::RecentSearch,
                    params([
                        ("query", json!(query)),
                        ("max_results", json!(SEARCH_MAX_RESULTS)),
                        ("tweet_fields", json!(SEARCH_TWEET_FIELDS)),
                    ]),
                    connection,
                )
                .await
            }

            ActionRequest::LookupOne { id } => {
                self.call(
                    TwitterAction::PostLookupById,
                    params([("id", json!(id))]),
                    connection,
                )
                .await
            }

            ActionRequest::LookupMany { ids } => {
                self.call(
                    TwitterAction::PostLookupByIds,
                    params([("ids", json!(ids))]),
                    connection,
                )
                .await
            }

            ActionRequest::Retweet { tweet_id } => {
                self.engage(TwitterAction::RetweetPost, tweet_id).await
            }

            ActionRequest::Like { tweet_id } => self.engage(TwitterAction::LikePost, tweet_id).await,

            ActionRequest::DirectMessage { recipient, text } => {
                self.call(
                    TwitterAction::SendDmToUser,
                    params([("participant_id", json!(recipient)), ("text", json!(text))]),
                    connection,
                )
                .await
            }

            ActionRequest::Publish(draft) => {
                let mut draft = draft.clone();
                if draft.kind == PublishKind::Poll && draft.poll.is_none() && !draft.attach_poll() {
                    info!("Poll needs at least two options, posting as plain text");
                }
                self.call(
                    TwitterAction::CreatePost,
                    publish_params(&draft),
                    &self.accounts.publisher,
                )
                .await
            }

            ActionRequest::AccountLookup { account_id } => {
                self.call(
                    TwitterAction::PostLookupById,
                    params([("id", json!(account_id))]),
                    connection,
                )
                .await
            }
        }
    }

    /// Execute a request and normalize the outcome. Never fails.
    pub async fn dispatch(&self, request: &ActionRequest) -> ActionResult {
        match self.try_dispatch(request).await {
            Ok(output) => {
                if !output.successful {
                    warn!("{} call failed: {}", request.intent(), output.error_text());
                }
                ActionResult::from_output(output)
            }
            Err(e) => {
                warn!("{} dispatch failed: {}", request.intent(), e);
                ActionResult::failure(e.to_string())
            }
        }
    }

    /// Upload a local image to the platform and return its media id.
    pub async fn upload_media(&self, path: &Path) -> Result<String, OrchestratorError> {
        let media = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let output = self
            .call(
                TwitterAction::UploadMedia,
                params([
                    ("media", json!(media.to_string_lossy())),
                    ("media_category", json!("tweet_image")),
                ]),
                &self.accounts.publisher,
            )
            .await?;

        if !output.successful {
            return Err(OrchestratorError::CallFailed(format!(
                "media upload failed: {}",
                output.error_text()
            )));
        }

        output.id().ok_or_else(|| {
            OrchestratorError::CallFailed("media upload returned no media id".to_string())
        })
    }
}
