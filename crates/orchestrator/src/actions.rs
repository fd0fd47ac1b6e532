//! Parameter extraction: instruction + intent → action request.
//!
//! Extraction is pure. Every failure here happens before any external call.

use crate::classifier::{Intent, PublishKind, NEW_POST_MARKER, POLL_MARKER};
use crate::draft::PostDraft;
use crate::error::ExtractError;
use crate::instruction::Instruction;

/// Results requested from a recent search.
pub const SEARCH_MAX_RESULTS: u32 = 50;

/// Fields requested for each search hit.
pub const SEARCH_TWEET_FIELDS: &str = "created_at,public_metrics,text";

/// A classified instruction with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionRequest {
    Search { query: String },
    LookupOne { id: String },
    LookupMany { ids: Vec<String> },
    Retweet { tweet_id: String },
    Like { tweet_id: String },
    DirectMessage { recipient: String, text: String },
    Publish(PostDraft),
    /// Unknown intent with a supplied account id: look the account up.
    AccountLookup { account_id: String },
}

impl ActionRequest {
    /// Intent this request was built for.
    pub fn intent(&self) -> Intent {
        match self {
            Self::Search { .. } => Intent::Search,
            Self::LookupOne { .. } | Self::LookupMany { .. } => Intent::Lookup,
            Self::Retweet { .. } => Intent::Retweet,
            Self::Like { .. } => Intent::Like,
            Self::DirectMessage { .. } => Intent::DirectMessage,
            Self::Publish(draft) => Intent::Publish(draft.kind),
            Self::AccountLookup { .. } => Intent::Unknown,
        }
    }
}

/// Search term: text after "search for", else after "find", else everything.
pub fn search_term(instruction: &Instruction) -> String {
    instruction
        .text_after("search for")
        .or_else(|| instruction.text_after("find"))
        .unwrap_or_else(|| instruction.text())
        .to_string()
}

/// Text following the first occurrence of `id` as a whitespace token.
fn text_after_token(text: &str, id: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let pos = tokens.iter().position(|t| *t == id)?;
    Some(tokens[pos + 1..].join(" "))
}

/// Post text with command prefixes removed.
pub fn publish_text(instruction: &Instruction, ids: &[&str]) -> String {
    if let Some(text) = instruction.text_after(NEW_POST_MARKER) {
        return text.to_string();
    }
    if let Some(text) = instruction.text_after(POLL_MARKER) {
        return text.to_string();
    }
    if instruction.mentions("reply") {
        if let Some(text) = ids
            .first()
            .and_then(|id| text_after_token(instruction.text(), id))
        {
            return text;
        }
    }
    instruction.text().to_string()
}

/// Build the action request for a classified instruction.
pub fn extract(instruction: &Instruction, intent: Intent) -> Result<ActionRequest, ExtractError> {
    let ids = instruction.numeric_tokens();

    match intent {
        Intent::Search => Ok(ActionRequest::Search {
            query: search_term(instruction),
        }),

        Intent::Lookup => match ids.as_slice() {
            [id] => Ok(ActionRequest::LookupOne { id: id.to_string() }),
            [] => Err(ExtractError::UnknownIntent),
            many => Ok(ActionRequest::LookupMany {
                ids: many.iter().map(|id| id.to_string()).collect(),
            }),
        },

        Intent::Retweet => ids
            .first()
            .map(|id| ActionRequest::Retweet {
                tweet_id: id.to_string(),
            })
            .ok_or(ExtractError::MissingRetweetId),

        Intent::Like => ids
            .first()
            .map(|id| ActionRequest::Like {
                tweet_id: id.to_string(),
            })
            .ok_or(ExtractError::MissingLikeId),

        Intent::DirectMessage => {
            let recipient = ids.first().ok_or(ExtractError::MissingRecipient)?;
            let text = text_after_token(instruction.text(), recipient).unwrap_or_default();
            if text.is_empty() {
                return Err(ExtractError::MissingMessageText);
            }
            Ok(ActionRequest::DirectMessage {
                recipient: recipient.to_string(),
                text,
            })
        }

        Intent::Publish(kind) => {
            let reply_to = match kind {
                PublishKind::Reply => ids.first().map(|id| id.to_string()),
                PublishKind::Tweet | PublishKind::Poll => None,
            };
            let text = publish_text(instruction, &ids);
            Ok(ActionRequest::Publish(PostDraft::new(kind, text, reply_to)))
        }

        Intent::Unknown => instruction
            .account_id()
            .map(|account_id| ActionRequest::AccountLookup {
                account_id: account_id.to_string(),
            })
            .ok_or(ExtractError::UnknownIntent),
    }
}
