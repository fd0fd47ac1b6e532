//! Post drafts and poll extraction.

use std::path::PathBuf;

use serde::Serialize;

use crate::classifier::PublishKind;

/// Poll duration attached to every poll (one day).
pub const POLL_DURATION_MINUTES: u32 = 1440;

/// Maximum number of poll options the platform accepts.
pub const MAX_POLL_OPTIONS: usize = 4;

/// Structured poll attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollSpec {
    /// Question including its trailing `?`.
    pub question: String,
    /// Two to four non-empty options.
    pub options: Vec<String>,
    pub duration_minutes: u32,
}

/// Split `"Question? A, B, C"` into a poll.
///
/// Returns `None` unless at least two non-empty options follow the first `?`.
/// Options beyond the fourth are dropped.
pub fn extract_poll(text: &str) -> Option<PollSpec> {
    let (question, rest) = text.split_once('?')?;
    let options: Vec<String> = rest
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .take(MAX_POLL_OPTIONS)
        .map(str::to_string)
        .collect();

    if options.len() < 2 {
        return None;
    }

    Some(PollSpec {
        question: format!("{}?", question.trim()),
        options,
        duration_minutes: POLL_DURATION_MINUTES,
    })
}

/// Truncate to `limit` characters, ending with `...` when anything was cut.
pub fn truncate_to_limit(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// A post being assembled for publishing.
///
/// Built from extracted instruction text, then decorated by the synthesizer
/// and enriched with media before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub kind: PublishKind,
    /// Instruction text the post was built from, before decoration.
    pub source: String,
    /// Text that will be published.
    pub body: String,
    /// Uniqueness token embedded in the body, once decorated.
    pub token: Option<u32>,
    /// Post being replied to.
    pub reply_to: Option<String>,
    /// Platform media ids to attach.
    pub media_ids: Vec<String>,
    /// Local generated image, if any.
    pub image: Option<PathBuf>,
    /// Local generated video, if any.
    pub video: Option<PathBuf>,
    pub poll: Option<PollSpec>,
    /// Hard character limit for `body`.
    pub char_limit: usize,
}

impl PostDraft {
    /// Create an undecorated draft.
    pub fn new(kind: PublishKind, source: impl Into<String>, reply_to: Option<String>) -> Self {
        let source = source.into();
        Self {
            kind,
            body: source.clone(),
            source,
            token: None,
            reply_to,
            media_ids: Vec::new(),
            image: None,
            video: None,
            poll: None,
            char_limit: usize::MAX,
        }
    }

    /// Whether this draft creates a new top-level post.
    pub fn is_top_level(&self) -> bool {
        self.reply_to.is_none()
    }

    /// Attach a poll parsed from the source text.
    ///
    /// On success the body becomes the question plus the uniqueness token.
    /// With fewer than two options nothing changes and `false` is returned.
    pub fn attach_poll(&mut self) -> bool {
        let Some(poll) = extract_poll(&self.source) else {
            return false;
        };

        let body = match self.token {
            Some(token) => format!("{} {}", poll.question, token),
            None => poll.question.clone(),
        };
        self.body = truncate_to_limit(&body, self.char_limit);
        self.poll = Some(poll);
        true
    }
}
