//! Content decoration for outgoing posts.
//!
//! Decoration is an ordered pipeline. Each stage is a no-op when its target
//! is already in the body, so decorating twice changes nothing:
//!
//! 1. uniqueness token (kept only if the draft recorded it and the body
//!    still carries it; numbers the author wrote never count)
//! 2. promotional link
//! 3. one emoji from the allowed set
//! 4. hashtags from the allowed set
//! 5. truncation to the character limit (always last)

use std::env;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::classifier::PublishKind;
use crate::draft::{truncate_to_limit, PostDraft};

/// Default promotional link.
pub const DEFAULT_PROMO_LINK: &str = "https://santaspot.xyz";

/// Default platform character limit.
pub const DEFAULT_CHAR_LIMIT: usize = 280;

/// Rules applied by the [`Synthesizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationRules {
    /// Link every post must carry.
    pub link: String,
    /// Allowed emojis; one is appended if none is present.
    pub emojis: Vec<String>,
    /// Allowed hashtags; appended if none is present.
    pub hashtags: Vec<String>,
    /// How many hashtags to append.
    pub hashtag_count: usize,
    /// Hard character limit.
    pub char_limit: usize,
    /// Range the uniqueness token is drawn from.
    pub token_range: RangeInclusive<u32>,
}

impl Default for DecorationRules {
    fn default() -> Self {
        Self {
            link: DEFAULT_PROMO_LINK.to_string(),
            emojis: ["🎄", "❄️", "🎅", "🦌"].iter().map(|e| e.to_string()).collect(),
            hashtags: vec!["#SantaSpot".to_string(), "#Holidays".to_string()],
            hashtag_count: 2,
            char_limit: DEFAULT_CHAR_LIMIT,
            token_range: 1000..=9999,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl DecorationRules {
    /// Create rules from environment variables.
    ///
    /// Optional environment variables:
    /// - `PROMO_LINK` - Link appended to every post
    /// - `PROMO_EMOJIS` - Comma or space separated emoji set
    /// - `PROMO_HASHTAGS` - Comma or space separated hashtag set
    /// - `POST_CHAR_LIMIT` - Character limit (default: 280)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let emojis = env::var("PROMO_EMOJIS")
            .map(|v| split_list(&v))
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.emojis);
        let hashtags = env::var("PROMO_HASHTAGS")
            .map(|v| split_list(&v))
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.hashtags);

        Self {
            link: env::var("PROMO_LINK")
                .ok()
                .filter(|l| !l.is_empty())
                .unwrap_or(defaults.link),
            emojis,
            hashtags,
            hashtag_count: defaults.hashtag_count,
            char_limit: env::var("POST_CHAR_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n >= MIN_CHAR_LIMIT)
                .unwrap_or(defaults.char_limit),
            token_range: defaults.token_range,
        }
    }

    /// Override the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Override the character limit. Limits below 4 leave no room for the
    /// ellipsis and are raised to 4.
    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit.max(MIN_CHAR_LIMIT);
        self
    }
}

/// Smallest limit that still fits a truncated body.
const MIN_CHAR_LIMIT: usize = 4;

/// Whether `token` appears as a standalone word in `body`.
fn carries_token(body: &str, token: u32) -> bool {
    let token = token.to_string();
    body.split_whitespace().any(|word| word == token)
}

/// Append `piece` to `body`, space-separated.
fn append(body: &mut String, piece: &str) {
    if !body.is_empty() && !body.ends_with(char::is_whitespace) {
        body.push(' ');
    }
    body.push_str(piece);
}

/// Decorates drafts according to [`DecorationRules`]. Never fails.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    rules: DecorationRules,
}

impl Synthesizer {
    pub fn new(rules: DecorationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &DecorationRules {
        &self.rules
    }

    /// Build a decorated top-level draft from raw text.
    pub fn synthesize(&self, raw: &str) -> PostDraft {
        let mut draft = PostDraft::new(PublishKind::Tweet, raw, None);
        self.decorate(&mut draft);
        draft
    }

    /// Decorate a draft in place using the thread RNG.
    pub fn decorate(&self, draft: &mut PostDraft) {
        self.decorate_with_rng(draft, &mut rand::thread_rng());
    }

    /// Decorate a draft in place.
    pub fn decorate_with_rng<R: Rng>(&self, draft: &mut PostDraft, rng: &mut R) {
        let rules = &self.rules;
        let mut body = draft.body.trim().to_string();

        let token = match draft.token {
            Some(token) if carries_token(&body, token) => token,
            _ => {
                let token = rng.gen_range(rules.token_range.clone());
                append(&mut body, &token.to_string());
                token
            }
        };

        if !rules.link.is_empty() && !body.contains(&rules.link) {
            append(&mut body, &rules.link);
        }

        if !rules.emojis.iter().any(|e| body.contains(e.as_str())) {
            if let Some(emoji) = rules.emojis.choose(rng) {
                append(&mut body, emoji);
            }
        }

        if !rules.hashtags.iter().any(|h| body.contains(h.as_str())) {
            let tags: Vec<&str> = rules
                .hashtags
                .iter()
                .take(rules.hashtag_count.max(1))
                .map(String::as_str)
                .collect();
            if !tags.is_empty() {
                append(&mut body, &tags.join(" "));
            }
        }

        draft.body = truncate_to_limit(&body, rules.char_limit);
        draft.token = Some(token);
        draft.char_limit = rules.char_limit;
    }
}
