//! Keyword-priority intent classification.
//!
//! Rules are evaluated top to bottom and the first match wins. The order is
//! load-bearing: instructions often contain several trigger words at once.
//!
//! | # | rule | intent |
//! |---|------|--------|
//! | 1 | "search" or "find" | `Search` |
//! | 2 | numeric token, and none of rules 3-6 match | `Lookup` |
//! | 3 | "retweet" | `Retweet` |
//! | 4 | "reply", "comment"+"tweet", "post"+"tweet", or "poll" | `Publish` |
//! | 5 | "like" or "favorite" | `Like` |
//! | 6 | "dm", "direct message" or "message user" | `DirectMessage` |
//! | 7 | anything else | `Unknown` |

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::instruction::Instruction;

/// Marker that forces a brand-new post even when the text contains numbers.
pub const NEW_POST_MARKER: &str = "post a new tweet:";

/// Marker that introduces poll text.
pub const POLL_MARKER: &str = "create a poll:";

/// What kind of post a publish instruction asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishKind {
    Tweet,
    Reply,
    Poll,
}

/// Action category derived from an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind", rename_all = "snake_case")]
pub enum Intent {
    Search,
    Lookup,
    Retweet,
    Like,
    DirectMessage,
    Publish(PublishKind),
    Unknown,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search"),
            Self::Lookup => write!(f, "lookup"),
            Self::Retweet => write!(f, "retweet"),
            Self::Like => write!(f, "like"),
            Self::DirectMessage => write!(f, "direct message"),
            Self::Publish(PublishKind::Tweet) => write!(f, "publish (tweet)"),
            Self::Publish(PublishKind::Reply) => write!(f, "publish (reply)"),
            Self::Publish(PublishKind::Poll) => write!(f, "publish (poll)"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

fn wants_search(i: &Instruction) -> bool {
    i.mentions("search") || i.mentions("find")
}

fn wants_retweet(i: &Instruction) -> bool {
    i.mentions("retweet")
}

fn wants_publish(i: &Instruction) -> bool {
    i.mentions("reply")
        || (i.mentions("comment") && i.mentions("tweet"))
        || (i.mentions("post") && i.mentions("tweet"))
        || i.mentions("poll")
}

fn wants_like(i: &Instruction) -> bool {
    i.mentions("like") || i.mentions("favorite")
}

fn wants_message(i: &Instruction) -> bool {
    i.mentions("dm") || i.mentions("direct message") || i.mentions("message user")
}

fn wants_lookup(i: &Instruction) -> bool {
    i.has_numeric_token()
        && !(wants_retweet(i) || wants_publish(i) || wants_like(i) || wants_message(i))
}

/// Sub-kind of a publish instruction.
pub fn publish_kind(i: &Instruction) -> PublishKind {
    if i.mentions("poll") {
        PublishKind::Poll
    } else if i.has_numeric_token() && !i.mentions(NEW_POST_MARKER) {
        PublishKind::Reply
    } else {
        PublishKind::Tweet
    }
}

fn as_search(_: &Instruction) -> Intent {
    Intent::Search
}

fn as_lookup(_: &Instruction) -> Intent {
    Intent::Lookup
}

fn as_retweet(_: &Instruction) -> Intent {
    Intent::Retweet
}

fn as_publish(i: &Instruction) -> Intent {
    Intent::Publish(publish_kind(i))
}

fn as_like(_: &Instruction) -> Intent {
    Intent::Like
}

fn as_message(_: &Instruction) -> Intent {
    Intent::DirectMessage
}

/// One (predicate, intent) pair of the priority chain.
struct Rule {
    name: &'static str,
    matches: fn(&Instruction) -> bool,
    intent: fn(&Instruction) -> Intent,
}

const RULES: &[Rule] = &[
    Rule {
        name: "search",
        matches: wants_search,
        intent: as_search,
    },
    Rule {
        name: "lookup",
        matches: wants_lookup,
        intent: as_lookup,
    },
    Rule {
        name: "retweet",
        matches: wants_retweet,
        intent: as_retweet,
    },
    Rule {
        name: "publish",
        matches: wants_publish,
        intent: as_publish,
    },
    Rule {
        name: "like",
        matches: wants_like,
        intent: as_like,
    },
    Rule {
        name: "direct_message",
        matches: wants_message,
        intent: as_message,
    },
];

/// Classify an instruction. Pure and deterministic.
pub fn classify(instruction: &Instruction) -> Intent {
    RULES
        .iter()
        .find(|rule| (rule.matches)(instruction))
        .map(|rule| {
            debug!("Intent rule '{}' matched", rule.name);
            (rule.intent)(instruction)
        })
        .unwrap_or(Intent::Unknown)
}
