//! Title and description for uploaded videos.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::gemini::GeminiClient;

/// Title used when the model gives nothing usable.
pub const FALLBACK_TITLE: &str = "Holiday Magic with Santa's Spot";

/// Longest title accepted from the model before falling back.
const MAX_TITLE_CHARS: usize = 100;

/// Default long-form description. `{post}` and `{link}` are substituted.
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str = "{post}

🎅 Try SantaSpot, the holiday giveaway & referral app.
Win prizes, support small creators and invite friends to earn rewards.
👉 {link}

Explore more AI tools and products:
https://consumerai.info
https://disputeai.xyz
https://fdwa.site
https://linktr.ee/omniai";

/// Title and description for a video upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
}

/// Produces upload metadata for a post. Never fails.
#[async_trait]
pub trait MetadataGenerator: Send + Sync {
    async fn generate(&self, post_text: &str) -> VideoMetadata;
}

/// Metadata generator that asks a Gemini text model for the title.
pub struct GeminiMetadataGenerator {
    client: Arc<GeminiClient>,
    link: String,
    template: String,
}

impl GeminiMetadataGenerator {
    /// Create a generator that points descriptions at `link`.
    pub fn new(client: Arc<GeminiClient>, link: impl Into<String>) -> Self {
        Self {
            client,
            link: link.into(),
            template: DEFAULT_DESCRIPTION_TEMPLATE.to_string(),
        }
    }

    /// Override the description template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    fn description(&self, post_text: &str) -> String {
        self.template
            .replace("{post}", post_text)
            .replace("{link}", &self.link)
    }

    /// Description used when the model call fails.
    pub fn fallback(&self, post_text: &str) -> VideoMetadata {
        VideoMetadata {
            title: FALLBACK_TITLE.to_string(),
            description: format!(
                "{}\n\nVisit {} for more holiday magic!",
                post_text, self.link
            ),
        }
    }
}

/// Build the title prompt for a post.
pub fn title_prompt(post_text: &str) -> String {
    format!(
        "Create a catchy YouTube title (max 60 chars, NO URLs) for this video topic:\n\n\
         TOPIC: {}\n\n\
         OUTPUT ONLY the title, nothing else.",
        post_text
    )
}

/// Accept a model title or fall back; result is at most 100 chars.
pub fn normalize_title(raw: &str) -> String {
    let title = raw.trim().trim_matches('"').trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return FALLBACK_TITLE.to_string();
    }
    title.chars().take(MAX_TITLE_CHARS).collect()
}

#[async_trait]
impl MetadataGenerator for GeminiMetadataGenerator {
    async fn generate(&self, post_text: &str) -> VideoMetadata {
        match self.client.generate_text(&title_prompt(post_text), 0.7).await {
            Ok(raw) => {
                let title = normalize_title(&raw);
                info!("Generated title: {}", title);
                VideoMetadata {
                    title,
                    description: self.description(post_text),
                }
            }
            Err(e) => {
                error!("Failed to generate metadata: {}", e);
                self.fallback(post_text)
            }
        }
    }
}
