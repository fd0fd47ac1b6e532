//! Image generation from post text.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::info;

use crate::error::MediaError;
use crate::gemini::GeminiClient;
use crate::storage::TempStore;

/// Produces a local image file for a post.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate an image for `post_text`; `token` is the post's uniqueness token.
    async fn generate(&self, post_text: &str, token: u32) -> Result<PathBuf, MediaError>;
}

/// Build the image prompt for a post.
pub fn image_prompt(post_text: &str) -> String {
    format!(
        "Create a vibrant, eye-catching square social media image for this post. \
         Bright festive colors, clean composition, no text or logos in the image.\n\n\
         POST: {}",
        post_text
    )
}

/// Image generator backed by a Gemini image model.
pub struct GeminiImageGenerator {
    client: Arc<GeminiClient>,
    store: TempStore,
}

impl GeminiImageGenerator {
    /// Create a generator that writes into `store`.
    pub fn new(client: Arc<GeminiClient>, store: TempStore) -> Self {
        Self { client, store }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate(&self, post_text: &str, token: u32) -> Result<PathBuf, MediaError> {
        let prompt = image_prompt(post_text);
        info!("Generated image prompt: {}", prompt);

        let encoded = self.client.generate_image(&prompt).await?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| MediaError::Decode(format!("invalid base64 image: {}", e)))?;

        let path = self.store.save_image(token, &bytes).await?;
        info!("Saved generated image to {}", path.display());
        Ok(path)
    }
}
