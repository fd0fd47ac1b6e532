//! HTTP client for the Gemini generative API.

use std::env;
use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::api_types::{
    ApiError, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    Operation, PredictVideoRequest,
};
use crate::error::MediaError;

/// Default Gemini API URL.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default HTTP timeout for API requests (120 seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// API URL.
    pub api_url: String,
    /// Model for prompt rewriting and titles.
    pub text_model: String,
    /// Model that can answer with inline images.
    pub image_model: String,
    /// HTTP timeout for a single request.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_GEMINI_API_URL.to_string(),
            text_model: "gemini-2.5-flash-lite".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GOOGLE_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `GEMINI_API_URL` - API URL (default: generativelanguage.googleapis.com)
    /// - `GEMINI_TEXT_MODEL` - Text model (default: gemini-2.5-flash-lite)
    /// - `GEMINI_IMAGE_MODEL` - Image model (default: gemini-2.5-flash-image)
    pub fn from_env() -> Result<Self, MediaError> {
        let api_key = env::var("GOOGLE_API_KEY")
            .map_err(|_| MediaError::Configuration("GOOGLE_API_KEY not set".to_string()))?;

        let defaults = Self::default();
        Ok(Self {
            api_key,
            api_url: env::var("GEMINI_API_URL").unwrap_or(defaults.api_url),
            text_model: env::var("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
            timeout: defaults.timeout,
        })
    }

    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Override the API URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Thin client over the generateContent and long-running video endpoints.
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client.
    pub fn new(config: GeminiConfig) -> Result<Self, MediaError> {
        if config.api_key.is_empty() {
            return Err(MediaError::Configuration("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MediaError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self, MediaError> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Turn a non-success response into an [`MediaError::Api`].
    async fn check(response: Response) -> Result<Response, MediaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&error_text)
            .map(|e| e.error.message)
            .unwrap_or(error_text);

        warn!("Gemini API error ({}): {}", status.as_u16(), message);
        Err(MediaError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, MediaError> {
        let url = self.url(&format!("models/{}:generateContent", model));
        debug!("Sending generateContent request to {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Generate text from a prompt with the text model.
    pub async fn generate_text(&self, prompt: &str, temperature: f32) -> Result<String, MediaError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: Some(temperature),
                response_modalities: None,
            }),
        };

        self.generate_content(&self.config.text_model, &request)
            .await?
            .text()
            .ok_or_else(|| MediaError::NoOutput("model returned no text".to_string()))
    }

    /// Generate an image; returns the base64 payload of the first image part.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, MediaError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: Some(GenerationConfig {
                temperature: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        let response = self
            .generate_content(&self.config.image_model, &request)
            .await?;

        response
            .first_image()
            .map(|image| image.data.clone())
            .ok_or_else(|| MediaError::NoOutput("model returned no image".to_string()))
    }

    /// Start a long-running video generation; returns the operation.
    pub async fn start_video(
        &self,
        model: &str,
        request: &PredictVideoRequest,
    ) -> Result<Operation, MediaError> {
        let url = self.url(&format!("models/{}:predictLongRunning", model));
        debug!("Starting video generation with {}", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the current state of a long-running operation.
    pub async fn get_operation(&self, name: &str) -> Result<Operation, MediaError> {
        let response = self
            .client
            .get(self.url(name))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Download a generated file.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, MediaError> {
        let response = self
            .client
            .get(uri)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await?;

        Ok(Self::check(response).await?.bytes().await?.to_vec())
    }
}
