//! Gemini API request and response types.

use serde::{Deserialize, Serialize};

/// A content block in a generateContent exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Role: "user" or "model"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a user content block holding a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// One part of a content block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline binary payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Base64-encoded inline data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME type, e.g. "image/png"
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// Generation settings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Output modalities, e.g. ["TEXT", "IMAGE"]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
}

/// generateContent request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation contents
    pub contents: Vec<Content>,
    /// Generation settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// generateContent response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    /// Response candidates
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// All parts of the first candidate.
    pub fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        }
    }

    /// First inline image of the first candidate.
    pub fn first_image(&self) -> Option<&InlineData> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.mime_type.starts_with("image/"))
    }
}

/// A response candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    /// Candidate content
    #[serde(default)]
    pub content: Option<Content>,
}

/// Reference image for video generation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImage {
    /// Base64-encoded image bytes
    pub bytes_base64_encoded: String,
    /// MIME type of the image
    pub mime_type: String,
}

/// One video generation instance.
#[derive(Debug, Clone, Serialize)]
pub struct VideoInstance {
    /// Text prompt
    pub prompt: String,
    /// Optional reference image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<VideoImage>,
}

/// Video generation parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    /// Aspect ratio, e.g. "9:16"
    pub aspect_ratio: String,
    /// Resolution, e.g. "720p"
    pub resolution: String,
    /// Clip length in seconds
    pub duration_seconds: u32,
    /// Person generation policy
    pub person_generation: String,
}

impl Default for VideoParameters {
    fn default() -> Self {
        Self {
            aspect_ratio: "9:16".to_string(),
            resolution: "720p".to_string(),
            duration_seconds: 8,
            person_generation: "allow_all".to_string(),
        }
    }
}

/// predictLongRunning request.
#[derive(Debug, Clone, Serialize)]
pub struct PredictVideoRequest {
    /// Generation instances (one per clip)
    pub instances: Vec<VideoInstance>,
    /// Shared parameters
    pub parameters: VideoParameters,
}

/// A long-running operation.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    /// Operation resource name
    pub name: String,
    /// Completion flag
    #[serde(default)]
    pub done: bool,
    /// Result once done
    #[serde(default)]
    pub response: Option<OperationResponse>,
    /// Error once done, if the operation failed
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl Operation {
    /// URI of the first generated video.
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }
}

/// Operation result payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Video generation result
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

/// Video generation result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    /// Generated samples
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

/// One generated sample.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSample {
    /// Video file reference
    #[serde(default)]
    pub video: Option<VideoFile>,
}

/// Remote video file reference.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    /// Download URI
    #[serde(default)]
    pub uri: Option<String>,
}

/// Error body as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Numeric code
    #[serde(default)]
    pub code: i32,
    /// Error message
    #[serde(default)]
    pub message: String,
}

/// Top-level error envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorBody,
}
