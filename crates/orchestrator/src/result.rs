//! Normalized run results.

use serde::Serialize;
use serde_json::Value;
use social_tools::ToolOutput;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    /// External response payload, opaque to the bot.
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResult {
    /// Successful result carrying `payload`.
    pub fn success(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    /// Failed result with a descriptive message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Trust the endpoint's own success flag; missing fields are not an error.
    pub fn from_output(output: ToolOutput) -> Self {
        if output.successful {
            Self::success(output.data)
        } else {
            Self::failure(output.error_text())
        }
    }

    /// Id of the created or returned object, if the payload has one.
    pub fn id(&self) -> Option<String> {
        ToolOutput::success(self.payload.clone()).id()
    }

    /// Human-readable summary of the run.
    pub fn analysis(&self, query: &str) -> String {
        if self.success {
            let pretty =
                serde_json::to_string_pretty(&self.payload).unwrap_or_else(|_| self.payload.to_string());
            format!("Query: {}\n\nTwitter Results:\n{}", query, pretty)
        } else {
            format!(
                "Query: {}\n\nError: {}",
                query,
                self.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}
