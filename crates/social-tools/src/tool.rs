//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: HashMap<String, Value>,
    /// Connected account the call acts on behalf of, if any.
    pub account: Option<String>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: HashMap<String, Value>) -> Self {
        Self {
            params,
            account: None,
        }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }
}

/// Output from a capability endpoint.
///
/// Mirrors the `{successful, data, error}` envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the endpoint reported success.
    pub successful: bool,
    /// Response payload (opaque to the caller).
    #[serde(default)]
    pub data: Value,
    /// Error description when unsuccessful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(data: Value) -> Self {
        Self {
            successful: true,
            data,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            successful: false,
            data: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Look up an identifier in the payload.
    ///
    /// Endpoints answer either `{"id": ..}` or a wrapped `{"data": {"id": ..}}`;
    /// both shapes are accepted, and numeric ids are rendered as strings.
    pub fn id(&self) -> Option<String> {
        fn as_id(value: &Value) -> Option<String> {
            match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        }

        self.data
            .get("id")
            .and_then(as_id)
            .or_else(|| self.data.get("data")?.get("id").and_then(as_id))
    }

    /// Error text, or a generic message if the endpoint gave none.
    pub fn error_text(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Trait for capability endpoints that can be executed by the dispatcher.
///
/// Each tool wraps exactly one external action (post lookup, create post,
/// upload file, ...). Tools never retry; a failure is reported once.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}
