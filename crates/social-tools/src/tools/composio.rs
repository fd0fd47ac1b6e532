//! Composio action execution client.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Default Composio tool execution endpoint.
pub const DEFAULT_COMPOSIO_BASE_URL: &str = "https://backend.composio.dev/api/v3/tools/execute";

/// Default HTTP timeout for action calls (60 seconds).
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Configuration for the Composio client.
#[derive(Debug, Clone)]
pub struct ComposioConfig {
    /// API key sent as `x-api-key`.
    pub api_key: String,
    /// Base URL; the action slug is appended as the last path segment.
    pub base_url: String,
    /// HTTP timeout for a single action call.
    pub timeout: Duration,
}

impl Default for ComposioConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_COMPOSIO_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ComposioConfig {
    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Read configuration from the environment.
    ///
    /// - `COMPOSIO_API_KEY` - API key (empty if unset; checked by callers)
    /// - `COMPOSIO_BASE_URL` - Execution endpoint (default: Composio v3)
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("COMPOSIO_API_KEY").unwrap_or_default(),
            base_url: env::var("COMPOSIO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COMPOSIO_BASE_URL.to_string()),
            ..Self::default()
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Raw response envelope from the execution endpoint.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    successful: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<Value>,
}

impl From<ExecuteResponse> for ToolOutput {
    fn from(response: ExecuteResponse) -> Self {
        let error = response.error.and_then(|e| match e {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        });

        ToolOutput {
            successful: response.successful,
            data: response.data,
            error,
        }
    }
}

/// HTTP client for executing Composio actions.
pub struct ComposioClient {
    client: Client,
    config: ComposioConfig,
}

impl ComposioClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ComposioConfig) -> Result<Self, ToolError> {
        Url::parse(&config.base_url).map_err(|e| {
            ToolError::Configuration(format!("Invalid Composio base URL: {}", e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ToolError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Execute an action slug on behalf of `account`.
    pub async fn execute_slug(
        &self,
        slug: &str,
        params: &HashMap<String, Value>,
        account: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), slug);

        let mut payload = json!({ "connected_account_id": account });
        if !params.is_empty() {
            payload["arguments"] = json!(params);
        }

        debug!("Executing Composio action {} ({} arguments)", slug, params.len());

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ExecuteResponse>(&body) {
            Ok(parsed) => {
                let mut output = ToolOutput::from(parsed);
                if !status.is_success() {
                    warn!("Composio action {} returned status {}", slug, status);
                    output.successful = false;
                    if output.error.is_none() {
                        output.error = Some(format!("HTTP {}", status.as_u16()));
                    }
                }
                Ok(output)
            }
            Err(e) if status.is_success() => Err(ToolError::JsonError(e)),
            Err(_) => Err(ToolError::ExecutionFailed(format!(
                "Composio action {} returned status {}: {}",
                slug,
                status.as_u16(),
                body
            ))),
        }
    }
}

/// A single Composio action exposed as a registry tool.
pub struct ComposioAction {
    name: String,
    slug: String,
    description: String,
    client: Arc<ComposioClient>,
}

impl ComposioAction {
    /// Create an action tool with the given dispatch name and slug.
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
        client: Arc<ComposioClient>,
    ) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            description: description.into(),
            client,
        }
    }
}

#[async_trait]
impl Tool for ComposioAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        self.client
            .execute_slug(&self.slug, &args.params, args.account.as_deref())
            .await
    }
}
