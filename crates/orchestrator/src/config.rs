//! Bot configuration.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use media_pipeline::{
    CancellationToken, DriveUploader, GeminiClient, GeminiImageGenerator, GeminiMetadataGenerator, PollPolicy,
    TempStore, UploadPostConfig, UploadPostUploader, VeoProvider, VideoChain, VideoProvider,
    WebhookUploader,
};
use social_tools::{ComposioConfig, ToolRegistry};
use tracing::{info, warn};

use crate::dispatcher::Accounts;
use crate::enrichment::Enricher;
use crate::error::OrchestratorError;
use crate::synthesizer::DecorationRules;

/// Default primary video model.
pub const DEFAULT_VEO_MODEL: &str = "veo-3.1-generate-preview";

/// Ceiling on a single capability call (default for `TOOL_TIMEOUT_SECS`).
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(120);

/// Returned when the capability endpoint cannot be used at all.
pub const MISSING_CREDENTIALS: &str =
    "Missing Composio API key or Twitter connection ID (env `COMPOSIO_API_KEY` or `TWITTER_CONNECTION_ID`).";

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Configuration for the publish orchestrator.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Capability endpoint settings.
    pub composio: ComposioConfig,
    /// Account used for lookups, search, engagements and messages.
    pub twitter_connection: Option<String>,
    /// Account used for post creation and media upload.
    pub twitter_account: Option<String>,
    /// Storage account for video archiving.
    pub drive_connection: Option<String>,
    /// Post decoration rules.
    pub decoration: DecorationRules,
    /// Ceiling on a single capability call.
    pub tool_timeout: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            composio: ComposioConfig::default(),
            twitter_connection: None,
            twitter_account: None,
            drive_connection: None,
            decoration: DecorationRules::default(),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

impl BotConfig {
    /// Create configuration from environment variables.
    ///
    /// Required for any run:
    /// - `COMPOSIO_API_KEY` - Capability endpoint API key
    /// - `TWITTER_CONNECTION_ID` - Connected microblogging account
    ///
    /// Optional:
    /// - `TWITTER_ACCOUNT_ID` - Publishing account (default: connection id)
    /// - `GOOGLEDRIVE_CONNECTION_ID` - Enables video archiving to storage
    /// - `PROMO_*`, `POST_CHAR_LIMIT` - see [`DecorationRules::from_env`]
    /// - `TOOL_TIMEOUT_SECS` - Ceiling on a single capability call (default: 120)
    ///
    /// Missing required values are reported by [`BotConfig::accounts`], not here,
    /// so that a misconfigured bot still produces a descriptive result.
    pub fn from_env() -> Self {
        Self {
            composio: ComposioConfig::from_env(),
            twitter_connection: non_empty("TWITTER_CONNECTION_ID"),
            twitter_account: non_empty("TWITTER_ACCOUNT_ID"),
            drive_connection: non_empty("GOOGLEDRIVE_CONNECTION_ID"),
            decoration: DecorationRules::from_env(),
            tool_timeout: non_empty("TOOL_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TOOL_TIMEOUT),
        }
    }

    /// Configuration with explicit credentials and default settings.
    pub fn new(api_key: impl Into<String>, connection: impl Into<String>) -> Self {
        Self {
            composio: ComposioConfig::new(api_key),
            twitter_connection: Some(connection.into()),
            ..Self::default()
        }
    }

    pub fn with_publisher(mut self, account: impl Into<String>) -> Self {
        self.twitter_account = Some(account.into());
        self
    }

    pub fn with_decoration(mut self, rules: DecorationRules) -> Self {
        self.decoration = rules;
        self
    }

    /// Acting accounts, or the configuration error if credentials are missing.
    pub fn accounts(&self) -> Result<Accounts, OrchestratorError> {
        let connection = match &self.twitter_connection {
            Some(c) if !self.composio.api_key.is_empty() => c.clone(),
            _ => return Err(OrchestratorError::Configuration(MISSING_CREDENTIALS.to_string())),
        };

        Ok(Accounts {
            publisher: self.twitter_account.clone().unwrap_or_else(|| connection.clone()),
            connection,
        })
    }
}

/// Build the media enricher from environment variables.
///
/// - `GOOGLE_API_KEY` (and the other `GEMINI_*` settings) enables image,
///   video and metadata generation
/// - `VEO_MODEL` / `VEO_FALLBACK_MODEL` - video provider chain
/// - `VIDEO_POLL_INTERVAL_SECS` / `VIDEO_POLL_MAX_ATTEMPTS` - polling ceiling
/// - `MEDIA_TEMP_DIR` - where generated files land
/// - `UPLOADPOST_*`, `MAKE_WEBHOOK_URL` and a storage connection enable uploads
///
/// Anything missing only disables the matching step. Firing `cancel` aborts
/// an in-flight video generation.
pub fn enricher_from_env(
    config: &BotConfig,
    registry: Arc<ToolRegistry>,
    cancel: CancellationToken,
) -> Result<Enricher, OrchestratorError> {
    let gemini = match GeminiClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(e) => {
            info!("Media enrichment disabled: {}", e);
            return Ok(Enricher::new());
        }
    };

    let store = TempStore::from_env();
    let poll = PollPolicy::from_env();

    let mut models = vec![non_empty("VEO_MODEL").unwrap_or_else(|| DEFAULT_VEO_MODEL.to_string())];
    if let Some(fallback) = non_empty("VEO_FALLBACK_MODEL") {
        models.push(fallback);
    }
    let providers: Vec<Arc<dyn VideoProvider>> = models
        .into_iter()
        .map(|model| {
            Arc::new(VeoProvider::new(gemini.clone(), model, poll, store.clone()))
                as Arc<dyn VideoProvider>
        })
        .collect();

    let mut enricher = Enricher::new()
        .with_images(Arc::new(GeminiImageGenerator::new(gemini.clone(), store)))
        .with_video(Arc::new(
            VideoChain::new(providers)
                .with_prompter(gemini.clone())
                .with_cancellation(cancel),
        ))
        .with_metadata(Arc::new(GeminiMetadataGenerator::new(
            gemini,
            config.decoration.link.clone(),
        )));

    if let Some(upload_post) = UploadPostConfig::from_env() {
        enricher = enricher.with_uploader(Arc::new(UploadPostUploader::new(upload_post)?));
    }

    if let Some(account) = &config.drive_connection {
        enricher = enricher.with_uploader(Arc::new(DriveUploader::new(registry, account.clone())));
    }

    match WebhookUploader::from_env() {
        Some(Ok(webhook)) => enricher = enricher.with_uploader(Arc::new(webhook)),
        Some(Err(e)) => warn!("Ignoring webhook uploader: {}", e),
        None => {}
    }

    Ok(enricher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "COMPOSIO_API_KEY",
        "TWITTER_CONNECTION_ID",
        "TWITTER_ACCOUNT_ID",
        "GOOGLEDRIVE_CONNECTION_ID",
        "TOOL_TIMEOUT_SECS",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_missing_credentials() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("COMPOSIO_API_KEY", "key");

        let err = BotConfig::from_env().accounts().unwrap_err();
        assert_eq!(err.to_string(), MISSING_CREDENTIALS);
        clear();
    }

    #[test]
    fn test_publisher_defaults_to_connection() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("COMPOSIO_API_KEY", "key");
        env::set_var("TWITTER_CONNECTION_ID", "ca_conn");
        env::set_var("TWITTER_ACCOUNT_ID", "  ");

        let accounts = BotConfig::from_env().accounts().unwrap();
        assert_eq!(accounts, Accounts::single("ca_conn"));

        env::set_var("TWITTER_ACCOUNT_ID", "ca_pub");
        let accounts = BotConfig::from_env().accounts().unwrap();
        assert_eq!(accounts.connection, "ca_conn");
        assert_eq!(accounts.publisher, "ca_pub");
        clear();
    }

    #[test]
    fn test_empty_api_key_is_missing() {
        let config = BotConfig::new("", "ca_conn");
        assert!(matches!(
            config.accounts(),
            Err(OrchestratorError::Configuration(_))
        ));
        assert!(BotConfig::new("key", "ca_conn").accounts().is_ok());
    }

    #[test]
    fn test_tool_timeout() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        assert_eq!(BotConfig::from_env().tool_timeout, DEFAULT_TOOL_TIMEOUT);

        env::set_var("TOOL_TIMEOUT_SECS", "30");
        assert_eq!(BotConfig::from_env().tool_timeout, Duration::from_secs(30));

        env::set_var("TOOL_TIMEOUT_SECS", "0");
        assert_eq!(BotConfig::from_env().tool_timeout, DEFAULT_TOOL_TIMEOUT);
        clear();
    }
}
