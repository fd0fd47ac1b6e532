//! Page scrapers.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::cache::ProductInfo;
use crate::error::CacheError;

/// Default Firecrawl scrape endpoint.
pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev/v1/scrape";

/// Fetches a page and reduces it to a [`ProductInfo`].
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ProductInfo, CacheError>;
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: String,
    #[serde(default)]
    metadata: ScrapeMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

/// Markdown scraper backed by the Firecrawl API.
pub struct FirecrawlScraper {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl FirecrawlScraper {
    /// Create a scraper with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, CacheError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| CacheError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_FIRECRAWL_URL.to_string(),
        })
    }

    /// Create from `FIRECRAWL_API_KEY`; `None` when unset.
    pub fn from_env() -> Option<Result<Self, CacheError>> {
        env::var("FIRECRAWL_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(Self::new)
    }

    /// Override the scrape endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Scraper for FirecrawlScraper {
    async fn scrape(&self, url: &str) -> Result<ProductInfo, CacheError> {
        debug!("Scraping {}", url);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "url": url, "formats": ["markdown"] }))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: ScrapeResponse = serde_json::from_str(&text).map_err(|_| CacheError::Scrape {
            url: url.to_string(),
            message: format!("status {}: {}", status.as_u16(), text),
        })?;

        if !status.is_success() || !body.success {
            return Err(CacheError::Scrape {
                url: url.to_string(),
                message: body
                    .error
                    .unwrap_or_else(|| format!("status {}", status.as_u16())),
            });
        }

        let data = body.data.unwrap_or_default();
        Ok(ProductInfo {
            content: data.markdown,
            title: data.metadata.title,
            description: data.metadata.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_scrape_reads_markdown_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer fc-key"))
            .and(body_partial_json(json!({
                "url": "https://disputeai.xyz",
                "formats": ["markdown"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "markdown": "# DisputeAI",
                    "metadata": {"title": "DisputeAI", "description": "Credit repair"}
                }
            })))
            .mount(&server)
            .await;

        let scraper = FirecrawlScraper::new("fc-key").unwrap().with_endpoint(server.uri());
        let info = scraper.scrape("https://disputeai.xyz").await.unwrap();
        assert_eq!(info.content, "# DisputeAI");
        assert_eq!(info.title, "DisputeAI");
        assert_eq!(info.description, "Credit repair");
    }

    #[tokio::test]
    async fn test_scrape_error_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "success": false,
                "error": "Payment required"
            })))
            .mount(&server)
            .await;

        let scraper = FirecrawlScraper::new("k").unwrap().with_endpoint(server.uri());
        match scraper.scrape("https://fdwa.site").await {
            Err(CacheError::Scrape { url, message }) => {
                assert_eq!(url, "https://fdwa.site");
                assert_eq!(message, "Payment required");
            }
            other => panic!("Expected Scrape error, got {:?}", other),
        }
    }
}
