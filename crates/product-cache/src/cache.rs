//! File-backed product data cache.

use std::env;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CacheError;
use crate::scraper::Scraper;

/// Default cache file.
pub const DEFAULT_CACHE_FILE: &str = "product_data_cache.json";

/// Default freshness window (one day).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Product pages scraped when `PRODUCT_URLS` is unset.
pub const DEFAULT_PRODUCT_URLS: [&str; 4] = [
    "https://consumerai.info",
    "https://disputeai.xyz",
    "https://fdwa.site",
    "https://linktr.ee/omniai",
];

/// Scraped summary of one product page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Product pages keyed by URL, in scrape order.
pub type ProductData = IndexMap<String, ProductInfo>;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    timestamp: String,
    data: ProductData,
}

/// Parse a cache timestamp. Offset-less timestamps are read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Product data persisted to a JSON file with a freshness window.
#[derive(Debug, Clone)]
pub struct ProductCache {
    path: PathBuf,
    ttl: Duration,
    urls: Vec<String>,
}

impl ProductCache {
    /// Create a cache at `path` for the default product URLs.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
            urls: DEFAULT_PRODUCT_URLS.iter().map(|u| u.to_string()).collect(),
        }
    }

    /// Create from `PRODUCT_CACHE_FILE`, `PRODUCT_CACHE_TTL_HOURS` and `PRODUCT_URLS`.
    pub fn from_env() -> Self {
        let path = env::var("PRODUCT_CACHE_FILE").unwrap_or_else(|_| DEFAULT_CACHE_FILE.to_string());
        let ttl = env::var("PRODUCT_CACHE_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<u64>().ok())
            .map(|h| Duration::from_secs(h * 60 * 60))
            .unwrap_or(DEFAULT_TTL);

        let cache = Self::new(path, ttl);
        match env::var("PRODUCT_URLS") {
            Ok(urls) => cache.with_urls(urls.split(',').map(str::trim).filter(|u| !u.is_empty())),
            Err(_) => cache,
        }
    }

    /// Replace the scraped URL list.
    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Load cached data if it is still fresh.
    pub async fn load(&self) -> Result<Option<ProductData>, CacheError> {
        self.load_at(Utc::now()).await
    }

    /// Load cached data if it is fresh relative to `now`.
    pub async fn load_at(&self, now: DateTime<Utc>) -> Result<Option<ProductData>, CacheError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let file: CacheFile = serde_json::from_str(&raw)?;
        let Some(saved_at) = parse_timestamp(&file.timestamp) else {
            warn!("Ignoring cache with unreadable timestamp {:?}", file.timestamp);
            return Ok(None);
        };

        let age = now.signed_duration_since(saved_at);
        let fresh = age
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true);
        if fresh {
            info!("Using cached product data");
            Ok(Some(file.data))
        } else {
            Ok(None)
        }
    }

    /// Persist `data` stamped with the current time.
    pub async fn save(&self, data: &ProductData) -> Result<(), CacheError> {
        let file = CacheFile {
            timestamp: Utc::now().to_rfc3339(),
            data: data.clone(),
        };
        tokio::fs::write(&self.path, serde_json::to_string_pretty(&file)?).await?;
        info!("Saved product data to {}", self.path.display());
        Ok(())
    }

    /// Return fresh cached data, or scrape every URL and save.
    ///
    /// A URL that fails to scrape gets an empty entry.
    pub async fn get_or_refresh(&self, scraper: &dyn Scraper) -> Result<ProductData, CacheError> {
        match self.load().await {
            Ok(Some(data)) => return Ok(data),
            Ok(None) => {}
            Err(e) => warn!("Discarding unreadable product cache: {}", e),
        }

        info!("Scraping fresh product data");
        let mut data = ProductData::new();
        for url in &self.urls {
            let info = match scraper.scrape(url).await {
                Ok(info) => {
                    info!("Scraped {}", url);
                    info
                }
                Err(e) => {
                    warn!("Failed to scrape {}: {}", url, e);
                    ProductInfo::default()
                }
            };
            data.insert(url.clone(), info);
        }

        self.save(&data).await?;
        Ok(data)
    }
}

/// Render product data as a prompt context block.
pub fn product_context(data: &ProductData) -> String {
    let mut context = String::from("PRODUCT KNOWLEDGE (scraped from our sites):\n\n");
    for (url, info) in data {
        let preview: String = info.content.chars().take(500).collect();
        context.push_str(&format!(
            "URL: {}\nTitle: {}\nDescription: {}\nContent Preview: {}...\n\n",
            url, info.title, info.description, preview
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeScraper {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Scraper for FakeScraper {
        async fn scrape(&self, url: &str) -> Result<ProductInfo, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("broken") {
                return Err(CacheError::Scrape {
                    url: url.to_string(),
                    message: "down".to_string(),
                });
            }
            Ok(ProductInfo {
                content: format!("content of {}", url),
                title: format!("title of {}", url),
                description: String::new(),
            })
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProductCache::new(dir.path().join("cache.json"), DEFAULT_TTL);
        assert!(cache.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_then_reuse() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProductCache::new(dir.path().join("cache.json"), DEFAULT_TTL)
            .with_urls(["https://a.example", "https://broken.example"]);
        let scraper = FakeScraper {
            calls: AtomicUsize::new(0),
        };

        let data = cache.get_or_refresh(&scraper).await.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["https://a.example"].title, "title of https://a.example");
        assert_eq!(data["https://broken.example"], ProductInfo::default());

        let again = cache.get_or_refresh(&scraper).await.unwrap();
        assert_eq!(again, data);
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ProductCache::new(dir.path().join("cache.json"), DEFAULT_TTL);
        cache.save(&ProductData::new()).await.unwrap();

        let later = Utc::now() + chrono::Duration::hours(25);
        assert!(cache.load_at(later).await.unwrap().is_none());
        assert!(cache.load_at(Utc::now()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reads_offsetless_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(
            &path,
            r#"{"timestamp": "2025-12-01T08:30:00.123456", "data": {"https://x": {"content": "c", "title": "t", "description": "d"}}}"#,
        )
        .unwrap();

        let cache = ProductCache::new(&path, DEFAULT_TTL);
        let now = parse_timestamp("2025-12-01T20:00:00Z").unwrap();
        let data = cache.load_at(now).await.unwrap().unwrap();
        assert_eq!(data["https://x"].title, "t");
    }

    #[test]
    fn test_product_context_preview() {
        let mut data = ProductData::new();
        data.insert(
            "https://a.example".to_string(),
            ProductInfo {
                content: "x".repeat(600),
                title: "A".to_string(),
                description: "about a".to_string(),
            },
        );

        let context = product_context(&data);
        assert!(context.starts_with("PRODUCT KNOWLEDGE (scraped from our sites):\n\n"));
        assert!(context.contains("URL: https://a.example\nTitle: A\nDescription: about a\n"));
        assert!(context.contains(&format!("Content Preview: {}...\n\n", "x".repeat(500))));
        assert!(!context.contains(&"x".repeat(501)));
    }
}
