//! Error types for the product cache.

use thiserror::Error;

/// Errors that can occur while scraping or persisting product data.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cache file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file or scrape response is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Scrape API rejected the request.
    #[error("scrape of {url} failed: {message}")]
    Scrape { url: String, message: String },
}
