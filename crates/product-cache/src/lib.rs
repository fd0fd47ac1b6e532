//! Daily product knowledge for promo content.
//!
//! Product pages are scraped at most once per freshness window and stored in
//! a JSON file. The rendered [`product_context`] block and the page titles
//! feed post ideas.

mod cache;
mod error;
mod scraper;

pub use cache::{
    product_context, ProductCache, ProductData, ProductInfo, DEFAULT_CACHE_FILE,
    DEFAULT_PRODUCT_URLS, DEFAULT_TTL,
};
pub use error::CacheError;
pub use scraper::{FirecrawlScraper, Scraper, DEFAULT_FIRECRAWL_URL};
