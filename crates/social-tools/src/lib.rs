//! Capability registry and platform action tools for the promo bot.
//!
//! This crate is the boundary between the bot's decision logic and every
//! external publish/lookup API. Each external action is a [`Tool`] that takes
//! a parameter mapping plus the acting account and answers with a uniform
//! [`ToolOutput`] envelope (`successful`, `data`, `error`).
//!
//! # Built-in Tools
//!
//! - [`TwitterAction`] - post lookup, recent search, retweet, like, direct
//!   message, post creation, media upload and authenticated-self lookup.
//! - [`DriveAction`] - folder lookup and file upload on cloud storage.
//!
//! Both are executed through [`ComposioClient`].
//!
//! # Example
//!
//! ```rust,ignore
//! use social_tools::{twitter_registry, ComposioClient, ComposioConfig};
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(ComposioClient::new(ComposioConfig::from_env()).unwrap());
//!     let registry = twitter_registry(client);
//!
//!     let me = registry
//!         .execute("user_lookup_me", HashMap::new(), Some("ca_twitter"))
//!         .await
//!         .unwrap();
//!     println!("{:?}", me.id());
//! }
//! ```

mod error;
mod registry;
mod tool;
pub mod tools;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{
    register_drive_actions, register_twitter_actions, twitter_registry, ComposioAction,
    ComposioClient, ComposioConfig, DriveAction, TwitterAction, DEFAULT_COMPOSIO_BASE_URL,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
