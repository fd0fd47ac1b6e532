//! Built-in capability endpoints.

mod composio;
mod drive;
mod twitter;

pub use composio::{ComposioAction, ComposioClient, ComposioConfig, DEFAULT_COMPOSIO_BASE_URL};
pub use drive::{register_drive_actions, DriveAction};
pub use twitter::{register_twitter_actions, twitter_registry, TwitterAction};
