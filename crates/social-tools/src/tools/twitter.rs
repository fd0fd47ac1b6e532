//! Microblogging platform actions.

use std::sync::Arc;

use crate::registry::ToolRegistry;
use crate::tools::composio::{ComposioAction, ComposioClient};

/// The closed set of microblogging actions the bot can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwitterAction {
    /// Fetch one post by id.
    PostLookupById,
    /// Fetch several posts by id.
    PostLookupByIds,
    /// Search posts from the last seven days.
    RecentSearch,
    /// Repost a post as the authenticated user.
    RetweetPost,
    /// Like a post as the authenticated user.
    LikePost,
    /// Send a direct message to a user.
    SendDmToUser,
    /// Resolve the authenticated user.
    UserLookupMe,
    /// Create a post, reply or poll.
    CreatePost,
    /// Upload an image for attachment to a post.
    UploadMedia,
}

impl TwitterAction {
    /// Every action, in registration order.
    pub const ALL: [TwitterAction; 9] = [
        TwitterAction::PostLookupById,
        TwitterAction::PostLookupByIds,
        TwitterAction::RecentSearch,
        TwitterAction::RetweetPost,
        TwitterAction::LikePost,
        TwitterAction::SendDmToUser,
        TwitterAction::UserLookupMe,
        TwitterAction::CreatePost,
        TwitterAction::UploadMedia,
    ];

    /// Registry name used for dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostLookupById => "post_lookup_by_post_id",
            Self::PostLookupByIds => "post_lookup_by_post_ids",
            Self::RecentSearch => "recent_search",
            Self::RetweetPost => "retweet_post",
            Self::LikePost => "user_like_post",
            Self::SendDmToUser => "send_dm_user",
            Self::UserLookupMe => "user_lookup_me",
            Self::CreatePost => "creation_of_a_post",
            Self::UploadMedia => "upload_media",
        }
    }

    /// Composio action slug.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::PostLookupById => "TWITTER_POST_LOOKUP_BY_POST_ID",
            Self::PostLookupByIds => "TWITTER_POST_LOOKUP_BY_POST_IDS",
            Self::RecentSearch => "TWITTER_RECENT_SEARCH",
            Self::RetweetPost => "TWITTER_RETWEET_POST",
            Self::LikePost => "TWITTER_USER_LIKE_POST",
            Self::SendDmToUser => "TWITTER_SEND_A_NEW_MESSAGE_TO_A_USER",
            Self::UserLookupMe => "TWITTER_USER_LOOKUP_ME",
            Self::CreatePost => "TWITTER_CREATION_OF_A_POST",
            Self::UploadMedia => "TWITTER_UPLOAD_MEDIA",
        }
    }

    /// Short description for help text.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PostLookupById => "Look up a single post by id",
            Self::PostLookupByIds => "Look up several posts by id",
            Self::RecentSearch => "Search posts from the last 7 days",
            Self::RetweetPost => "Retweet a post as the authenticated user",
            Self::LikePost => "Like a post as the authenticated user",
            Self::SendDmToUser => "Send a direct message to a user",
            Self::UserLookupMe => "Look up the authenticated user",
            Self::CreatePost => "Create a post, reply or poll",
            Self::UploadMedia => "Upload media for a post",
        }
    }

    /// Build the registry tool for this action.
    pub fn tool(&self, client: Arc<ComposioClient>) -> ComposioAction {
        ComposioAction::new(self.name(), self.slug(), self.description(), client)
    }
}

/// Register every microblogging action on `registry`.
pub fn register_twitter_actions(registry: &mut ToolRegistry, client: Arc<ComposioClient>) {
    for action in TwitterAction::ALL {
        registry.register(action.tool(client.clone()));
    }
}

/// Create a registry holding every microblogging action.
pub fn twitter_registry(client: Arc<ComposioClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_twitter_actions(&mut registry, client);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::composio::ComposioConfig;
    use std::collections::HashSet;

    #[test]
    fn test_names_and_slugs_unique() {
        let names: HashSet<_> = TwitterAction::ALL.iter().map(|a| a.name()).collect();
        let slugs: HashSet<_> = TwitterAction::ALL.iter().map(|a| a.slug()).collect();
        assert_eq!(names.len(), TwitterAction::ALL.len());
        assert_eq!(slugs.len(), TwitterAction::ALL.len());
        assert!(slugs.iter().all(|s| s.starts_with("TWITTER_")));
    }

    #[test]
    fn test_twitter_registry_registers_all() {
        let client = Arc::new(ComposioClient::new(ComposioConfig::new("k")).unwrap());
        let registry = twitter_registry(client);
        for action in TwitterAction::ALL {
            assert!(registry.has_tool(action.name()), "missing {}", action.name());
        }
    }
}
