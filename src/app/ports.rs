use crate::error::Result;
use crate::types::FollowsPage;
use async_trait::async_trait;

/// One page of `app.bsky.graph.getFollows`
#[async_trait]
pub trait FollowsApi: Send + Sync {
    async fn get_follows_page(
        &self,
        actor: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<FollowsPage>;
}

/// Existence checks against WebFinger. Every failure answers `false`.
#[async_trait]
pub trait HandleVerifier: Send + Sync {
    /// Whether Bridgy Fed mirrors this Bluesky handle into the fediverse
    async fn check_bridged(&self, bsky_handle: &str) -> bool;

    /// Whether a `local@domain` handle resolves on its own server
    async fn check_handle_exists(&self, handle: &str) -> bool;
}
