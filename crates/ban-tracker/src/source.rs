use async_trait::async_trait;
use reddit_client::{BannedUser, ModAction, RedditClient, Result};

/// Where the tracker reads bans from
#[async_trait]
pub trait BanSource: Send + Sync {
    /// Current ban list (requires moderator access)
    async fn banned_users(&self, subreddit: &str, limit: u32) -> Result<Vec<BannedUser>>;

    /// Moderation log entries of every action type
    async fn mod_log(&self, subreddit: &str, limit: u32) -> Result<Vec<ModAction>>;
}

#[async_trait]
impl BanSource for RedditClient {
    async fn banned_users(&self, subreddit: &str, limit: u32) -> Result<Vec<BannedUser>> {
        RedditClient::banned_users(self, subreddit, limit).await
    }

    async fn mod_log(&self, subreddit: &str, limit: u32) -> Result<Vec<ModAction>> {
        RedditClient::mod_log(self, subreddit, None, limit).await
    }
}
