//! The Reddit operations the muter depends on

use async_trait::async_trait;
use reddit_client::{BannedUser, ModAction, ModmailConversation, RedditClient, Result};

/// Moderation calls made by [`crate::MuteBot`]
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// `banuser` entries from the moderation log, newest first
    async fn ban_log(&self, subreddit: &str, limit: u32) -> Result<Vec<ModAction>>;

    /// The subreddit's current ban list
    async fn banned_users(&self, subreddit: &str, limit: u32) -> Result<Vec<BannedUser>>;

    /// Modmail conversations in every state
    async fn conversations(&self, subreddit: &str, limit: u32) -> Result<Vec<ModmailConversation>>;

    /// Public reply with the moderator's name hidden
    async fn reply(&self, conversation_id: &str, body: &str) -> Result<()>;

    async fn mute(&self, conversation_id: &str) -> Result<()>;
}

#[async_trait]
impl ModerationApi for RedditClient {
    async fn ban_log(&self, subreddit: &str, limit: u32) -> Result<Vec<ModAction>> {
        self.mod_log(subreddit, Some("banuser"), limit).await
    }

    async fn banned_users(&self, subreddit: &str, limit: u32) -> Result<Vec<BannedUser>> {
        RedditClient::banned_users(self, subreddit, limit).await
    }

    async fn conversations(&self, subreddit: &str, limit: u32) -> Result<Vec<ModmailConversation>> {
        self.modmail_conversations(subreddit, "all", limit).await
    }

    async fn reply(&self, conversation_id: &str, body: &str) -> Result<()> {
        self.reply_to_conversation(conversation_id, body, true, false)
            .await
    }

    async fn mute(&self, conversation_id: &str) -> Result<()> {
        self.mute_conversation(conversation_id).await
    }
}
