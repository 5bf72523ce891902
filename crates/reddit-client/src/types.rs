//! Reddit API response types

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// OAuth token endpoint response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

/// `GET /api/v1/me`
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub name: String,
}

/// Generic listing wrapper: `{"kind": "Listing", "data": {"children": [...]}}`
#[derive(Debug, Deserialize)]
pub(crate) struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData<T> {
    pub children: Vec<T>,
}

/// A `{"kind": ..., "data": ...}` wrapped object
#[derive(Debug, Deserialize)]
pub(crate) struct Thing<T> {
    pub data: T,
}

/// A moderation log entry
#[derive(Debug, Clone, Deserialize)]
pub struct ModAction {
    pub id: String,
    pub action: String,
    #[serde(rename = "mod")]
    pub moderator: String,
    pub target_author: Option<String>,
    pub details: Option<String>,
    pub description: Option<String>,
    pub created_utc: f64,
}

impl ModAction {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_utc as i64, 0)
    }
}

/// An entry from a subreddit's ban list
#[derive(Debug, Clone, Deserialize)]
pub struct BannedUser {
    pub name: String,
    pub note: Option<String>,
    /// Ban time, seconds since the epoch
    pub date: Option<f64>,
}

impl BannedUser {
    pub fn banned_at(&self) -> Option<DateTime<Utc>> {
        self.date
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
    }
}

/// `GET /api/mod/conversations`
#[derive(Debug, Deserialize)]
pub(crate) struct ConversationsResponse {
    #[serde(default)]
    pub conversations: HashMap<String, ModmailConversation>,
    #[serde(rename = "conversationIds", default)]
    pub conversation_ids: Vec<String>,
}

impl ConversationsResponse {
    /// Conversations in the order the API listed them
    pub fn into_ordered(mut self) -> Vec<ModmailConversation> {
        self.conversation_ids
            .iter()
            .filter_map(|id| self.conversations.remove(id))
            .collect()
    }
}

/// A modmail conversation
#[derive(Debug, Clone, Deserialize)]
pub struct ModmailConversation {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    pub participant: Option<Participant>,
}

impl ModmailConversation {
    /// Username of the non-moderator participant, if any
    pub fn participant_name(&self) -> Option<&str> {
        self.participant
            .as_ref()
            .filter(|p| !p.is_mod)
            .and_then(|p| p.name.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    pub name: Option<String>,
    #[serde(rename = "isMod", default)]
    pub is_mod: bool,
}
