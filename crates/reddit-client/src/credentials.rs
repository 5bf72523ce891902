//! Reddit app credentials read from the environment

use crate::error::{RedditError, Result};
use std::fmt;

const REQUIRED_VARS: [&str; 3] = ["REDDIT_CLIENT_ID", "REDDIT_CLIENT_SECRET", "REDDIT_USER_AGENT"];

/// Credentials for a Reddit "script" app
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .into_iter()
            .filter(|key| get(*key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RedditError::MissingCredentials(missing));
        }

        Ok(Self {
            client_id: get("REDDIT_CLIENT_ID").unwrap_or_default(),
            client_secret: get("REDDIT_CLIENT_SECRET").unwrap_or_default(),
            user_agent: get("REDDIT_USER_AGENT").unwrap_or_default(),
            username: get("REDDIT_USERNAME"),
            password: get("REDDIT_PASSWORD"),
        })
    }

    /// Username and password, when both are present
    pub fn account(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }
}

// Keep secrets out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("user_agent", &self.user_agent)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
