//! Minimal Reddit API client for moderation bots
//!
//! Covers the handful of endpoints the bots call:
//!
//! - `POST /api/v1/access_token` - OAuth token (password or client-credentials grant)
//! - `GET /api/v1/me` - authenticated account
//! - `GET /r/{sub}/about/log` - moderation log
//! - `GET /r/{sub}/about/banned` - ban list
//! - `GET /api/mod/conversations` - modmail conversations
//! - `POST /api/mod/conversations/{id}` - reply to a conversation
//! - `POST /api/mod/conversations/{id}/mute` - mute the participant
//!
//! # Example
//!
//! ```no_run
//! use reddit_client::{Credentials, RedditClient};
//!
//! # async fn example() -> Result<(), reddit_client::RedditError> {
//! let credentials = Credentials::from_env()?;
//! let client = RedditClient::connect(&credentials).await?;
//!
//! for action in client.mod_log("mysub", Some("banuser"), 25).await? {
//!     println!("{} banned {:?}", action.moderator, action.target_author);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod credentials;
mod error;
mod types;

pub use client::RedditClient;
pub use credentials::Credentials;
pub use error::{RedditError, Result};
pub use types::{BannedUser, ModAction, ModmailConversation, Participant};
