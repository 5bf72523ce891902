//! Modmail auto-muter
//!
//! Finds users recently banned for a target rule, replies to their modmail
//! with a canned notice, mutes the conversation, and remembers what it has
//! handled so reruns skip it.

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod rules;

pub use api::ModerationApi;
pub use bot::{MuteBot, RecentBan, RunReport};
pub use config::MuterConfig;
pub use error::{MuterError, Result};
pub use rules::RuleMatcher;
