//! Ban Tracker
//!
//! Fetches subreddit ban lists (or, failing that, the moderation log),
//! reports entries not seen on a previous run, and remembers everything it
//! fetched.

pub mod config;
pub mod error;
pub mod source;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use source::BanSource;
pub use tracker::{render_new_bans, BanTracker, FetchedBan, TrackerReport};
