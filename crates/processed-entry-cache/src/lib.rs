//! File-backed cache of processed entries
//!
//! Answers "have we already handled entry X?" for the moderation bots. The
//! whole mapping lives in memory and is rewritten to a single JSON file on
//! every mutation, after an eviction sweep drops entries older than the
//! retention period.

mod cache;
mod error;
mod types;

pub use cache::{LoadOutcome, ProcessedEntryCache};
pub use error::{CacheError, Result};
pub use types::{parse_timestamp, CacheStats, ProcessedEntry};
