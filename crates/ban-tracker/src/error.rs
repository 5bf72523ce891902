//! Error types for the ban tracker

use std::fmt;

#[derive(Debug)]
pub enum TrackerError {
    Config(String),
    Reddit(reddit_client::RedditError),
    Cache(processed_entry_cache::CacheError),
    Dotenv(dotenvy::Error),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            TrackerError::Reddit(err) => write!(f, "Reddit error: {}", err),
            TrackerError::Cache(err) => write!(f, "Storage error: {}", err),
            TrackerError::Dotenv(err) => write!(f, "Could not load env file: {}", err),
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Reddit(err) => Some(err),
            TrackerError::Cache(err) => Some(err),
            TrackerError::Dotenv(err) => Some(err),
            TrackerError::Config(_) => None,
        }
    }
}

impl From<reddit_client::RedditError> for TrackerError {
    fn from(err: reddit_client::RedditError) -> Self {
        TrackerError::Reddit(err)
    }
}

impl From<processed_entry_cache::CacheError> for TrackerError {
    fn from(err: processed_entry_cache::CacheError) -> Self {
        TrackerError::Cache(err)
    }
}

impl From<dotenvy::Error> for TrackerError {
    fn from(err: dotenvy::Error) -> Self {
        TrackerError::Dotenv(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for TrackerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        TrackerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
