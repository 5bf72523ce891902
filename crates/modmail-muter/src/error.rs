//! Error types for the modmail muter

use std::fmt;

#[derive(Debug)]
pub enum MuterError {
    Config(String),
    Reddit(reddit_client::RedditError),
    Cache(processed_entry_cache::CacheError),
    Dotenv(dotenvy::Error),
}

impl fmt::Display for MuterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MuterError::Config(msg) => write!(f, "Configuration error: {}", msg),
            MuterError::Reddit(err) => write!(f, "Reddit error: {}", err),
            MuterError::Cache(err) => write!(f, "Cache error: {}", err),
            MuterError::Dotenv(err) => write!(f, "Could not load env file: {}", err),
        }
    }
}

impl std::error::Error for MuterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MuterError::Reddit(err) => Some(err),
            MuterError::Cache(err) => Some(err),
            MuterError::Dotenv(err) => Some(err),
            MuterError::Config(_) => None,
        }
    }
}

impl From<reddit_client::RedditError> for MuterError {
    fn from(err: reddit_client::RedditError) -> Self {
        MuterError::Reddit(err)
    }
}

impl From<processed_entry_cache::CacheError> for MuterError {
    fn from(err: processed_entry_cache::CacheError) -> Self {
        MuterError::Cache(err)
    }
}

impl From<dotenvy::Error> for MuterError {
    fn from(err: dotenvy::Error) -> Self {
        MuterError::Dotenv(err)
    }
}

impl From<regex::Error> for MuterError {
    fn from(err: regex::Error) -> Self {
        MuterError::Config(format!("invalid rule pattern: {}", err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for MuterError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        MuterError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MuterError>;
