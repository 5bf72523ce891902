//! Error types for the processed-entry cache

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by [`crate::ProcessedEntryCache`]
#[derive(Debug)]
pub enum CacheError {
    /// Retention period does not fit in a signed time delta
    InvalidRetention(std::time::Duration),
    /// Writing the store failed; the in-memory mapping is still updated
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Serializing the mapping failed
    Serialize(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRetention(d) => write!(f, "Invalid retention period: {:?}", d),
            Self::Persist { path, source } => {
                write!(f, "Failed to persist cache to {}: {}", path.display(), source)
            }
            Self::Serialize(e) => write!(f, "Failed to serialize cache: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Persist { source, .. } => Some(source),
            Self::Serialize(e) => Some(e),
            Self::InvalidRetention(_) => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
