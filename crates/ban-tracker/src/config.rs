use crate::error::{Result, TrackerError};
use std::time::Duration;

/// Tracker configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Days a ban that stops appearing in fetches is remembered
    pub retention_days: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { retention_days: 90 }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let retention_days = match lookup("BAN_RETENTION_DAYS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                TrackerError::Config(format!(
                    "BAN_RETENTION_DAYS must be a non-negative integer, got {:?}",
                    raw
                ))
            })?,
            None => Self::default().retention_days,
        };

        Ok(Self { retention_days })
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * 24 * 60 * 60)
    }
}
