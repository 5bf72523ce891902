//! Cache types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit of work a bot has already handled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessedEntry {
    pub entry_id: String,
    pub subject: String,
    pub context: String,
    pub processed_at: String,
    pub action: String,
    pub reason: String,
}

impl ProcessedEntry {
    /// Build an entry stamped with the current time
    pub fn new(
        entry_id: impl Into<String>,
        subject: impl Into<String>,
        context: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::stamped_at(entry_id, subject, context, action, reason, Utc::now())
    }

    /// Build an entry stamped with an explicit time
    pub fn stamped_at(
        entry_id: impl Into<String>,
        subject: impl Into<String>,
        context: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            subject: subject.into(),
            context: context.into(),
            processed_at: at.to_rfc3339(),
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Parsed `processed_at`, or `None` if it is not a recognised timestamp
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.processed_at)
    }
}

/// Naive date-time layouts tried after RFC 3339
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with an offset, naive date-times with either a `T` or a
/// space separator, and bare dates (midnight). Naive values are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Aggregate counts over the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total: usize,
    pub last_24h: usize,
    pub last_7d: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} last_24h={} last_7d={}",
            self.total, self.last_24h, self.last_7d
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cache_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.last_24h, 0);
        assert_eq!(stats.last_7d, 0);
    }

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2026-10-14T12:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 14, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_zulu() {
        assert!(parse_timestamp("2026-10-14T12:30:00Z").is_some());
    }

    #[test]
    fn test_parse_naive_with_fraction() {
        let parsed = parse_timestamp("2026-10-14T12:30:00.123456").unwrap();
        assert_eq!(parsed.timestamp(), 1_791_981_000);
    }

    #[test]
    fn test_parse_space_separated() {
        let parsed = parse_timestamp("2026-10-14 12:30:00.123456").unwrap();
        assert_eq!(parsed.timestamp(), 1_791_981_000);
    }

    #[test]
    fn test_parse_minutes_only() {
        let parsed = parse_timestamp("2026-10-14T12:30").unwrap();
        assert_eq!(parsed.timestamp(), 1_791_981_000);
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = parse_timestamp("2026-10-14").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2026-13-45T99:00:00").is_none());
    }

    #[test]
    fn test_entry_serialization() {
        let entry = ProcessedEntry::new(
            "abc123",
            "someuser",
            "somesub",
            "responded_and_muted",
            "Rule 7 violation",
        );

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"entry_id\":\"abc123\""));
        assert!(json.contains("responded_and_muted"));

        let deserialized: ProcessedEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
        assert!(deserialized.timestamp().is_some());
    }

    #[test]
    fn test_entry_rejects_unknown_fields() {
        let json = r#"{
            "entry_id": "a",
            "subject": "u",
            "context": "s",
            "processed_at": "2026-10-14T00:00:00Z",
            "action": "x",
            "reason": "y",
            "extra": "nope"
        }"#;
        assert!(serde_json::from_str::<ProcessedEntry>(json).is_err());
    }

    #[test]
    fn test_entry_rejects_missing_fields() {
        let json = r#"{"entry_id": "a", "subject": "u"}"#;
        assert!(serde_json::from_str::<ProcessedEntry>(json).is_err());
    }
}
