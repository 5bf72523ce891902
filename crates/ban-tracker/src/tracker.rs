//! Fetch, diff, and remember subreddit bans

use crate::source::BanSource;
use chrono::{DateTime, Utc};
use processed_entry_cache::{ProcessedEntry, ProcessedEntryCache};
use reddit_client::{BannedUser, ModAction};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::{error, info, warn};

const NO_REASON: &str = "No reason provided";

/// A ban (or moderation action) as fetched on this run
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBan {
    /// `<subreddit>_<username>` for bans, `<subreddit>_<action id>` for log entries
    pub key: String,
    pub subreddit: String,
    /// "Ban" for ban-list entries, the log action otherwise
    pub action: String,
    pub target: String,
    pub reason: Option<String>,
    pub moderator: Option<String>,
    pub date: Option<DateTime<Utc>>,
    from_ban_list: bool,
}

impl FetchedBan {
    fn from_banned_user(subreddit: &str, user: BannedUser) -> Self {
        let date = user.banned_at();
        Self {
            key: format!("{}_{}", subreddit, user.name),
            subreddit: subreddit.to_string(),
            action: "Ban".to_string(),
            reason: Some(
                user.note
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| NO_REASON.to_string()),
            ),
            target: user.name,
            moderator: None,
            date,
            from_ban_list: true,
        }
    }

    fn from_mod_action(subreddit: &str, action: ModAction) -> Self {
        let date = action.created_at();
        Self {
            key: format!("{}_{}", subreddit, action.id),
            subreddit: subreddit.to_string(),
            target: action.target_author.unwrap_or_else(|| "N/A".to_string()),
            reason: action
                .details
                .filter(|d| !d.trim().is_empty())
                .or(action.description.filter(|d| !d.trim().is_empty())),
            moderator: Some(action.moderator),
            action: action.action,
            date,
            from_ban_list: false,
        }
    }

    fn to_entry(&self) -> ProcessedEntry {
        ProcessedEntry::new(
            self.key.as_str(),
            self.target.as_str(),
            self.subreddit.as_str(),
            self.action.as_str(),
            self.reason.clone().unwrap_or_default(),
        )
    }
}

/// Outcome of one tracker run
#[derive(Debug, Clone, Default)]
pub struct TrackerReport {
    pub fetched: usize,
    pub new_bans: Vec<FetchedBan>,
}

pub struct BanTracker<S> {
    source: S,
    seen: ProcessedEntryCache,
}

impl<S: BanSource> BanTracker<S> {
    pub fn new(source: S, seen: ProcessedEntryCache) -> Self {
        Self { source, seen }
    }

    pub fn seen(&self) -> &ProcessedEntryCache {
        &self.seen
    }

    /// Ban lists of every subreddit; inaccessible lists are skipped
    pub async fn fetch_banned_users(&self, subreddits: &[String], limit: u32) -> Vec<FetchedBan> {
        let mut fetched = Vec::new();
        for subreddit in subreddits {
            info!(subreddit = %subreddit, "Fetching ban list");
            match self.source.banned_users(subreddit, limit).await {
                Ok(users) => fetched.extend(
                    users
                        .into_iter()
                        .map(|user| FetchedBan::from_banned_user(subreddit, user)),
                ),
                Err(e) => warn!(
                    subreddit = %subreddit,
                    error = %e,
                    "Cannot access ban list (moderator permissions required?)"
                ),
            }
        }
        fetched
    }

    /// Moderation log of every subreddit; inaccessible logs are skipped
    pub async fn fetch_mod_log(&self, subreddits: &[String], limit: u32) -> Vec<FetchedBan> {
        let mut fetched = Vec::new();
        for subreddit in subreddits {
            info!(subreddit = %subreddit, "Fetching moderation log");
            match self.source.mod_log(subreddit, limit).await {
                Ok(actions) => fetched.extend(
                    actions
                        .into_iter()
                        .map(|action| FetchedBan::from_mod_action(subreddit, action)),
                ),
                Err(e) => warn!(subreddit = %subreddit, error = %e, "Cannot access moderation log"),
            }
        }
        fetched
    }

    /// Fetched items whose key has not been seen before, first occurrence only
    pub fn identify_new(&self, fetched: &[FetchedBan]) -> Vec<FetchedBan> {
        let mut keys = HashSet::new();
        let new_bans: Vec<FetchedBan> = fetched
            .iter()
            .filter(|ban| !self.seen.is_processed(&ban.key) && keys.insert(ban.key.as_str()))
            .cloned()
            .collect();

        info!(
            new = new_bans.len(),
            total = fetched.len(),
            "Identified new bans"
        );
        new_bans
    }

    /// Fetch, diff against the seen store, and remember everything fetched
    pub async fn run(&mut self, subreddits: &[String], limit: u32) -> TrackerReport {
        info!("Starting ban tracker...");

        let mut fetched = self.fetch_banned_users(subreddits, limit).await;
        if fetched.is_empty() {
            info!("No ban data available, trying moderation log data...");
            fetched = self.fetch_mod_log(subreddits, limit).await;
        }

        let new_bans = self.identify_new(&fetched);

        if fetched.is_empty() {
            warn!("No ban or moderation data was fetched");
        } else {
            // Re-stamp everything still listed so it outlives the retention window
            match self.seen.record_all(fetched.iter().map(FetchedBan::to_entry)) {
                Ok(saved) => info!(saved, path = ?self.seen.store_path(), "Saved seen bans"),
                Err(e) => error!(error = %e, "Seen bans not saved"),
            }
        }

        TrackerReport {
            fetched: fetched.len(),
            new_bans,
        }
    }
}

/// Human-readable listing of new bans
pub fn render_new_bans(new_bans: &[FetchedBan]) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();

    if new_bans.is_empty() {
        let _ = write!(out, "\n{rule}\nNo new bans found!\n{rule}\n");
        return out;
    }

    let _ = write!(out, "\n{rule}\nNEW BANS DETECTED: {}\n{rule}\n", new_bans.len());
    for ban in new_bans {
        let _ = writeln!(out, "\nSubreddit: r/{}", ban.subreddit);
        let _ = writeln!(out, "Action: {}", ban.action);
        if ban.from_ban_list {
            let _ = writeln!(out, "User: u/{}", ban.target);
        } else {
            let _ = writeln!(out, "Target: {}", ban.target);
        }
        if let Some(reason) = &ban.reason {
            let label = if ban.from_ban_list { "Reason" } else { "Details" };
            let _ = writeln!(out, "{}: {}", label, reason);
        }
        let _ = writeln!(out, "Moderator: {}", ban.moderator.as_deref().unwrap_or("Unknown"));
        if let Some(date) = ban.date {
            let _ = writeln!(out, "Date: {}", date.format("%Y-%m-%d %H:%M:%S"));
        }
        let _ = writeln!(out, "{}", "-".repeat(30));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeDelta;
    use reddit_client::RedditError;
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    #[derive(Default)]
    struct FakeSource {
        banned: Option<Vec<BannedUser>>,
        log: Option<Vec<ModAction>>,
    }

    fn forbidden() -> RedditError {
        RedditError::Api {
            status: 403,
            body: "Forbidden".to_string(),
        }
    }

    #[async_trait]
    impl BanSource for FakeSource {
        async fn banned_users(&self, _subreddit: &str, limit: u32) -> reddit_client::Result<Vec<BannedUser>> {
            let users = self.banned.clone().ok_or_else(forbidden)?;
            Ok(users.into_iter().take(limit as usize).collect())
        }

        async fn mod_log(&self, _subreddit: &str, _limit: u32) -> reddit_client::Result<Vec<ModAction>> {
            self.log.clone().ok_or_else(forbidden)
        }
    }

    fn banned(name: &str, note: Option<&str>) -> BannedUser {
        BannedUser {
            name: name.to_string(),
            note: note.map(str::to_string),
            date: Some(1_791_981_000.0),
        }
    }

    fn log_entry(id: &str, action: &str) -> ModAction {
        ModAction {
            id: id.to_string(),
            action: action.to_string(),
            moderator: "mod1".to_string(),
            target_author: Some("someone".to_string()),
            details: Some("spam".to_string()),
            description: None,
            created_utc: 1_791_981_000.0,
        }
    }

    fn tracker_with(source: FakeSource) -> (BanTracker<FakeSource>, TempDir) {
        let dir = tempdir().unwrap();
        let seen = ProcessedEntryCache::open(
            dir.path().join("banned_users.json"),
            Duration::from_secs(90 * 86_400),
        )
        .unwrap();
        (BanTracker::new(source, seen), dir)
    }

    fn subs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_run_reports_everything() {
        let source = FakeSource {
            banned: Some(vec![banned("alice", Some("Rule 7")), banned("bob", None)]),
            ..FakeSource::default()
        };
        let (mut tracker, _dir) = tracker_with(source);

        let report = tracker.run(&subs(&["mysub"]), 50).await;
        assert_eq!(report.fetched, 2);
        assert_eq!(report.new_bans.len(), 2);
        assert_eq!(report.new_bans[0].key, "mysub_alice");
        assert_eq!(report.new_bans[1].reason.as_deref(), Some(NO_REASON));
        assert!(tracker.seen().is_processed("mysub_bob"));
    }

    #[tokio::test]
    async fn test_second_run_reports_nothing_new() {
        let source = FakeSource {
            banned: Some(vec![banned("alice", Some("Rule 7"))]),
            ..FakeSource::default()
        };
        let (mut tracker, _dir) = tracker_with(source);

        tracker.run(&subs(&["mysub"]), 50).await;
        let report = tracker.run(&subs(&["mysub"]), 50).await;
        assert_eq!(report.fetched, 1);
        assert!(report.new_bans.is_empty());
    }

    #[tokio::test]
    async fn test_seen_store_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banned_users.json");
        let retention = Duration::from_secs(90 * 86_400);

        let source = FakeSource {
            banned: Some(vec![banned("alice", Some("Rule 7"))]),
            ..FakeSource::default()
        };
        let mut tracker = BanTracker::new(source, ProcessedEntryCache::open(&path, retention).unwrap());
        tracker.run(&subs(&["mysub"]), 50).await;

        let source = FakeSource {
            banned: Some(vec![banned("alice", Some("Rule 7")), banned("carol", None)]),
            ..FakeSource::default()
        };
        let mut tracker = BanTracker::new(source, ProcessedEntryCache::open(&path, retention).unwrap());
        let report = tracker.run(&subs(&["mysub"]), 50).await;

        let keys: Vec<&str> = report.new_bans.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["mysub_carol"]);
    }

    #[tokio::test]
    async fn test_still_listed_ban_is_restamped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banned_users.json");
        let stale_at = Utc::now() - TimeDelta::days(91);

        let stale =
            ProcessedEntry::stamped_at("mysub_alice", "alice", "mysub", "Ban", "Rule 7", stale_at);
        let seeded = HashMap::from([(stale.entry_id.clone(), stale)]);
        fs::write(&path, serde_json::to_vec(&seeded).unwrap()).unwrap();

        let source = FakeSource {
            banned: Some(vec![banned("alice", Some("Rule 7"))]),
            ..FakeSource::default()
        };
        let seen = ProcessedEntryCache::open(&path, Duration::from_secs(90 * 86_400)).unwrap();
        let mut tracker = BanTracker::new(source, seen);

        let report = tracker.run(&subs(&["mysub"]), 50).await;
        assert!(report.new_bans.is_empty());

        let reopened = ProcessedEntryCache::open(&path, Duration::from_secs(90 * 86_400)).unwrap();
        assert!(reopened.is_processed("mysub_alice"));
        let restamped = reopened.get("mysub_alice").unwrap().timestamp().unwrap();
        assert!(restamped > stale_at + TimeDelta::days(90));
    }

    #[test]
    fn test_log_description_used_without_details() {
        let mut action = log_entry("ModAction_2", "banuser");
        action.details = None;
        action.description = Some("permanent ban".to_string());

        let ban = FetchedBan::from_mod_action("mysub", action);
        assert_eq!(ban.reason.as_deref(), Some("permanent ban"));
    }

    #[tokio::test]
    async fn test_falls_back_to_mod_log() {
        let source = FakeSource {
            banned: None,
            log: Some(vec![log_entry("ModAction_1", "removelink")]),
        };
        let (mut tracker, _dir) = tracker_with(source);

        let report = tracker.run(&subs(&["a", "b"]), 50).await;
        // Same log returned for both subreddits, keyed per subreddit
        assert_eq!(report.fetched, 2);
        assert_eq!(report.new_bans[0].key, "a_ModAction_1");
        assert_eq!(report.new_bans[0].action, "removelink");
        assert_eq!(report.new_bans[0].moderator.as_deref(), Some("mod1"));
    }

    #[tokio::test]
    async fn test_nothing_fetched_writes_nothing() {
        let (mut tracker, dir) = tracker_with(FakeSource::default());

        let report = tracker.run(&subs(&["mysub"]), 50).await;
        assert_eq!(report.fetched, 0);
        assert!(report.new_bans.is_empty());
        assert!(!dir.path().join("banned_users.json").exists());
    }

    #[tokio::test]
    async fn test_duplicate_keys_reported_once() {
        let source = FakeSource {
            banned: Some(vec![banned("alice", None), banned("alice", Some("again"))]),
            ..FakeSource::default()
        };
        let (tracker, _dir) = tracker_with(source);

        let fetched = tracker.fetch_banned_users(&subs(&["mysub"]), 50).await;
        assert_eq!(tracker.identify_new(&fetched).len(), 1);
    }

    #[test]
    fn test_render_no_new_bans() {
        let out = render_new_bans(&[]);
        assert!(out.contains("No new bans found!"));
    }

    #[test]
    fn test_render_ban_list_entry() {
        let ban = FetchedBan::from_banned_user("mysub", banned("alice", Some("Rule 7")));
        let out = render_new_bans(&[ban]);

        assert!(out.contains("NEW BANS DETECTED: 1"));
        assert!(out.contains("Subreddit: r/mysub"));
        assert!(out.contains("Action: Ban"));
        assert!(out.contains("User: u/alice"));
        assert!(out.contains("Reason: Rule 7"));
        assert!(out.contains("Date: 2026-10-14 12:30:00"));
        assert!(out.contains("Moderator: Unknown"));
    }

    #[test]
    fn test_render_log_entry() {
        let ban = FetchedBan::from_mod_action("mysub", log_entry("ModAction_9", "banuser"));
        let out = render_new_bans(&[ban]);

        assert!(out.contains("Target: someone"));
        assert!(out.contains("Details: spam"));
        assert!(out.contains("Moderator: mod1"));
    }
}
