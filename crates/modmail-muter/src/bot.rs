//! Modmail processing for recently banned users

use crate::api::ModerationApi;
use crate::config::MuterConfig;
use crate::error::Result;
use crate::rules::RuleMatcher;
use chrono::{TimeDelta, Utc};
use processed_entry_cache::{CacheStats, ProcessedEntry, ProcessedEntryCache};
use reddit_client::ModmailConversation;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const NO_REASON: &str = "No reason provided";
const BAN_LIST_LIMIT: u32 = 100;

/// A user banned for the target rule within the lookback window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentBan {
    pub username: String,
    pub reason: String,
}

/// Outcome of a full run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Conversations handled per subreddit, in the order given
    pub per_subreddit: Vec<(String, usize)>,
    pub total: usize,
    pub cache: CacheStats,
}

/// Replies to and mutes modmail from users banned for the target rule
pub struct MuteBot<A> {
    api: A,
    config: MuterConfig,
    matcher: RuleMatcher,
    cache: ProcessedEntryCache,
    /// Pause after each handled conversation
    conversation_delay: Duration,
    /// Pause between subreddits
    subreddit_delay: Duration,
}

impl<A: ModerationApi> MuteBot<A> {
    pub fn new(api: A, config: MuterConfig, cache: ProcessedEntryCache) -> Result<Self> {
        let matcher = RuleMatcher::new(&config.target_rule)?;
        Ok(Self {
            api,
            config,
            matcher,
            cache,
            conversation_delay: Duration::from_millis(500),
            subreddit_delay: Duration::from_secs(2),
        })
    }

    /// Override the rate-limit pauses
    pub fn with_delays(mut self, conversation_delay: Duration, subreddit_delay: Duration) -> Self {
        self.conversation_delay = conversation_delay;
        self.subreddit_delay = subreddit_delay;
        self
    }

    pub fn cache(&self) -> &ProcessedEntryCache {
        &self.cache
    }

    /// Users banned for the target rule within the lookback window.
    ///
    /// Reads the moderation log; if that is inaccessible, falls back to the
    /// ban list (which carries no ban time, so no window applies).
    pub async fn recent_bans(&self, subreddit: &str) -> Vec<RecentBan> {
        let mut bans = Vec::new();
        // A lookback too large to represent reaches back indefinitely
        let cutoff = TimeDelta::try_days(i64::from(self.config.ban_lookback_days))
            .and_then(|lookback| Utc::now().checked_sub_signed(lookback));
        let log_limit = self.config.max_conversations_per_run.saturating_mul(2);

        match self.api.ban_log(subreddit, log_limit).await {
            Ok(actions) => {
                for action in actions {
                    let Some(created) = action.created_at() else {
                        debug!(id = %action.id, "Skipping mod action with invalid time");
                        continue;
                    };
                    // Newest first: everything after this is older still
                    if cutoff.is_some_and(|cutoff| created < cutoff) {
                        break;
                    }

                    let details = action.details.as_deref().unwrap_or_default();
                    if !self.matcher.matches(details) {
                        continue;
                    }
                    match action.target_author {
                        Some(username) => bans.push(RecentBan {
                            username,
                            reason: details.to_string(),
                        }),
                        None => debug!(id = %action.id, "Skipping ban without target"),
                    }
                }
            }
            Err(e) => {
                warn!(subreddit, error = %e, "Cannot access mod log, falling back to ban list");

                match self.api.banned_users(subreddit, BAN_LIST_LIMIT).await {
                    Ok(users) => {
                        for user in users {
                            let reason = user
                                .note
                                .filter(|n| !n.trim().is_empty())
                                .unwrap_or_else(|| NO_REASON.to_string());
                            if self.matcher.matches(&reason) {
                                bans.push(RecentBan {
                                    username: user.name,
                                    reason,
                                });
                            }
                        }
                    }
                    Err(e) => warn!(subreddit, error = %e, "Cannot access ban list"),
                }
            }
        }

        info!(
            subreddit,
            count = bans.len(),
            rule = %self.config.target_rule,
            "Found recent bans"
        );
        bans
    }

    /// Handle modmail from recently banned users in one subreddit.
    ///
    /// Returns the number of conversations handled.
    pub async fn process_subreddit(&mut self, subreddit: &str) -> usize {
        let bans = self.recent_bans(subreddit).await;
        let banned: HashSet<String> = bans.iter().map(|b| b.username.to_lowercase()).collect();

        if banned.is_empty() {
            info!(subreddit, rule = %self.config.target_rule, "No recent bans found");
            return 0;
        }
        info!(subreddit, users = banned.len(), "Processing modmail for recently banned users");

        let limit = self.config.max_conversations_per_run;
        let conversations = match self.api.conversations(subreddit, limit).await {
            Ok(conversations) => conversations,
            Err(e) => {
                error!(subreddit, error = %e, "Error accessing modmail");
                return 0;
            }
        };

        let mut processed = 0;
        for conversation in conversations {
            if processed >= limit as usize {
                break;
            }
            if self.cache.is_processed(&conversation.id) {
                debug!(id = %conversation.id, "Conversation already processed");
                continue;
            }
            let Some(username) = conversation.participant_name() else {
                continue;
            };
            if !banned.contains(&username.to_lowercase()) {
                continue;
            }

            self.handle_conversation(&conversation, subreddit, &bans).await;
            processed += 1;
            tokio::time::sleep(self.conversation_delay).await;
        }

        processed
    }

    async fn handle_conversation(
        &mut self,
        conversation: &ModmailConversation,
        subreddit: &str,
        bans: &[RecentBan],
    ) {
        let username = conversation.participant_name().unwrap_or_default();
        let reason = bans
            .iter()
            .find(|b| b.username.eq_ignore_ascii_case(username))
            .map(|b| b.reason.clone())
            .unwrap_or_else(|| format!("{} violation", self.config.target_rule));

        info!(
            id = %conversation.id,
            user = username,
            subject = %conversation.subject,
            "Processing conversation from banned user"
        );

        if self.config.dry_run {
            info!(user = username, "DRY RUN: would respond to and mute conversation");
        } else {
            let body = self.config.render_response(username, subreddit);
            match self.api.reply(&conversation.id, &body).await {
                Ok(()) => info!(user = username, "Sent response"),
                Err(e) => error!(user = username, error = %e, "Failed to send response"),
            }

            if self.config.auto_mute {
                match self.api.mute(&conversation.id).await {
                    Ok(()) => info!(user = username, "Muted conversation"),
                    Err(e) => error!(user = username, error = %e, "Failed to mute conversation"),
                }
            }
        }

        let entry = ProcessedEntry::new(
            conversation.id.as_str(),
            username,
            subreddit,
            self.config.action_tag(),
            reason,
        );
        if let Err(e) = self.cache.record(entry) {
            warn!(id = %conversation.id, error = %e, "Conversation handled but not persisted");
        }
    }

    /// Process every subreddit in turn and summarise
    pub async fn run(&mut self, subreddits: &[String]) -> RunReport {
        info!("Starting modmail muter...");
        if self.config.dry_run {
            info!("Running in DRY RUN mode - no actual actions will be taken");
        }

        let mut report = RunReport::default();
        for (i, subreddit) in subreddits.iter().enumerate() {
            info!(subreddit = %subreddit, "Processing subreddit");
            let count = self.process_subreddit(subreddit).await;
            info!(subreddit = %subreddit, count, "Processed conversations");

            report.per_subreddit.push((subreddit.clone(), count));
            report.total += count;

            if i + 1 < subreddits.len() {
                tokio::time::sleep(self.subreddit_delay).await;
            }
        }

        report.cache = self.cache.stats();
        info!(total = report.total, cache = %report.cache, "Session complete");
        report
    }
}
