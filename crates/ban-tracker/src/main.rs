//! Ban Tracker - reports subreddit bans not seen on a previous run

use ban_tracker::{render_new_bans, BanTracker, Result, TrackerConfig, TrackerError};
use clap::Parser;
use processed_entry_cache::ProcessedEntryCache;
use reddit_client::{Credentials, RedditClient};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Monitor and track bans from Reddit subreddits
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Comma-separated list of subreddits to monitor
    #[arg(short, long, default_value = "announcements,reddit")]
    subreddits: String,

    /// Maximum number of entries to fetch per subreddit
    #[arg(short, long, default_value_t = 50)]
    limit: u32,

    /// Path to the env configuration file
    #[arg(short, long, default_value = ".env")]
    config: PathBuf,

    /// Path to the seen-ban storage file
    #[arg(long, default_value = "banned_users.json")]
    storage: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("ban_tracker=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    let args = Args::parse();

    match dotenvy::from_path(&args.config) {
        Ok(()) => info!(path = ?args.config, "Loaded env file"),
        Err(e) if e.not_found() => debug!(path = ?args.config, "No env file, using process environment"),
        Err(e) => return Err(TrackerError::from(e)),
    }

    let config = TrackerConfig::from_env()?;
    let subreddits: Vec<String> = args
        .subreddits
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if subreddits.is_empty() {
        return Err(TrackerError::Config("no subreddits given".to_string()));
    }

    let credentials = Credentials::from_env()?;
    let client = RedditClient::connect(&credentials).await?;

    let seen = ProcessedEntryCache::open(&args.storage, config.retention())?;
    info!(path = ?args.storage, outcome = ?seen.load_outcome(), "Opened seen-ban storage");

    let mut tracker = BanTracker::new(client, seen);
    let report = tracker.run(&subreddits, args.limit).await;

    print!("{}", render_new_bans(&report.new_bans));

    Ok(())
}
