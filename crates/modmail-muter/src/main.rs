//! Modmail Muter - replies to and mutes modmail from recently banned users

use clap::Parser;
use modmail_muter::{MuteBot, MuterConfig, MuterError, Result};
use processed_entry_cache::ProcessedEntryCache;
use reddit_client::{Credentials, RedditClient};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Automatically respond to and mute users banned for a target rule
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Comma-separated list of subreddit names to monitor
    #[arg(short, long, default_value = "announcements,help")]
    subreddits: String,

    /// Path to the env configuration file
    #[arg(short, long, default_value = ".env")]
    config: PathBuf,

    /// Path to the processed conversation cache file
    #[arg(long, default_value = "processed_conversations.json")]
    cache: PathBuf,

    /// Log what would happen without replying or muting
    #[arg(long)]
    dry_run: bool,

    /// Target rule for ban detection (overrides TARGET_RULE)
    #[arg(long)]
    rule: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("modmail_muter=info".parse()?);

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
        Err(e) => return Err(MuterError::from(e)),
    }

    let mut config = MuterConfig::from_env()?;
    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(rule) = args.rule {
        config.target_rule = rule;
    }
    info!("Target rule: {}", config.target_rule);
    info!("Cache: {:?}", args.cache);

    let subreddits: Vec<String> = args
        .subreddits
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if subreddits.is_empty() {
        return Err(MuterError::Config("no subreddits given".to_string()));
    }

    let credentials = Credentials::from_env()?;
    let client = RedditClient::connect(&credentials).await?;
    match client.me().await {
        Ok(Some(name)) => info!("Connected to Reddit as: {}", name),
        Ok(None) => info!("Connected to Reddit in read-only mode"),
        Err(e) => debug!(error = %e, "Could not fetch account, continuing"),
    }

    if client.is_read_only() && !config.dry_run {
        return Err(MuterError::Config(
            "replying and muting need REDDIT_USERNAME and REDDIT_PASSWORD (or use --dry-run)"
                .to_string(),
        ));
    }

    let cache = ProcessedEntryCache::open(&args.cache, config.cache_retention())?;
    let mut bot = MuteBot::new(client, config, cache)?;
    let report = bot.run(&subreddits).await;

    println!("\nResults:");
    for (subreddit, count) in &report.per_subreddit {
        println!("  r/{}: {} conversations processed", subreddit, count);
    }
    println!("\nTotal: {} conversations processed", report.total);

    Ok(())
}
