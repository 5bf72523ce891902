use crate::error::{MuterError, Result};
use std::time::Duration;

const DEFAULT_RESPONSE_TEMPLATE: &str = "Your message has been received. Due to your recent ban for {rule}, \
your ability to message the moderators has been temporarily restricted.";

/// Bot configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct MuterConfig {
    pub target_rule: String,
    pub response_template: String,
    pub max_conversations_per_run: u32,
    pub conversation_cache_days: u32,
    pub ban_lookback_days: u32,
    pub dry_run: bool,
    pub auto_mute: bool,
}

impl Default for MuterConfig {
    fn default() -> Self {
        Self {
            target_rule: "Rule 7".to_string(),
            response_template: DEFAULT_RESPONSE_TEMPLATE.to_string(),
            max_conversations_per_run: 50,
            conversation_cache_days: 30,
            ban_lookback_days: 7,
            dry_run: false,
            auto_mute: true,
        }
    }
}

impl MuterConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse configuration through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let number = |key: &str, default: u32| -> Result<u32> {
            match lookup(key) {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    MuterError::Config(format!(
                        "{} must be a non-negative integer, got {:?}",
                        key, raw
                    ))
                }),
                None => Ok(default),
            }
        };
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        Ok(Self {
            target_rule: lookup("TARGET_RULE").unwrap_or(defaults.target_rule),
            response_template: lookup("RESPONSE_TEMPLATE").unwrap_or(defaults.response_template),
            max_conversations_per_run: number(
                "MAX_CONVERSATIONS_PER_RUN",
                defaults.max_conversations_per_run,
            )?,
            conversation_cache_days: number(
                "CONVERSATION_CACHE_DAYS",
                defaults.conversation_cache_days,
            )?,
            ban_lookback_days: number("BAN_LOOKBACK_DAYS", defaults.ban_lookback_days)?,
            dry_run: flag("DRY_RUN", defaults.dry_run),
            auto_mute: flag("AUTO_MUTE", defaults.auto_mute),
        })
    }

    /// How long processed conversations are remembered
    pub fn cache_retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.conversation_cache_days) * 24 * 60 * 60)
    }

    /// Action tag recorded for a handled conversation
    pub fn action_tag(&self) -> &'static str {
        if self.auto_mute {
            "responded_and_muted"
        } else {
            "responded_only"
        }
    }

    /// Fill `{rule}`, `{username}` and `{subreddit}` in the response template
    pub fn render_response(&self, username: &str, subreddit: &str) -> String {
        self.response_template
            .replace("{rule}", &self.target_rule)
            .replace("{username}", username)
            .replace("{subreddit}", subreddit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<MuterConfig> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        MuterConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.target_rule, "Rule 7");
        assert_eq!(config.max_conversations_per_run, 50);
        assert_eq!(config.conversation_cache_days, 30);
        assert_eq!(config.ban_lookback_days, 7);
        assert!(!config.dry_run);
        assert!(config.auto_mute);
        assert!(config.response_template.contains("{rule}"));
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("TARGET_RULE", "Rule 3"),
            ("MAX_CONVERSATIONS_PER_RUN", "10"),
            ("CONVERSATION_CACHE_DAYS", " 14 "),
            ("DRY_RUN", "TRUE"),
            ("AUTO_MUTE", "no"),
        ])
        .unwrap();

        assert_eq!(config.target_rule, "Rule 3");
        assert_eq!(config.max_conversations_per_run, 10);
        assert_eq!(config.conversation_cache_days, 14);
        assert!(config.dry_run);
        assert!(!config.auto_mute);
        assert_eq!(config.action_tag(), "responded_only");
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = config_from(&[("MAX_CONVERSATIONS_PER_RUN", "lots")]).unwrap_err();
        assert!(format!("{}", err).contains("MAX_CONVERSATIONS_PER_RUN"));

        assert!(config_from(&[("CONVERSATION_CACHE_DAYS", "-1")]).is_err());
    }

    #[test]
    fn test_cache_retention() {
        let config = MuterConfig {
            conversation_cache_days: 2,
            ..MuterConfig::default()
        };
        assert_eq!(config.cache_retention(), Duration::from_secs(172_800));
    }

    #[test]
    fn test_render_response() {
        let config = MuterConfig {
            response_template: "Hi u/{username}, r/{subreddit} banned you for {rule}. {unknown}"
                .to_string(),
            ..MuterConfig::default()
        };
        assert_eq!(
            config.render_response("spammer", "mysub"),
            "Hi u/spammer, r/mysub banned you for Rule 7. {unknown}"
        );
    }

    #[test]
    fn test_default_template_mentions_rule() {
        let rendered = MuterConfig::default().render_response("u", "s");
        assert!(rendered.contains("recent ban for Rule 7,"));
    }
}
