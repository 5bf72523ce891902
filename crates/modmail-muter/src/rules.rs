//! Ban reason matching against a target rule

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static RULE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rule\s*(\d+)").unwrap());

/// Decides whether a free-text ban reason refers to the target rule.
///
/// For a target such as "Rule 7" the accepted forms are the rule itself,
/// "rule 7 violation", "violating rule 7", "broke rule 7", "rule7", "r7",
/// and a bare "7" anywhere in the reason.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    target_rule: String,
    patterns: Vec<Regex>,
}

impl RuleMatcher {
    pub fn new(target_rule: &str) -> Result<Self, regex::Error> {
        let rule = target_rule.trim().to_lowercase();
        let escaped = regex::escape(&rule);

        let mut sources = vec![
            escaped.clone(),
            format!("{} violation", escaped),
            format!("violating {}", escaped),
            format!("broke {}", escaped),
        ];

        if let Some(caps) = RULE_NUMBER_RE.captures(&rule) {
            let number = &caps[1];
            sources.push(format!(r"rule\s*{}", number));
            sources.push(format!("r{}", number));
            sources.push(number.to_string());
        }

        let patterns = sources
            .iter()
            .map(|src| RegexBuilder::new(src).case_insensitive(true).build())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            target_rule: target_rule.to_string(),
            patterns,
        })
    }

    pub fn target_rule(&self) -> &str {
        &self.target_rule
    }

    /// Whether `ban_reason` cites the target rule; empty reasons never match
    pub fn matches(&self, ban_reason: &str) -> bool {
        let normalized = ban_reason.trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        self.patterns.iter().any(|re| re.is_match(&normalized))
    }
}
