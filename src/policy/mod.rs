//! Link filtering policy
//!
//! A [`Policy`] is the immutable rule set deciding which links the crawl may
//! follow: a domain scope, an ordered list of deny patterns and a set of
//! denied file extensions. The predicate itself lives in [`filter`] and is
//! pure, so the frontier and diagnostics can share it freely.

mod filter;

pub use filter::{evaluate, is_allowed, FilterVerdict};

use crate::config::PolicyConfig;
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

/// A single deny rule matched against the full URL string
#[derive(Debug, Clone)]
pub enum DenyPattern {
    /// Regular expression, matched anywhere in the URL
    Regex(Regex),
    /// Plain substring
    Substring(String),
}

impl DenyPattern {
    /// Returns true if this pattern matches the URL
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(url),
            Self::Substring(needle) => url.contains(needle.as_str()),
        }
    }
}

impl fmt::Display for DenyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex(regex) => write!(f, "regex:{}", regex.as_str()),
            Self::Substring(needle) => write!(f, "substring:{}", needle),
        }
    }
}

/// Immutable link filtering rules for one crawl
#[derive(Debug, Clone)]
pub struct Policy {
    allowed_domains: Vec<String>,
    deny_patterns: Vec<DenyPattern>,
    deny_extensions: HashSet<String>,
}

impl Policy {
    /// Builds a policy from already-normalized parts
    ///
    /// Domains and extensions are lowercased; a leading dot on an extension
    /// is dropped.
    pub fn new(
        allowed_domains: impl IntoIterator<Item = String>,
        deny_patterns: Vec<DenyPattern>,
        deny_extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            deny_patterns,
            deny_extensions: deny_extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Compiles the policy section of the configuration
    ///
    /// Regex patterns come first, in configuration order, followed by plain
    /// substrings.
    pub fn from_config(config: &PolicyConfig) -> Result<Self, ConfigError> {
        if config.allowed_domains.is_empty() {
            return Err(ConfigError::Validation(
                "allowed_domains must list at least one domain".to_string(),
            ));
        }

        let mut deny_patterns = Vec::with_capacity(
            config.deny_patterns.len() + config.deny_substrings.len(),
        );

        for pattern in &config.deny_patterns {
            let regex = Regex::new(pattern).map_err(|e| {
                ConfigError::InvalidPattern(format!("Invalid deny pattern '{}': {}", pattern, e))
            })?;
            deny_patterns.push(DenyPattern::Regex(regex));
        }

        deny_patterns.extend(
            config
                .deny_substrings
                .iter()
                .map(|s| DenyPattern::Substring(s.clone())),
        );

        Ok(Self::new(
            config.allowed_domains.iter().cloned(),
            deny_patterns,
            config.deny_extensions.iter().cloned(),
        ))
    }

    /// Hostname suffixes the crawl is confined to
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// Deny patterns in evaluation order
    pub fn deny_patterns(&self) -> &[DenyPattern] {
        &self.deny_patterns
    }

    /// Returns true if the (lowercase) extension is denied
    pub fn denies_extension(&self, extension: &str) -> bool {
        !extension.is_empty() && self.deny_extensions.contains(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_config() -> PolicyConfig {
        PolicyConfig {
            allowed_domains: vec!["CC.Gatech.edu".to_string()],
            deny_patterns: vec!["/login".to_string(), "\\?service=".to_string()],
            deny_substrings: vec!["mailto:".to_string()],
            deny_extensions: vec![".PDF".to_string(), "zip".to_string()],
        }
    }

    #[test]
    fn test_from_config_normalizes() {
        let policy = Policy::from_config(&policy_config()).unwrap();

        assert_eq!(policy.allowed_domains(), &["cc.gatech.edu".to_string()]);
        assert!(policy.denies_extension("pdf"));
        assert!(policy.denies_extension("zip"));
        assert!(!policy.denies_extension(""));
        assert!(!policy.denies_extension("html"));
    }

    #[test]
    fn test_pattern_order_regex_then_substring() {
        let policy = Policy::from_config(&policy_config()).unwrap();
        let rendered: Vec<String> = policy.deny_patterns().iter().map(|p| p.to_string()).collect();

        assert_eq!(
            rendered,
            vec!["regex:/login", "regex:\\?service=", "substring:mailto:"]
        );
    }

    #[test]
    fn test_from_config_rejects_bad_regex() {
        let mut config = policy_config();
        config.deny_patterns.push("[".to_string());
        assert!(matches!(
            Policy::from_config(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_empty_scope() {
        let mut config = policy_config();
        config.allowed_domains.clear();
        assert!(Policy::from_config(&config).is_err());
    }

    #[test]
    fn test_deny_pattern_matching() {
        let regex = DenyPattern::Regex(Regex::new("\\?service=").unwrap());
        assert!(regex.matches("https://login.gatech.edu/cas?service=x"));
        assert!(!regex.matches("https://cc.gatech.edu/services"));

        let substring = DenyPattern::Substring("tel:".to_string());
        assert!(substring.matches("tel:+14045550100"));
        assert!(!substring.matches("https://cc.gatech.edu/"));
    }
}
