//! Banner configuration handed over by the host.
//!
//! The settings layer (out of scope here) produces one immutable value per
//! page load. It arrives as JSON with the original widget's wire names, so
//! the serde surface accepts `preferencesKey` / `expirationDays` /
//! `policyUrl` as-is.

use serde::{Deserialize, Serialize};

/// Storage key used when the host does not configure one.
pub const DEFAULT_STORAGE_KEY: &str = "ccc_choice";

/// Primary-tier lifetime used when `expiration_days` is unset or zero.
pub const DEFAULT_EXPIRATION_DAYS: u32 = 180;

/// Immutable per-page-load configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentConfig {
    /// Key under which the choice is persisted in both tiers.
    #[serde(alias = "preferencesKey")]
    pub storage_key: String,
    /// Primary-tier lifetime in days. Unset or zero falls back to 180.
    pub expiration_days: Option<u32>,
    /// Policy link echoed into the published state.
    pub policy_url: String,
    /// Master switch; a disabled banner installs nothing.
    pub enabled: bool,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            expiration_days: None,
            policy_url: String::new(),
            enabled: true,
        }
    }
}

impl ConsentConfig {
    /// Config with the given storage key and defaults for everything else.
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            ..Self::default()
        }
    }

    /// Set the primary-tier lifetime in days.
    pub fn with_expiration_days(mut self, days: u32) -> Self {
        self.expiration_days = Some(days);
        self
    }

    /// Set the policy URL surfaced to consumers.
    pub fn with_policy_url(mut self, url: impl Into<String>) -> Self {
        self.policy_url = url.into();
        self
    }

    /// Disable the banner entirely.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The lifetime actually applied to the primary tier.
    pub fn effective_expiration_days(&self) -> u32 {
        match self.expiration_days {
            Some(days) if days > 0 => days,
            _ => DEFAULT_EXPIRATION_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_defaults_when_unset_or_zero() {
        assert_eq!(
            ConsentConfig::default().effective_expiration_days(),
            DEFAULT_EXPIRATION_DAYS
        );
        assert_eq!(
            ConsentConfig::default()
                .with_expiration_days(0)
                .effective_expiration_days(),
            DEFAULT_EXPIRATION_DAYS
        );
        assert_eq!(
            ConsentConfig::default()
                .with_expiration_days(30)
                .effective_expiration_days(),
            30
        );
    }

    #[test]
    fn deserializes_original_wire_names() {
        let json = r#"{
            "preferencesKey": "ccc_choice",
            "expirationDays": 30,
            "policyUrl": "https://x.test/p"
        }"#;
        let config: ConsentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.storage_key, "ccc_choice");
        assert_eq!(config.expiration_days, Some(30));
        assert_eq!(config.policy_url, "https://x.test/p");
        assert!(config.enabled);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ConsentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConsentConfig::default());
    }
}
