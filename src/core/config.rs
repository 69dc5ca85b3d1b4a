//! Rules configuration.
//!
//! Hosts tune the rules core per match with a `RulesConfig`. Every field
//! has a default, so a partial JSON document is enough:
//!
//! ```
//! use ccg_rules::core::RulesConfig;
//!
//! let config = RulesConfig::from_json(r#"{ "max_resolution_depth": 4 }"#).unwrap();
//! assert_eq!(config.max_resolution_depth, 4);
//! assert!(config.mana_during_cast);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// How deep nested resolution may go before `begin_resolution` fails.
    pub max_resolution_depth: usize,

    /// Upper bound on triggered mana abilities executed in one drain.
    pub max_triggered_mana_iterations: usize,

    /// Whether mana abilities may be activated while casting.
    pub mana_during_cast: bool,

    /// Whether mana abilities may be activated while something resolves.
    pub mana_during_resolve: bool,

    /// Events kept in the match history. 0 keeps everything.
    pub history_limit: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_resolution_depth: 10,
            max_triggered_mana_iterations: 1024,
            mana_during_cast: true,
            mana_during_resolve: false,
            history_limit: 1000,
        }
    }
}

impl RulesConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the nested resolution bound (builder pattern).
    #[must_use]
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// Set the triggered mana iteration bound (builder pattern).
    #[must_use]
    pub fn with_max_triggered_mana_iterations(mut self, limit: usize) -> Self {
        self.max_triggered_mana_iterations = limit;
        self
    }

    /// Set mana activation permissions (builder pattern).
    #[must_use]
    pub fn with_mana_permissions(mut self, during_cast: bool, during_resolve: bool) -> Self {
        self.mana_during_cast = during_cast;
        self.mana_during_resolve = during_resolve;
        self
    }

    /// Set how many events the match history keeps (builder pattern).
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RulesConfig::default();
        assert_eq!(config.max_resolution_depth, 10);
        assert_eq!(config.max_triggered_mana_iterations, 1024);
        assert!(config.mana_during_cast);
        assert!(!config.mana_during_resolve);
    }

    #[test]
    fn test_config_builder() {
        let config = RulesConfig::new()
            .with_max_resolution_depth(3)
            .with_max_triggered_mana_iterations(16)
            .with_mana_permissions(false, true)
            .with_history_limit(0);

        assert_eq!(config.max_resolution_depth, 3);
        assert_eq!(config.max_triggered_mana_iterations, 16);
        assert!(!config.mana_during_cast);
        assert!(config.mana_during_resolve);
        assert_eq!(config.history_limit, 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = RulesConfig::new().with_max_resolution_depth(7);
        let json = serde_json::to_string(&config).unwrap();
        let back = RulesConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_rejects_bad_json() {
        let err = RulesConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::RulesError::Config(_)));
    }
}
