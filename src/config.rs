//! Store Configuration
//!
//! Handed over by the extension host as JSON; every field has a default.

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, DomainResult};

/// Storage key holding the outline collection
pub const OUTLINES_KEY: &str = "outlines";

/// Storage key owned by the settings page, never written by the store
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Title given to nodes created without one
    pub default_node_title: String,
    /// Storage key for the outline collection
    pub outlines_key: String,
    /// Save after every applied mutation
    pub autosave: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_node_title: "New node".to_string(),
            outlines_key: OUTLINES_KEY.to_string(),
            autosave: true,
        }
    }
}

impl StoreConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let key = self.outlines_key.trim();
        if key.is_empty() {
            return Err(DomainError::InvalidConfig(
                "outlinesKey must not be empty".to_string(),
            ));
        }
        if key == SETTINGS_KEY {
            return Err(DomainError::InvalidConfig(format!(
                "outlinesKey must not be the reserved '{}' key",
                SETTINGS_KEY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.outlines_key, "outlines");
        assert!(config.autosave);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = StoreConfig::from_json(r#"{"autosave": false}"#).unwrap();
        assert!(!config.autosave);
        assert_eq!(config.default_node_title, "New node");
    }

    #[test]
    fn test_settings_key_is_reserved() {
        let err = StoreConfig::from_json(r#"{"outlinesKey": "settings"}"#).unwrap_err();
        assert!(matches!(err, DomainError::InvalidConfig(_)));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            StoreConfig::from_json("autosave"),
            Err(DomainError::InvalidConfig(_))
        ));
    }
}
