//! Converter configuration
//!
//! Deserializable from connector configuration (YAML/JSON) with defaults for
//! every field:
//!
//! ```yaml
//! map_numerics: true
//! max_lob_length: 16777216
//! default_parse_policy: ignore
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What to do when a column's default literal does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultParsePolicy {
    /// Fail schema construction for the table
    #[default]
    Fail,
    /// Build the field without a default
    Ignore,
}

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Collapse `NUMERIC(p, 0)` columns with `p < 19` to integer fields
    #[serde(default)]
    pub map_numerics: bool,

    /// Maximum length of a large object that is materialized (bytes for
    /// BLOB, characters for CLOB/NCLOB)
    #[serde(default = "default_max_lob_length")]
    pub max_lob_length: u64,

    /// Handling of unparseable default literals
    #[serde(default)]
    pub default_parse_policy: DefaultParsePolicy,
}

fn default_max_lob_length() -> u64 {
    i32::MAX as u64
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            map_numerics: false,
            max_lob_length: default_max_lob_length(),
            default_parse_policy: DefaultParsePolicy::default(),
        }
    }
}

impl ConverterConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable numeric mapping
    pub fn with_map_numerics(mut self, map_numerics: bool) -> Self {
        self.map_numerics = map_numerics;
        self
    }

    /// Set the large object materialization limit
    pub fn with_max_lob_length(mut self, max_lob_length: u64) -> Self {
        self.max_lob_length = max_lob_length;
        self
    }

    /// Set the default parse policy
    pub fn with_default_parse_policy(mut self, policy: DefaultParsePolicy) -> Self {
        self.default_parse_policy = policy;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_lob_length == 0 {
            return Err(Error::config("max_lob_length must be greater than 0"));
        }
        if usize::try_from(self.max_lob_length).is_err() {
            return Err(Error::config(format!(
                "max_lob_length {} exceeds addressable memory",
                self.max_lob_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(!config.map_numerics);
        assert_eq!(config.max_lob_length, i32::MAX as u64);
        assert_eq!(config.default_parse_policy, DefaultParsePolicy::Fail);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ConverterConfig = serde_json::from_str(r#"{"map_numerics": true}"#).unwrap();
        assert!(config.map_numerics);
        assert_eq!(config.max_lob_length, i32::MAX as u64);

        let config: ConverterConfig =
            serde_json::from_str(r#"{"default_parse_policy": "ignore", "max_lob_length": 1024}"#)
                .unwrap();
        assert_eq!(config.default_parse_policy, DefaultParsePolicy::Ignore);
        assert_eq!(config.max_lob_length, 1024);
    }

    #[test]
    fn test_validate_rejects_zero_lob_length() {
        let config = ConverterConfig::new().with_max_lob_length(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_lob_length"));
    }
}
