//! Dispatch configuration (astro.toml)
//!
//! ```toml
//! [dispatch]
//! zero_arg_call_sugar = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::context::DispatchPolicy;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Dispatch settings
    #[serde(default)]
    pub dispatch: DispatchSection,
}

/// `[dispatch]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchSection {
    /// Let bare names invoke methods that accept zero arguments (default: true)
    #[serde(default = "default_call_sugar")]
    pub zero_arg_call_sugar: bool,
}

fn default_call_sugar() -> bool {
    true
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            zero_arg_call_sugar: default_call_sugar(),
        }
    }
}

impl DispatchConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Dispatch policy described by this configuration
    pub fn policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            zero_arg_call_sugar: self.dispatch.zero_arg_call_sugar,
        }
    }
}

impl From<&DispatchConfig> for DispatchPolicy {
    fn from(config: &DispatchConfig) -> Self {
        config.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DispatchConfig::from_str("").unwrap();
        assert_eq!(config, DispatchConfig::default());
        assert!(config.policy().zero_arg_call_sugar);
    }

    #[test]
    fn test_disable_call_sugar() {
        let config = DispatchConfig::from_str("[dispatch]\nzero_arg_call_sugar = false\n").unwrap();
        assert_eq!(
            DispatchPolicy::from(&config),
            DispatchPolicy {
                zero_arg_call_sugar: false
            }
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = DispatchConfig::from_str("[dispatch]\nprefix_matching = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(DispatchConfig::from_str("[logging]\nlevel = \"debug\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dispatch]").unwrap();
        writeln!(file, "zero_arg_call_sugar = false").unwrap();

        let config = DispatchConfig::from_file(file.path()).unwrap();
        assert!(!config.dispatch.zero_arg_call_sugar);

        let missing = DispatchConfig::from_file(Path::new("/nonexistent/astro.toml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }
}
