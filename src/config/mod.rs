//! Configuration for issdex

mod import;
mod index;
mod logging;

pub use import::{ImportConfig, MAX_IN_FLIGHT_BATCHES};
pub use index::{IndexConfig, QueryConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default name of the configuration file
pub const DEFAULT_CONFIG_FILE: &str = "issdex.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search index configuration
    #[serde(default)]
    pub index: IndexConfig,
    /// Bulk import configuration
    #[serde(default)]
    pub import: ImportConfig,
    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Validate all configuration fields.
    ///
    /// Collects every problem and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Index validation
        if self.index.name.is_empty() {
            errors.push("index name must not be empty".to_string());
        } else if !self
            .index
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            errors.push(format!(
                "index name '{}' may only contain ASCII letters, digits, '_' and '-'",
                self.index.name
            ));
        }
        if !self.index.in_memory && self.index.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }
        if self.index.writer_heap_bytes < index::MIN_WRITER_HEAP_BYTES {
            errors.push(format!(
                "writer_heap_bytes must be at least {}",
                index::MIN_WRITER_HEAP_BYTES
            ));
        }

        // Import validation
        if self.import.batch_size == 0 {
            errors.push("batch_size must be positive".to_string());
        }
        if self.import.max_in_flight_batches == 0 {
            errors.push("max_in_flight_batches must be positive".to_string());
        }
        if self.import.max_in_flight_batches > import::MAX_IN_FLIGHT_BATCHES {
            errors.push(format!(
                "max_in_flight_batches must be <= {}",
                import::MAX_IN_FLIGHT_BATCHES
            ));
        }

        // Query validation
        if self.query.top_k == 0 {
            errors.push("top_k must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.index.name, "iss");
        assert_eq!(config.import.batch_size, 10_000);
        assert_eq!(config.import.max_in_flight_batches, 1);
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.index.name = String::new();
        config.import.batch_size = 0;
        config.query.top_k = 0;

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("index name must not be empty"));
        assert!(message.contains("batch_size must be positive"));
        assert!(message.contains("top_k must be positive"));
    }

    #[test]
    fn test_rejects_index_name_with_path_separator() {
        let mut config = Config::default();
        config.index.name = "../iss".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[import]\nbatch_size = 500\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.import.batch_size, 500);
        assert_eq!(config.import.max_in_flight_batches, 1);
        assert_eq!(config.index.name, "iss");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.index.name, "iss");
        assert_eq!(parsed.query.top_k, 1);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.import.batch_size, 10_000);
    }
}
