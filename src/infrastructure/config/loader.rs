use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid target_total: {0}. Must be at least 1")]
    InvalidTargetTotal(usize),

    #[error("Invalid expected_categories: {0}. Must be at least 1")]
    InvalidExpectedCategories(usize),

    #[error(
        "target_total ({target}) is below expected_categories ({expected}); \
         the per-category quota would be zero and nothing would be sampled"
    )]
    TargetBelowCategories { target: usize, expected: usize },

    #[error("Invalid page_size: {0}. Must be between 1 and 5000")]
    InvalidPageSize(u64),

    #[error("API base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("balance_field cannot be empty")]
    EmptyBalanceField,

    #[error("destination_table cannot be empty")]
    EmptyDestinationTable,

    #[error("Invalid chunk_size: {0}. Must be at least 1")]
    InvalidChunkSize(usize),

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid requests_per_minute: {0}. Must be at least 1")]
    InvalidRequestsPerMinute(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .stratify/config.yaml (project config, created by init)
    /// 3. .stratify/local.yaml (local overrides, optional — the usual home
    ///    for the database URL)
    /// 4. Environment variables (STRATIFY_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".stratify/config.yaml"))
            .merge(Yaml::file(".stratify/local.yaml"))
            .merge(Env::prefixed("STRATIFY_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("STRATIFY_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// The database URL is deliberately not validated here: commands that
    /// never touch the sink (plan, dry runs) must work without one.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.sampling.target_total == 0 {
            return Err(ConfigError::InvalidTargetTotal(config.sampling.target_total));
        }
        if config.sampling.expected_categories == 0 {
            return Err(ConfigError::InvalidExpectedCategories(
                config.sampling.expected_categories,
            ));
        }
        if config.sampling.target_total < config.sampling.expected_categories {
            return Err(ConfigError::TargetBelowCategories {
                target: config.sampling.target_total,
                expected: config.sampling.expected_categories,
            });
        }
        if config.sampling.balance_field.is_empty() {
            return Err(ConfigError::EmptyBalanceField);
        }
        if config.sampling.destination_table.is_empty() {
            return Err(ConfigError::EmptyDestinationTable);
        }

        if config.api.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if config.api.page_size == 0 || config.api.page_size > 5000 {
            return Err(ConfigError::InvalidPageSize(config.api.page_size));
        }
        if config.api.requests_per_minute == 0 {
            return Err(ConfigError::InvalidRequestsPerMinute(
                config.api.requests_per_minute,
            ));
        }

        if config.database.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(config.database.chunk_size));
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_yaml_overrides_parse() {
        let yaml = r#"
sampling:
  target_total: 200
  expected_categories: 4
  balance_field: specialty
api:
  page_size: 50
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.sampling.target_total, 200);
        assert_eq!(config.sampling.records_per_category(), 50);
        assert_eq!(config.api.page_size, 50);
        // Untouched sections keep their defaults.
        assert_eq!(config.database.chunk_size, 1000);
    }

    #[test]
    fn test_zero_target_rejected() {
        let mut config = Config::default();
        config.sampling.target_total = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTargetTotal(0))
        ));
    }

    #[test]
    fn test_target_below_categories_rejected() {
        let mut config = Config::default();
        config.sampling.target_total = 50;
        config.sampling.expected_categories = 104;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::TargetBelowCategories { .. })
        ));
    }

    #[test]
    fn test_oversized_page_rejected() {
        let mut config = Config::default();
        config.api.page_size = 10_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPageSize(10_000))
        ));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_inverted_backoff_rejected() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 60_000;
        config.retry.max_backoff_ms = 1000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(60_000, 1000))
        ));
    }
}
