use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::Config;

/// Project-local directory holding config, database and logs.
pub const CONFIG_DIR: &str = ".sleuth";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid burst_size: {0}. Must be at least 1")]
    InvalidBurstSize(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid tool_call_budget: {0}. Must be between 1 and 50")]
    InvalidToolBudget(u32),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 1.0")]
    InvalidTemperature(f32),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .sleuth/config.yaml (project config, created by init)
    /// 3. .sleuth/local.yaml (project local overrides, optional)
    /// 4. Environment variables (SLEUTH_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the config directory given explicitly.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("SLEUTH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !["json", "pretty"].contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !["daily", "hourly", "never"].contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.rate_limit.requests_per_second <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(config.rate_limit.requests_per_second));
        }
        if config.rate_limit.burst_size == 0 {
            return Err(ConfigError::InvalidBurstSize(config.rate_limit.burst_size));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        if config.oracle.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("oracle.model cannot be empty".to_string()));
        }
        if config.oracle.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed("oracle.max_tokens must be at least 1".to_string()));
        }

        let investigation = &config.investigation;
        if investigation.tool_call_budget == 0 || investigation.tool_call_budget > 50 {
            return Err(ConfigError::InvalidToolBudget(investigation.tool_call_budget));
        }
        if !(0.0..=1.0).contains(&investigation.temperature) {
            return Err(ConfigError::InvalidTemperature(investigation.temperature));
        }
        if investigation.search_k == 0 {
            return Err(ConfigError::ValidationFailed("investigation.search_k must be at least 1".to_string()));
        }
        if investigation.oracle_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "investigation.oracle_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.database.path, ".sleuth/sleuth.db");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_zero_rate_limit() {
        let mut config = Config::default();
        config.rate_limit.requests_per_second = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 30000;
        config.retry.max_backoff_ms = 10000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(30000, 10000))
        ));
    }

    #[test]
    fn test_validate_tool_budget_and_temperature() {
        let mut config = Config::default();
        config.investigation.tool_call_budget = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidToolBudget(0))
        ));

        let mut config = Config::default();
        config.investigation.temperature = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "investigation:\n  history_window: 3\nlogging:\n  format: json").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.investigation.history_window, 3);
        assert_eq!(config.investigation.tool_call_budget, 8);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_local_overrides_project_and_env_overrides_both() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "logging:\n  level: info\n  format: json\ninvestigation:\n  search_k: 3\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("local.yaml"), "logging:\n  level: debug\n").unwrap();

        temp_env::with_vars(
            [
                ("SLEUTH_INVESTIGATION__SEARCH_K", Some("7")),
                ("SLEUTH_LOGGING__LEVEL", None::<&str>),
            ],
            || {
                let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
                assert_eq!(config.logging.level, "debug", "local.yaml should win over config.yaml");
                assert_eq!(config.logging.format, "json", "config.yaml value should persist");
                assert_eq!(config.investigation.search_k, 7, "env should win over files");
            },
        );
    }

    #[test]
    fn test_invalid_env_value_fails_validation() {
        let dir = TempDir::new().unwrap();
        temp_env::with_var("SLEUTH_LOGGING__FORMAT", Some("xml"), || {
            assert!(ConfigLoader::load_from_dir(dir.path()).is_err());
        });
    }
}
