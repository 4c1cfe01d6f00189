use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;

use crate::{log_system_event, log_validation};

/// Application configuration loaded once at startup and injected into
/// components. Nothing in the core reads environment variables after this.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Logging system configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables (and a .env file when
    /// present) with sensible defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        log_system_event!(config, "Loading configuration from environment");

        let config = Config {
            database: DatabaseConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(anyhow!("DATABASE_URL must start with 'sqlite:'"));
        }

        if !["trace", "debug", "info", "warn", "error"]
            .contains(&base_level(&self.logging.level).to_lowercase().as_str())
        {
            log_validation!(
                failure,
                "configuration",
                error = anyhow!("invalid log level '{}', using 'info' as fallback", self.logging.level)
            );
        }

        log_validation!(success, "configuration", "configuration values validated");
        Ok(())
    }
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:skylearn.db".to_string());
        Ok(DatabaseConfig { url })
    }
}

impl LoggingConfig {
    fn from_env() -> Result<Self> {
        let level =
            env::var("RUST_LOG").unwrap_or_else(|_| "info,skylearn_core=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

/// First directive of an env-filter string, without any target qualifier.
fn base_level(level: &str) -> &str {
    level.split(',').next().unwrap_or(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_enabled: false,
                console_enabled: true,
                log_directory: "logs".to_string(),
            },
        }
    }

    #[test]
    fn test_base_level_extraction() {
        assert_eq!(base_level("info"), "info");
        assert_eq!(base_level("info,skylearn_core=debug"), "info");
        assert_eq!(base_level(""), "");
    }

    #[test]
    fn test_config_validation_accepts_sqlite_url() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_other_schemes() {
        let mut config = test_config();
        config.database.url = "postgres://localhost/skylearn".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_level_is_soft_failure() {
        let mut config = test_config();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_ok());
    }
}
