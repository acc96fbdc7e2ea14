//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `REDEMPTION` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use redemption_service::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod redemption;
mod redis;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redemption::RedemptionConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (group cache)
    pub redis: RedisConfig,

    /// Redemption engine tuning
    #[serde(default)]
    pub redemption: RedemptionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `REDEMPTION` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `REDEMPTION__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `REDEMPTION__DATABASE__URL=...` -> `database.url = ...`
    /// - `REDEMPTION__REDEMPTION__MAX_JITTER_MS=0` -> `redemption.max_jitter_ms = 0`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("REDEMPTION")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.redemption.validate()?;
        if self.redemption.max_jitter() >= self.server.request_timeout() {
            return Err(ValidationError::JitterExceedsRequestTimeout);
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("REDEMPTION__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("REDEMPTION__REDIS__URL", "redis://localhost:6379");
    }

    fn clear_env() {
        for var in [
            "REDEMPTION__DATABASE__URL",
            "REDEMPTION__REDIS__URL",
            "REDEMPTION__SERVER__PORT",
            "REDEMPTION__SERVER__ENVIRONMENT",
            "REDEMPTION__SERVER__REQUEST_TIMEOUT_SECS",
            "REDEMPTION__REDEMPTION__MAX_JITTER_MS",
            "REDEMPTION__REDEMPTION__CLEANUP_INTERVAL_SECS",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_section_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.redemption.max_jitter_ms, 300);
        assert_eq!(config.redemption.cleanup_interval_secs, 3600);
    }

    #[test]
    fn test_overrides_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("REDEMPTION__SERVER__PORT", "3000");
        env::set_var("REDEMPTION__SERVER__ENVIRONMENT", "production");
        env::set_var("REDEMPTION__REDEMPTION__MAX_JITTER_MS", "0");
        env::set_var("REDEMPTION__REDEMPTION__CLEANUP_INTERVAL_SECS", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.redemption.max_jitter_ms, 0);
        assert_eq!(config.redemption.cleanup_interval(), None);
    }

    #[test]
    fn test_jitter_must_fit_inside_request_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("REDEMPTION__SERVER__REQUEST_TIMEOUT_SECS", "1");
        env::set_var("REDEMPTION__REDEMPTION__MAX_JITTER_MS", "1000");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::JitterExceedsRequestTimeout)
        ));
    }

    #[test]
    fn test_missing_database_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("REDEMPTION__REDIS__URL", "redis://localhost:6379");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
