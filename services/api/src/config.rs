//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use digital_library_core::tracker::DEFAULT_SAMPLE_INTERVAL;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub suggestion_model: String,
    /// Period of the reading-session sampling task.
    pub tracking_interval: Duration,
    pub allowed_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_level: Level::INFO,
            openai_api_key: None,
            suggestion_model: "gpt-4o-mini".to_string(),
            tracking_interval: DEFAULT_SAMPLE_INTERVAL,
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; missing keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // --- Server Settings ---
        let bind_address = match lookup("BIND_ADDRESS") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?,
            None => defaults.bind_address,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = lookup("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin);

        // --- Suggestion Adapter ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        let suggestion_model = lookup("SUGGESTION_MODEL").unwrap_or(defaults.suggestion_model);

        // --- Activity Tracking ---
        let tracking_interval = match lookup("TRACKING_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "TRACKING_INTERVAL_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    ))
                }
            },
            None => defaults.tracking_interval,
        };

        Ok(Self {
            bind_address,
            log_level,
            openai_api_key,
            suggestion_model,
            tracking_interval,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.suggestion_model, "gpt-4o-mini");
        assert_eq!(config.tracking_interval, DEFAULT_SAMPLE_INTERVAL);
        assert_eq!(config.allowed_origin, "http://localhost:3000");
    }

    #[test]
    fn values_override_defaults() {
        let config = config_from(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("RUST_LOG", "debug"),
            ("OPENAI_API_KEY", "sk-test"),
            ("TRACKING_INTERVAL_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.bind_address.port(), 8080);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.tracking_interval, Duration::from_secs(5));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("BIND_ADDRESS", "not-an-address"),
            ("RUST_LOG", "loud"),
            ("TRACKING_INTERVAL_SECS", "0"),
            ("TRACKING_INTERVAL_SECS", "soon"),
        ] {
            match config_from(&[(key, value)]) {
                Err(ConfigError::InvalidValue(var, _)) => assert_eq!(var, key),
                other => panic!("expected InvalidValue for {}, got {:?}", key, other),
            }
        }
    }
}
