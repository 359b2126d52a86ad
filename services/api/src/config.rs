//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use qa_testgen_core::CompletionSettings;
use std::net::SocketAddr;
use std::str::FromStr;
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
    pub cors_origin: String,
    /// Absent means every completion call fails as misconfigured.
    pub completion_api_key: Option<String>,
    pub completion_api_base: String,
    pub completion_model: String,
    pub completion_max_tokens: u32,
    pub completion_temperature: f32,
    pub completion_timeout: Duration,
    pub max_request_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", &var_or("BIND_ADDRESS", "0.0.0.0:8080"))?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");
        let max_request_bytes =
            parse_var("MAX_REQUEST_BYTES", &var_or("MAX_REQUEST_BYTES", "26214400"))?;

        // --- Completion Service Settings ---
        let completion_api_key = lookup("GROQ_API_KEY").filter(|key| !key.trim().is_empty());
        let completion_api_base =
            var_or("COMPLETION_API_BASE", "https://api.groq.com/openai/v1");
        let completion_model = var_or("COMPLETION_MODEL", "llama-3.3-70b-versatile");
        let completion_max_tokens =
            parse_var("COMPLETION_MAX_TOKENS", &var_or("COMPLETION_MAX_TOKENS", "2000"))?;
        let completion_temperature =
            parse_var("COMPLETION_TEMPERATURE", &var_or("COMPLETION_TEMPERATURE", "0.7"))?;
        let timeout_secs: u64 =
            parse_var("COMPLETION_TIMEOUT_SECS", &var_or("COMPLETION_TIMEOUT_SECS", "30"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "COMPLETION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            cors_origin,
            completion_api_key,
            completion_api_base,
            completion_model,
            completion_max_tokens,
            completion_temperature,
            completion_timeout: Duration::from_secs(timeout_secs),
            max_request_bytes,
        })
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            max_tokens: self.completion_max_tokens,
            temperature: self.completion_temperature,
            timeout: self.completion_timeout,
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}
