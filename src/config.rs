//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Idle time after which a session is dropped
    pub session_ttl: Duration,

    /// How often expired sessions are purged
    pub session_sweep_interval: Duration,

    /// `pretty` or `json`
    pub log_format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://atm.db".to_string());

        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", "5")?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_var("PORT", "5000")?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let session_ttl = Duration::from_secs(parse_var("SESSION_TTL_SECONDS", "900")?);
        if session_ttl.is_zero() {
            return Err(ConfigError::InvalidValue("SESSION_TTL_SECONDS"));
        }

        let session_sweep_interval =
            Duration::from_secs(parse_var("SESSION_SWEEP_INTERVAL_SECONDS", "60")?);
        if session_sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue("SESSION_SWEEP_INTERVAL_SECONDS"));
        }

        let log_format = env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .parse()?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            session_ttl,
            session_sweep_interval,
            log_format,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name))
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
