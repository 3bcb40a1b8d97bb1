//! Runtime configuration loaded from the environment.
//!
//! | Env Var            | Default        |
//! |--------------------|----------------|
//! | `DATABASE_URL`     | required       |
//! | `KHATMA_POOL_SIZE` | `8`            |
//! | `KHATMA_LOG`       | `khatma=info`  |
//!
//! A `.env` file in the working directory is read first when present.

use thiserror::Error;

/// Default number of pooled database connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "khatma=info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable holds a value that cannot be parsed.
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Process configuration for the khatma binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KhatmaConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// Tracing filter directive.
    pub log_filter: String,
}

impl KhatmaConfig {
    /// Loads configuration from the process environment, after applying any
    /// `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _dotenv = dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_URL` is missing or a value
    /// fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = present("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let pool_size = match present("KHATMA_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => parse_pool_size(&raw)?,
        };

        let log_filter =
            present("KHATMA_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        Ok(Self {
            database_url,
            pool_size,
            log_filter,
        })
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "KHATMA_POOL_SIZE",
        value: raw.to_owned(),
        reason,
    };
    let size = raw
        .trim()
        .parse::<u32>()
        .map_err(|err| invalid(err.to_string()))?;
    if size == 0 {
        return Err(invalid("must be at least 1".to_owned()));
    }
    Ok(size)
}
