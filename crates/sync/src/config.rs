//! Sync layer configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `RECIPE_BOX_CACHE_CAPACITY` - Maximum cached read results (default: 1000)
//! - `RECIPE_BOX_CACHE_TTL_SECS` - Entry time-to-live in seconds, `0` disables expiry (default: 300)
//! - `RECIPE_BOX_NOTIFY_BUFFER` - Invalidation event buffer per subscriber (default: 64)
//! - `RECIPE_BOX_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_EVENT_BUFFER: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

/// Sync layer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Maximum number of cached read results
    pub cache_capacity: u64,
    /// Time-to-live for cached results; `None` keeps them until invalidated
    pub cache_ttl: Option<Duration>,
    /// Capacity of the invalidation broadcast channel
    pub event_buffer: usize,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            event_buffer: DEFAULT_EVENT_BUFFER,
            log_format: LogFormat::Pretty,
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cache_capacity =
            get_parsed(&source, "RECIPE_BOX_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        let ttl_secs = get_parsed(&source, "RECIPE_BOX_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let event_buffer = get_parsed(&source, "RECIPE_BOX_NOTIFY_BUFFER", DEFAULT_EVENT_BUFFER)?;
        let log_format = get_parsed(&source, "RECIPE_BOX_LOG_FORMAT", LogFormat::Pretty)?;

        if event_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "RECIPE_BOX_NOTIFY_BUFFER".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            cache_capacity,
            cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
            event_buffer,
            log_format,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an optional variable, falling back to `default` when unset.
fn get_parsed<T>(
    source: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
