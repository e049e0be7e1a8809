//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream Engage API settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Snapshot cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Refresh trigger authorization settings
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        })
    }

    /// Override deployment-specific values from the environment.
    ///
    /// `ENGAGE_BASE`, `REDIS_URL` and `REFRESH_SECRET` win over the TOML
    /// file so the same config file can ship across environments.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var("ENGAGE_BASE") {
            self.upstream.base_url = base;
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
        if let Ok(secret) = std::env::var("REFRESH_SECRET") {
            self.auth.refresh_secret = secret;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(AppError::validation("upstream.base_url is empty"));
        }
        if self.upstream.user_agent.trim().is_empty() {
            return Err(AppError::validation("upstream.user_agent is empty"));
        }
        if self.upstream.take == 0 {
            return Err(AppError::validation("upstream.take must be > 0"));
        }
        if self.upstream.request_timeout_secs == 0 {
            return Err(AppError::validation(
                "upstream.request_timeout_secs must be > 0",
            ));
        }
        if self.upstream.deadline_secs == 0 {
            return Err(AppError::validation("upstream.deadline_secs must be > 0"));
        }
        if self.upstream.retry_attempts == 0 {
            return Err(AppError::validation("upstream.retry_attempts must be > 0"));
        }
        if self.cache.key.trim().is_empty() {
            return Err(AppError::validation("cache.key is empty"));
        }
        Ok(())
    }
}

/// Upstream Engage API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the Engage instance
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Maximum number of items requested from upstream
    #[serde(default = "defaults::take")]
    pub take: u32,

    /// Byte-level timeout for a single request, in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Overall deadline shared by all retry attempts, in seconds
    #[serde(default = "defaults::deadline")]
    pub deadline_secs: u64,

    /// Total attempt budget (first try included)
    #[serde(default = "defaults::retry_attempts")]
    pub retry_attempts: u32,

    /// Linear backoff unit between failed attempts, in milliseconds
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            take: defaults::take(),
            request_timeout_secs: defaults::request_timeout(),
            deadline_secs: defaults::deadline(),
            retry_attempts: defaults::retry_attempts(),
            retry_backoff_ms: defaults::retry_backoff(),
        }
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL. None means in-process memory only (local dev).
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Logical key holding the current snapshot
    #[serde(default = "defaults::cache_key")]
    pub key: String,

    /// Connection timeout for the Redis backend, in milliseconds
    #[serde(default = "defaults::cache_connect_timeout")]
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key: defaults::cache_key(),
            connect_timeout_ms: defaults::cache_connect_timeout(),
        }
    }
}

/// Refresh trigger authorization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret required to trigger a refresh. Empty rejects everything.
    #[serde(default)]
    pub refresh_secret: String,
}

/// Default configuration values.
mod defaults {
    pub fn base_url() -> String {
        "https://rowan.campuslabs.com/engage".to_string()
    }

    pub fn user_agent() -> String {
        "ruhungry/1.0 (+https://github.com/ruhungry)".to_string()
    }

    pub fn take() -> u32 {
        2000
    }

    pub fn request_timeout() -> u64 {
        8
    }

    pub fn deadline() -> u64 {
        10
    }

    pub fn retry_attempts() -> u32 {
        3
    }

    pub fn retry_backoff() -> u64 {
        250
    }

    pub fn cache_key() -> String {
        "free_food_events".to_string()
    }

    pub fn cache_connect_timeout() -> u64 {
        100
    }
}
