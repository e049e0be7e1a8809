// src/error.rs

//! Unified error handling for the aggregator.

use std::time::Duration;

use thiserror::Error;

/// Result type alias for aggregator operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Upstream responded with a non-success HTTP status
    #[error("upstream returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    /// Upstream fetch failed after exhausting the retry budget
    #[error("upstream fetch failed after {attempts} attempts: {source}")]
    UpstreamExhausted {
        attempts: u32,
        #[source]
        source: Box<AppError>,
    },

    /// The overall fetch deadline fired before any attempt succeeded
    #[error("upstream fetch deadline of {0:?} exceeded")]
    Deadline(Duration),

    /// Upstream response had an unexpected top-level shape (terminal, not retried)
    #[error("unexpected upstream response shape: {0}")]
    UpstreamShape(String),

    /// Durable cache backend error (never terminal to store callers)
    #[error("cache backend error: {0}")]
    Cache(String),

    /// Refresh trigger credential missing or wrong
    #[error("unauthorized refresh request")]
    Unauthorized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a response-shape error.
    pub fn shape(message: impl Into<String>) -> Self {
        Self::UpstreamShape(message.into())
    }

    /// Create a cache backend error.
    pub fn cache(message: impl ToString) -> Self {
        Self::Cache(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
