// src/services/fetch.rs

//! Remote fetcher for the Engage discovery API.
//!
//! Performs one bounded search request with retry and linear backoff, all
//! attempts sharing a single overall deadline. The upstream `status=Approved`
//! restriction is an optimization only; the strict filter re-applies it
//! locally because the upstream filter is advisory.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, RawEvent};

/// Source of raw event records.
///
/// The refresh pipeline depends on this seam rather than on a concrete
/// client so tests can substitute canned or failing sources.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch raw events ending at or after the given instant.
    async fn fetch_events(&self, ends_after: DateTime<Utc>) -> Result<Vec<RawEvent>>;
}

/// HTTP client for the Engage discovery API.
pub struct EngageClient {
    config: Arc<Config>,
    client: Client,
}

impl EngageClient {
    /// Create a new client with the configured user agent and request timeout.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.upstream.user_agent.as_str())
            .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Build the bounded search URL.
    ///
    /// Orders ascending by end time and restricts status server-side.
    fn search_url(&self, ends_after: DateTime<Utc>) -> Result<Url> {
        let base = self.config.upstream.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/api/discovery/event/search"))?;
        url.query_pairs_mut()
            .append_pair(
                "endsAfter",
                &ends_after.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair("orderByField", "endsOn")
            .append_pair("orderByDirection", "ascending")
            .append_pair("status", "Approved")
            .append_pair("take", &self.config.upstream.take.to_string());
        Ok(url)
    }

    /// Run the retry loop for one search URL, returning the response body.
    async fn fetch_with_retry(&self, url: &Url) -> Result<String> {
        let attempts = self.config.upstream.retry_attempts.max(1);
        let backoff = Duration::from_millis(self.config.upstream.retry_backoff_ms);

        let mut attempt = 1;
        loop {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(error) if attempt < attempts => {
                    log::warn!("Upstream attempt {}/{} failed: {}", attempt, attempts, error);
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff * attempt).await;
                    }
                    attempt += 1;
                }
                Err(error) => {
                    return Err(AppError::UpstreamExhausted {
                        attempts,
                        source: Box::new(error),
                    });
                }
            }
        }
    }

    /// One attempt: transport errors and non-success statuses both fail it.
    async fn try_fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl EventSource for EngageClient {
    async fn fetch_events(&self, ends_after: DateTime<Utc>) -> Result<Vec<RawEvent>> {
        let url = self.search_url(ends_after)?;
        let deadline = Duration::from_secs(self.config.upstream.deadline_secs);

        // The deadline covers every retry attempt; firing mid-attempt
        // cancels it and fails the whole call.
        let body = tokio::time::timeout(deadline, self.fetch_with_retry(&url))
            .await
            .map_err(|_| AppError::Deadline(deadline))??;

        parse_events(&body)
    }
}

/// Parse the search response body.
///
/// Accepts a bare array of raw records or an envelope object exposing the
/// array under `value`. Any other top-level shape is a terminal failure,
/// never retried.
pub(crate) fn parse_events(body: &str) -> Result<Vec<RawEvent>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(mut envelope) => match envelope.remove("value") {
            Some(inner @ serde_json::Value::Array(_)) => Ok(serde_json::from_value(inner)?),
            _ => Err(AppError::shape(
                "object response is missing a `value` array",
            )),
        },
        _ => Err(AppError::shape("expected an array or an envelope object")),
    }
}
