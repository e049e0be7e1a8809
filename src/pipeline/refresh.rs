// src/pipeline/refresh.rs

//! Refresh orchestration.
//!
//! Composes fetch → strict filter → normalize → cache write. Any failure in
//! fetch or response-shape validation aborts the whole operation before
//! anything is written, so readers never observe a partially-applied or
//! empty-by-error refresh. A failed refresh is invisible, not destructive.

use std::time::Instant;

use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{Config, PublicEvent, Snapshot};
use crate::services::{EventSource, normalize_event, strict_filter};
use crate::storage::SnapshotStore;

/// Check a refresh credential against the configured shared secret.
///
/// Accepts the bare secret or a `Bearer <secret>` header value, compared
/// exactly. An empty configured secret rejects every credential.
pub fn authorize_refresh(expected: &str, credential: Option<&str>) -> Result<()> {
    if expected.is_empty() {
        return Err(AppError::Unauthorized);
    }

    let presented = credential.ok_or(AppError::Unauthorized)?;
    let token = presented.strip_prefix("Bearer ").unwrap_or(presented);
    if token == expected {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}

/// Run one refresh: fetch, filter, normalize, and publish a new snapshot.
///
/// The strict filter's reference instant is the invocation time. Returns
/// the assembled snapshot; on failure nothing is written and the previous
/// snapshot, if any, stays visible.
pub async fn run_refresh(
    source: &dyn EventSource,
    store: &SnapshotStore,
    config: &Config,
) -> Result<Snapshot> {
    let started = Instant::now();
    let now = Utc::now();

    let raw = source.fetch_events(now).await?;
    let source_count = raw.len();

    let kept = strict_filter(raw, now);
    let events: Vec<PublicEvent> = kept
        .iter()
        .map(|e| normalize_event(e, &config.upstream.base_url))
        .collect();

    let snapshot = Snapshot::new(source_count, started.elapsed().as_millis() as u64, events);
    let outcome = store.put(snapshot.clone()).await;

    log::info!(
        "Refresh complete: {} raw, {} kept, {} ms, persisted {:?}",
        snapshot.source_count,
        snapshot.filtered_count,
        snapshot.refresh_duration_ms,
        outcome
    );

    Ok(snapshot)
}

/// The refresh trigger boundary: authorize, then refresh.
///
/// Authorization is checked before any pipeline work begins.
pub async fn run_refresh_authorized(
    credential: Option<&str>,
    source: &dyn EventSource,
    store: &SnapshotStore,
    config: &Config,
) -> Result<Snapshot> {
    authorize_refresh(&config.auth.refresh_secret, credential)?;
    run_refresh(source, store, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawEvent;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    struct CannedSource(Vec<RawEvent>);

    #[async_trait]
    impl EventSource for CannedSource {
        async fn fetch_events(&self, _ends_after: DateTime<Utc>) -> Result<Vec<RawEvent>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl EventSource for FailingSource {
        async fn fetch_events(&self, _ends_after: DateTime<Utc>) -> Result<Vec<RawEvent>> {
            Err(AppError::UpstreamExhausted {
                attempts: 3,
                source: Box::new(AppError::UpstreamStatus { status: 500 }),
            })
        }
    }

    fn raw_event(id: &str, ends_on: &str) -> RawEvent {
        RawEvent {
            id: Some(id.to_string()),
            name: Some(format!("Event {id}")),
            ends_on: Some(ends_on.to_string()),
            visibility: Some("Public".to_string()),
            status: Some("Approved".to_string()),
            benefit_names: Some(vec!["Free Food".to_string()]),
            ..RawEvent::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_counts_and_snapshot() {
        let source = CannedSource(vec![
            raw_event("1", "2999-01-01T00:00:00Z"),
            raw_event("2", "2000-01-01T00:00:00Z"),
        ]);
        let store = SnapshotStore::memory_only();
        let config = Config::default();

        let snapshot = run_refresh(&source, &store, &config).await.unwrap();
        assert_eq!(snapshot.source_count, 2);
        assert_eq!(snapshot.filtered_count, 1);
        assert_eq!(snapshot.events.len(), 1);
        assert_eq!(snapshot.events[0].id, "1");

        // The same snapshot is what readers see.
        assert_eq!(store.get().await, Some(snapshot));
    }

    #[tokio::test]
    async fn test_failed_refresh_writes_nothing() {
        let store = SnapshotStore::memory_only();
        let config = Config::default();

        let result = run_refresh(&FailingSource, &store, &config).await;
        assert!(matches!(
            result,
            Err(AppError::UpstreamExhausted { attempts: 3, .. })
        ));
        assert_eq!(store.get().await, None);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_prior_snapshot() {
        let store = SnapshotStore::memory_only();
        let config = Config::default();

        let good = CannedSource(vec![raw_event("1", "2999-01-01T00:00:00Z")]);
        let first = run_refresh(&good, &store, &config).await.unwrap();

        let result = run_refresh(&FailingSource, &store, &config).await;
        assert!(result.is_err());
        assert_eq!(store.get().await, Some(first));
    }

    #[tokio::test]
    async fn test_authorized_refresh_rejects_before_fetching() {
        let store = SnapshotStore::memory_only();
        let mut config = Config::default();
        config.auth.refresh_secret = "hunter2".to_string();

        let good = CannedSource(vec![raw_event("1", "2999-01-01T00:00:00Z")]);
        let result = run_refresh_authorized(Some("wrong"), &good, &store, &config).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert_eq!(store.get().await, None);

        let snapshot = run_refresh_authorized(Some("hunter2"), &good, &store, &config)
            .await
            .unwrap();
        assert_eq!(snapshot.filtered_count, 1);
    }

    #[test]
    fn test_authorize_accepts_bearer_and_bare() {
        assert!(authorize_refresh("s3cret", Some("s3cret")).is_ok());
        assert!(authorize_refresh("s3cret", Some("Bearer s3cret")).is_ok());
    }

    #[test]
    fn test_authorize_rejects_wrong_or_missing() {
        assert!(authorize_refresh("s3cret", Some("Bearer other")).is_err());
        assert!(authorize_refresh("s3cret", Some("S3CRET")).is_err());
        assert!(authorize_refresh("s3cret", None).is_err());
    }

    #[test]
    fn test_authorize_rejects_when_no_secret_configured() {
        assert!(authorize_refresh("", Some("anything")).is_err());
        assert!(authorize_refresh("", Some("")).is_err());
    }
}
