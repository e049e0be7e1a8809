// src/pipeline/query.rs

//! Read-side query over the current snapshot.
//!
//! Derives a filtered, sorted, truncated view per request without mutating
//! the snapshot. Never fails for data-availability reasons: an absent
//! snapshot yields an empty result, and malformed bound parameters are
//! treated as "bound not supplied".

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::PublicEvent;
use crate::services::parse_iso;
use crate::storage::SnapshotStore;

/// Result cap applied when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 100;

/// Hard upper bound on the result cap.
pub const MAX_LIMIT: i64 = 1000;

/// Caller-specified query parameters, all optional.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    /// Inclusive lower bound: events must end at or after this instant
    pub from: Option<String>,

    /// Inclusive upper bound: events must start at or before this instant
    pub to: Option<String>,

    /// Case-insensitive organization substring
    pub org: Option<String>,

    /// Result cap, clamped to [1, 1000]; default 100
    pub limit: Option<i64>,
}

/// A derived view over the current snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// When the underlying snapshot was refreshed; None if no snapshot exists
    pub last_refresh: Option<DateTime<Utc>>,

    /// Length of `events` after truncation
    pub count: usize,

    /// Filtered, sorted, truncated events
    pub events: Vec<PublicEvent>,
}

impl QueryResult {
    fn empty() -> Self {
        Self {
            last_refresh: None,
            count: 0,
            events: Vec::new(),
        }
    }
}

/// Query the current snapshot.
pub async fn run_query(store: &SnapshotStore, params: &QueryParams) -> QueryResult {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;

    let Some(snapshot) = store.get().await else {
        return QueryResult::empty();
    };

    let from = params.from.as_deref().and_then(parse_iso);
    let to = params.to.as_deref().and_then(parse_iso);
    let needle = params.org.as_deref().map(str::to_lowercase);

    let mut events: Vec<PublicEvent> = snapshot
        .events
        .into_iter()
        .filter(|e| {
            // An event whose own timestamp does not parse is excluded by a
            // supplied bound.
            from.is_none_or(|bound| parse_iso(&e.ends_on).is_some_and(|t| t >= bound))
                && to.is_none_or(|bound| parse_iso(&e.starts_on).is_some_and(|t| t <= bound))
                && needle.as_deref().is_none_or(|n| {
                    e.org.as_deref().unwrap_or("").to_lowercase().contains(n)
                })
        })
        .collect();

    events.sort_by_key(|e| parse_iso(&e.starts_on));
    events.truncate(limit);

    QueryResult {
        last_refresh: Some(snapshot.last_refresh_iso),
        count: events.len(),
        events,
    }
}
