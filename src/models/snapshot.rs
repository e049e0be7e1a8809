//! Snapshot cache payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PublicEvent;

/// Current version of the serialized snapshot shape.
pub const SCHEMA_VERSION: u32 = 1;

/// The single cached result of a refresh.
///
/// Created only by the refresh pipeline, replaced wholesale on each
/// successful refresh, never merged with a prior snapshot. Read-only to
/// every other component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Payload shape version, for forward compatibility
    pub schema_version: u32,

    /// When this snapshot was assembled
    pub last_refresh_iso: DateTime<Utc>,

    /// Raw records returned by the last fetch
    pub source_count: usize,

    /// Records surviving the strict filter (== events.len())
    pub filtered_count: usize,

    /// Wall-clock duration of the fetch+filter+normalize pipeline
    pub refresh_duration_ms: u64,

    /// Normalized events, in upstream order (ascending by end time)
    pub events: Vec<PublicEvent>,
}

impl Snapshot {
    /// Assemble a snapshot stamped with the current time.
    pub fn new(source_count: usize, refresh_duration_ms: u64, events: Vec<PublicEvent>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_refresh_iso: Utc::now(),
            source_count,
            filtered_count: events.len(),
            refresh_duration_ms,
            events,
        }
    }
}
