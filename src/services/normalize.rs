// src/services/normalize.rs

//! Normalization of filtered raw records into the public schema.
//!
//! Total mapping: a record that passed the strict filter always yields a
//! `PublicEvent`. Field inconsistencies degrade to empty or `None` rather
//! than failing.

use crate::models::{PublicEvent, RawEvent};

/// Map one filtered raw record to the public schema.
///
/// Organization resolution precedence: explicit single name first, else
/// the first entry of the name list, else none. Benefits are copied
/// verbatim, neither re-filtered nor deduplicated.
pub fn normalize_event(raw: &RawEvent, base_url: &str) -> PublicEvent {
    let base = base_url.trim_end_matches('/');
    let id = raw.id.clone().unwrap_or_default();

    let org = raw.organization_name.clone().or_else(|| {
        raw.organization_names
            .as_ref()
            .and_then(|names| names.first().cloned())
    });

    PublicEvent {
        event_url: format!("{base}/event/{id}"),
        image_url: raw
            .image_path
            .as_ref()
            .map(|token| format!("{base}/image/{token}")),
        title: raw.name.clone().unwrap_or_default(),
        starts_on: raw.starts_on.clone().unwrap_or_default(),
        ends_on: raw.ends_on.clone().unwrap_or_default(),
        org,
        location_text: raw.location.clone(),
        benefits: raw.benefit_names.clone().unwrap_or_default(),
        id,
    }
}
