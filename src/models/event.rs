//! Event data structures.
//!
//! `RawEvent` mirrors the loose shape Engage returns: nearly every field is
//! optional, ids arrive as strings or numbers depending on the endpoint, and
//! unknown fields are ignored. `PublicEvent` is the stable schema this
//! system owns.

use serde::{Deserialize, Deserializer, Serialize};

/// A raw event record as returned by the Engage discovery API.
///
/// Not controlled by this system. Fields may be absent or malformed, so
/// everything is optional and downstream code resolves defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    /// Stable upstream identifier (string or number on the wire)
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,

    /// Event title
    pub name: Option<String>,

    /// Start timestamp, ISO 8601
    pub starts_on: Option<String>,

    /// End timestamp, ISO 8601
    pub ends_on: Option<String>,

    /// Free-form location text
    pub location: Option<String>,

    /// Single hosting organization name
    pub organization_name: Option<String>,

    /// List of hosting organization names
    pub organization_names: Option<Vec<String>>,

    /// Benefit tags, e.g. "Free Food"
    pub benefit_names: Option<Vec<String>>,

    /// Visibility string, e.g. "Public"
    pub visibility: Option<String>,

    /// Approval status string, e.g. "Approved"
    pub status: Option<String>,

    /// Image path token (not a full URL)
    pub image_path: Option<String>,
}

/// Accept an id as either a JSON string or a JSON number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(i64),
    }

    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    }))
}

/// A normalized public event. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    /// Stable identifier carried from the raw record
    pub id: String,

    /// Event title
    pub title: String,

    /// Start timestamp, ISO 8601
    pub starts_on: String,

    /// End timestamp, ISO 8601
    pub ends_on: String,

    /// Hosting organization, if any
    pub org: Option<String>,

    /// Free-form location text, if any
    pub location_text: Option<String>,

    /// Benefit tags, copied verbatim from the raw record
    pub benefits: Vec<String>,

    /// Link to the event page on Engage
    pub event_url: String,

    /// Link to the event image, if the raw record carried one
    pub image_url: Option<String>,
}
