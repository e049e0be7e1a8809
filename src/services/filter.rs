// src/services/filter.rs

//! Strict local filter for free-food events.
//!
//! Upstream already restricts `status=Approved`, but that filter is
//! advisory: every predicate is re-checked here. A record must satisfy all
//! five to survive:
//!
//! 1. `endsOn` parses to a valid instant
//! 2. `endsOn` is at or after the reference instant (boundary inclusive)
//! 3. visibility equals "public" (case-insensitive)
//! 4. status equals "approved" (case-insensitive)
//! 5. the benefit list contains "free food" (case-insensitive)
//!
//! Output preserves input order. Failing records are silently dropped;
//! only the aggregate counts surface in the snapshot metadata.

use chrono::{DateTime, Utc};

use crate::models::RawEvent;

/// The benefit tag a record must carry.
const FREE_FOOD_TAG: &str = "free food";

/// Parse an ISO 8601 timestamp into a UTC instant.
pub fn parse_iso(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Apply the strict filter against the given reference instant.
///
/// The reference instant is a parameter so tests can pin it; callers
/// default it to the invocation time.
pub fn strict_filter(raw: Vec<RawEvent>, now: DateTime<Utc>) -> Vec<RawEvent> {
    raw.into_iter().filter(|e| passes(e, now)).collect()
}

fn passes(event: &RawEvent, now: DateTime<Utc>) -> bool {
    let Some(ends_on) = event.ends_on.as_deref().and_then(parse_iso) else {
        return false;
    };

    ends_on >= now
        && field_is(event.visibility.as_deref(), "public")
        && field_is(event.status.as_deref(), "approved")
        && has_free_food_tag(event)
}

fn field_is(field: Option<&str>, expected: &str) -> bool {
    field.is_some_and(|v| v.eq_ignore_ascii_case(expected))
}

fn has_free_food_tag(event: &RawEvent) -> bool {
    event
        .benefit_names
        .as_ref()
        .is_some_and(|tags| tags.iter().any(|t| t.eq_ignore_ascii_case(FREE_FOOD_TAG)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference_now() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    fn passing_event(id: &str) -> RawEvent {
        RawEvent {
            id: Some(id.to_string()),
            ends_on: Some("2999-01-01T00:00:00Z".to_string()),
            visibility: Some("Public".to_string()),
            status: Some("Approved".to_string()),
            benefit_names: Some(vec!["Free Food".to_string()]),
            ..RawEvent::default()
        }
    }

    #[test]
    fn test_passing_event_survives() {
        let kept = strict_filter(vec![passing_event("1")], reference_now());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_unparseable_ends_on_dropped() {
        let mut event = passing_event("1");
        event.ends_on = Some("not a date".to_string());
        assert!(strict_filter(vec![event], reference_now()).is_empty());

        let mut event = passing_event("2");
        event.ends_on = None;
        assert!(strict_filter(vec![event], reference_now()).is_empty());
    }

    #[test]
    fn test_past_event_dropped() {
        let mut event = passing_event("1");
        event.ends_on = Some("2000-01-01T00:00:00Z".to_string());
        assert!(strict_filter(vec![event], reference_now()).is_empty());
    }

    #[test]
    fn test_ends_exactly_now_is_kept() {
        // Boundary is inclusive: presently-ending events count.
        let mut event = passing_event("1");
        event.ends_on = Some("2024-01-01T00:00:00Z".to_string());
        assert_eq!(strict_filter(vec![event], reference_now()).len(), 1);
    }

    #[test]
    fn test_visibility_case_insensitive() {
        let mut event = passing_event("1");
        event.visibility = Some("PUBLIC".to_string());
        assert_eq!(strict_filter(vec![event], reference_now()).len(), 1);

        let mut event = passing_event("2");
        event.visibility = Some("Unlisted".to_string());
        assert!(strict_filter(vec![event], reference_now()).is_empty());

        let mut event = passing_event("3");
        event.visibility = None;
        assert!(strict_filter(vec![event], reference_now()).is_empty());
    }

    #[test]
    fn test_status_must_be_approved() {
        let mut event = passing_event("1");
        event.status = Some("Pending".to_string());
        assert!(strict_filter(vec![event], reference_now()).is_empty());
    }

    #[test]
    fn test_benefit_tag_case_insensitive() {
        let mut event = passing_event("1");
        event.benefit_names = Some(vec!["Swag".to_string(), "FREE FOOD".to_string()]);
        assert_eq!(strict_filter(vec![event], reference_now()).len(), 1);
    }

    #[test]
    fn test_input_order_preserved() {
        let kept = strict_filter(
            vec![passing_event("a"), passing_event("b"), passing_event("c")],
            reference_now(),
        );
        let ids: Vec<_> = kept.iter().map(|e| e.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mixed_future_and_past_events() {
        let future = passing_event("1");
        let mut past = passing_event("2");
        past.ends_on = Some("2000-01-01T00:00:00Z".to_string());

        let kept = strict_filter(vec![future, past], reference_now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id.as_deref(), Some("1"));
    }

    proptest! {
        /// Any record whose tag list never contains "free food"
        /// (case-insensitively) is excluded, whatever else it carries.
        #[test]
        fn prop_missing_free_food_tag_excludes(
            tags in prop::collection::vec("[a-zA-Z ]{0,20}", 0..8),
        ) {
            prop_assume!(!tags.iter().any(|t| t.eq_ignore_ascii_case("free food")));

            let mut event = passing_event("1");
            event.benefit_names = Some(tags);
            prop_assert!(strict_filter(vec![event], reference_now()).is_empty());
        }

        /// Tag lists that do contain the tag are kept, regardless of the
        /// noise around it.
        #[test]
        fn prop_free_food_tag_keeps(
            before in prop::collection::vec("[a-z]{0,10}", 0..4),
            after in prop::collection::vec("[a-z]{0,10}", 0..4),
        ) {
            let mut tags = before;
            tags.push("Free Food".to_string());
            tags.extend(after);

            let mut event = passing_event("1");
            event.benefit_names = Some(tags);
            prop_assert_eq!(strict_filter(vec![event], reference_now()).len(), 1);
        }
    }
}
