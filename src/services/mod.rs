//! Ingestion services: fetch, filter, normalize.

pub mod fetch;
pub mod filter;
pub mod normalize;

pub use fetch::{EngageClient, EventSource};
pub use filter::{parse_iso, strict_filter};
pub use normalize::normalize_event;
