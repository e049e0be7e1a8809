//! Data models for the aggregator.

pub mod config;
pub mod event;
pub mod snapshot;

pub use config::{AuthConfig, CacheConfig, Config, UpstreamConfig};
pub use event::{PublicEvent, RawEvent};
pub use snapshot::{SCHEMA_VERSION, Snapshot};
