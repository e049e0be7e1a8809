//! Pipeline entry points.
//!
//! - `run_refresh` / `run_refresh_authorized`: fetch, filter, normalize,
//!   and publish a new snapshot
//! - `run_query`: derive a filtered view over the current snapshot

pub mod query;
pub mod refresh;

pub use query::{QueryParams, QueryResult, run_query};
pub use refresh::{authorize_refresh, run_refresh, run_refresh_authorized};
