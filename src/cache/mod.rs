//! In-memory caching for paginated API results.
//!
//! This module is service-agnostic:
//! - Keeps one entry per key with an explicit `NotFetched -> Fetching -> Fetched` lifecycle
//! - Stores only fully drained lists, never a partially consumed stream
//! - Records whether a list is complete or was truncated by an error status
//!
//! Nothing is persisted; every process run starts cold.

mod store;
mod types;

pub use store::CacheStore;
pub use types::{CacheResult, CacheSource, Completion, FetchState, Fetched};
