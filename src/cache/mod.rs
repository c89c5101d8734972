//! Keyed, time-aware cache of query results.
//!
//! This module provides the normalized server-state cache:
//! - single-flight fetching (concurrent readers of one key share one fetch)
//! - stale-while-revalidate (stale entries are served immediately while a
//!   background refresh replaces them)
//! - prefix invalidation (mutations force dependent reads to refetch)

mod key;
mod store;

pub use key::{KeyPrefix, QueryKey};
pub use store::QueryCache;
