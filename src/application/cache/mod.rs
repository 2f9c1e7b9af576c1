//! Bounded-freshness snapshot cache.
//!
//! [`FreshnessCache`] keeps the latest snapshot per category and refreshes
//! it on demand:
//!
//! - at most one refresh runs per category; concurrent callers wait for it
//! - a failed refresh leaves the previous snapshot in place and serves it
//!   marked stale
//! - every refresh is bounded by a timeout and can be cancelled
//!
//! Refreshes run on spawned tasks, so a caller that gives up waiting does not
//! abort the refresh for everyone else.

mod freshness;
pub mod snapshot;

pub use freshness::FreshnessCache;
pub use snapshot::{CacheEntry, CacheRead, EntryStatus, Refreshed};
