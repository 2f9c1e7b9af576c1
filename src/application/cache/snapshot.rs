//! Cached category snapshots and what a cache read returns.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, Event};
use crate::error::RefreshError;

/// The latest successful snapshot of one category.
///
/// Entries are shared behind `Arc` and replaced whole on refresh; an entry
/// handed to a reader never changes underneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    category: Category,
    snapshot: Vec<Event>,
    fetched_at: DateTime<Utc>,
    ttl: Duration,
    degraded: Option<RefreshError>,
}

impl CacheEntry {
    /// Create an entry fetched at `fetched_at`.
    #[must_use]
    pub fn new(
        category: Category,
        snapshot: Vec<Event>,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            category,
            snapshot,
            fetched_at,
            ttl,
            degraded: None,
        }
    }

    /// Mark part of the snapshot as carried over from an earlier refresh.
    #[must_use]
    pub fn with_degraded(mut self, degraded: Option<RefreshError>) -> Self {
        self.degraded = degraded;
        self
    }

    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Events of the snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &[Event] {
        &self.snapshot
    }

    /// Completion time of the refresh that produced this entry.
    #[must_use]
    pub const fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// TTL the entry was stored with.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Why part of the snapshot is older than [`fetched_at`](Self::fetched_at).
    #[must_use]
    pub const fn degraded(&self) -> Option<&RefreshError> {
        self.degraded.as_ref()
    }

    /// Whether the entry is at least `ttl` old at `now`.
    ///
    /// An entry from the future (clock moved backwards) counts as fresh.
    #[must_use]
    pub fn is_older_than(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at)
            .to_std()
            .is_ok_and(|age| age >= ttl)
    }

    /// Staleness against the entry's own TTL.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.is_older_than(self.ttl, now)
    }
}

/// What a refresh hands to the cache.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refreshed {
    pub events: Vec<Event>,
    /// Set when some of `events` were carried over instead of fetched.
    pub degraded: Option<RefreshError>,
}

impl From<Vec<Event>> for Refreshed {
    fn from(events: Vec<Event>) -> Self {
        Self {
            events,
            degraded: None,
        }
    }
}

/// Result of [`FreshnessCache::get_or_refresh`](super::FreshnessCache::get_or_refresh).
#[derive(Debug, Clone)]
pub struct CacheRead {
    /// The snapshot served.
    pub entry: Arc<CacheEntry>,
    /// True when the refresh failed, or only partly succeeded, and older
    /// data is being served.
    pub stale: bool,
    /// Why the refresh failed, when `stale` is set.
    pub error: Option<RefreshError>,
}

impl CacheRead {
    /// Serve the current entry, stale if it is degraded.
    pub(crate) fn current(entry: Arc<CacheEntry>) -> Self {
        let error = entry.degraded().cloned();
        Self {
            entry,
            stale: error.is_some(),
            error,
        }
    }

    pub(crate) fn fallback(entry: Arc<CacheEntry>, error: RefreshError) -> Self {
        Self {
            entry,
            stale: true,
            error: Some(error),
        }
    }
}

/// Non-blocking view of one category's cache slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    pub fetched_at: Option<DateTime<Utc>>,
    pub stale: bool,
    pub refreshing: bool,
    pub events: usize,
    pub last_error: Option<String>,
}
