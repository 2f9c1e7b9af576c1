//! Market view port for dashboard-style consumers.
//!
//! Both operations are cache reads: they never trigger a network call and
//! never block on a refresh.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Category, Opportunity};

/// Freshness and budget of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStatus {
    /// Completion time of the last successful refresh.
    pub fetched_at: Option<DateTime<Utc>>,
    /// True when there is no snapshot or it is older than its TTL.
    pub stale: bool,
    /// True while a refresh is in flight.
    pub refreshing: bool,
    /// Events in the current snapshot.
    pub events: usize,
    /// Message of the last failed refresh, cleared on success.
    pub last_error: Option<String>,
    /// Smallest remaining budget across the category's limited sources.
    pub quota_remaining: Option<u32>,
}

/// Read operations exposed to dashboards and other drivers.
pub trait MarketView: Send + Sync {
    /// Opportunities in the cached snapshot of `category`.
    fn get_opportunities(&self, category: &Category) -> Vec<Opportunity>;

    /// Status of every configured category.
    fn get_status(&self) -> BTreeMap<Category, CategoryStatus>;
}
