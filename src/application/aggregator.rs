//! Multi-venue aggregation service.
//!
//! Wires snapshot sources, the quota governor, the freshness cache and the
//! detector together. Refreshes are quota-gated and fan out to every source
//! of a category concurrently; reads only ever touch the cache.
//!
//! ```text
//! sources ──(quota)──> merge by event ──> FreshnessCache ──> detector ──> caller
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use super::cache::{CacheRead, FreshnessCache, Refreshed};
use super::detector::OpportunityDetector;
use super::quota::QuotaGovernor;
use crate::domain::{Category, Event, EventId, Opportunity, ValueSignal};
use crate::error::RefreshError;
use crate::port::inbound::market::{CategoryStatus, MarketView};
use crate::port::outbound::source::SnapshotSource;

/// How one category is refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: Category,
    /// Maximum snapshot age before a refresh is due.
    pub ttl: Duration,
    /// Names of the sources queried for this category.
    pub sources: Vec<String>,
}

/// Provider-reported budget below which a fetch logs a warning, unless the
/// source sets its own mark.
pub const DEFAULT_QUOTA_WARN_BELOW: u32 = 50;

/// Aggregates venue snapshots per category and serves opportunities.
pub struct Aggregator {
    sources: HashMap<String, Arc<dyn SnapshotSource>>,
    categories: BTreeMap<Category, CategorySpec>,
    context: FetchContext,
    cache: FreshnessCache,
    detector: OpportunityDetector,
}

/// Shared state every refresh task works against.
#[derive(Clone)]
struct FetchContext {
    governor: Arc<QuotaGovernor>,
    /// Last successful batch per category and source, carried into a
    /// refresh that skips the source for quota.
    last_batches: Arc<DashMap<(Category, String), Vec<Event>>>,
    warn_below: Arc<HashMap<String, u32>>,
}

enum SourceOutcome {
    Fetched(String, Vec<Event>),
    Skipped(String),
    Failed(String, String),
}

impl Aggregator {
    /// Create an aggregator with no sources or categories.
    #[must_use]
    pub fn new(
        cache: FreshnessCache,
        governor: Arc<QuotaGovernor>,
        detector: OpportunityDetector,
    ) -> Self {
        Self {
            sources: HashMap::new(),
            categories: BTreeMap::new(),
            context: FetchContext {
                governor,
                last_batches: Arc::new(DashMap::new()),
                warn_below: Arc::new(HashMap::new()),
            },
            cache,
            detector,
        }
    }

    /// Warn when `source` reports fewer than `below` remaining calls.
    #[must_use]
    pub fn with_quota_warning(mut self, source: impl Into<String>, below: u32) -> Self {
        Arc::make_mut(&mut self.context.warn_below).insert(source.into(), below);
        self
    }

    /// Low-water mark applied to `source`.
    #[must_use]
    pub fn quota_warning(&self, source: &str) -> u32 {
        self.context.warn_below_for(source)
    }

    /// Add a source, keyed by its name.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn SnapshotSource>) -> Self {
        self.sources.insert(source.name().to_string(), source);
        self
    }

    /// Add a category served by the named sources.
    #[must_use]
    pub fn with_category(
        mut self,
        category: impl Into<Category>,
        ttl: Duration,
        sources: Vec<String>,
    ) -> Self {
        let category = category.into();
        self.categories.insert(
            category.clone(),
            CategorySpec {
                category,
                ttl,
                sources,
            },
        );
        self
    }

    /// Configured categories, in name order.
    pub fn categories(&self) -> impl Iterator<Item = &CategorySpec> {
        self.categories.values()
    }

    #[must_use]
    pub fn category(&self, category: &Category) -> Option<&CategorySpec> {
        self.categories.get(category)
    }

    #[must_use]
    pub const fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    #[must_use]
    pub fn governor(&self) -> &QuotaGovernor {
        &self.context.governor
    }

    #[must_use]
    pub const fn detector(&self) -> &OpportunityDetector {
        &self.detector
    }

    /// Serve `category`, refreshing it first if its snapshot is due.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::UnknownCategory`] for unconfigured categories,
    /// or the refresh error when there is no snapshot to fall back to.
    pub async fn refresh(&self, category: &Category) -> Result<CacheRead, RefreshError> {
        let spec = self
            .categories
            .get(category)
            .ok_or_else(|| RefreshError::UnknownCategory {
                category: category.to_string(),
            })?;

        let sources: Vec<Arc<dyn SnapshotSource>> = spec
            .sources
            .iter()
            .filter_map(|name| {
                let source = self.sources.get(name).cloned();
                if source.is_none() {
                    warn!(category = %category, source = %name, "Category references unknown source");
                }
                source
            })
            .collect();
        let context = self.context.clone();
        let task_category = category.clone();

        self.cache
            .get_or_refresh(
                category,
                move || context.fetch_category(task_category, sources),
                spec.ttl,
            )
            .await
    }

    /// Refresh every configured category concurrently.
    pub async fn refresh_all(&self) -> BTreeMap<Category, Result<CacheRead, RefreshError>> {
        let refreshes = self.categories.keys().map(|category| async move {
            (category.clone(), self.refresh(category).await)
        });
        join_all(refreshes).await.into_iter().collect()
    }

    /// Opportunities in the cached snapshot of `category`.
    ///
    /// Arbitrage comes before skew, then larger edge first, then event id.
    /// Never triggers a refresh.
    #[must_use]
    pub fn get_opportunities(&self, category: &Category) -> Vec<Opportunity> {
        let Some(entry) = self.cache.peek(category) else {
            return Vec::new();
        };

        let mut opportunities: Vec<Opportunity> = entry
            .snapshot()
            .iter()
            .filter_map(|event| self.detector.detect(event))
            .collect();
        opportunities.sort_by(|a, b| {
            b.is_arbitrage()
                .cmp(&a.is_arbitrage())
                .then_with(|| b.edge().cmp(&a.edge()))
                .then_with(|| a.event_id().cmp(b.event_id()))
        });
        opportunities
    }

    /// Value signals in the cached snapshot of `category`, strongest first.
    #[must_use]
    pub fn get_value_signals(&self, category: &Category) -> Vec<ValueSignal> {
        let Some(entry) = self.cache.peek(category) else {
            return Vec::new();
        };

        let mut signals: Vec<ValueSignal> = entry
            .snapshot()
            .iter()
            .flat_map(|event| self.detector.detect_value(event))
            .collect();
        signals.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        signals
    }

    /// Freshness and budget of every configured category.
    #[must_use]
    pub fn get_status(&self) -> BTreeMap<Category, CategoryStatus> {
        let mut cached = self.cache.statuses();
        self.categories
            .values()
            .map(|spec| {
                let entry = cached.remove(&spec.category).unwrap_or_default();
                let quota_remaining = spec
                    .sources
                    .iter()
                    .filter_map(|name| self.context.governor.remaining(name))
                    .min();
                let status = CategoryStatus {
                    fetched_at: entry.fetched_at,
                    stale: entry.stale || entry.fetched_at.is_none(),
                    refreshing: entry.refreshing,
                    events: entry.events,
                    last_error: entry.last_error,
                    quota_remaining,
                };
                (spec.category.clone(), status)
            })
            .collect()
    }
}

impl MarketView for Aggregator {
    fn get_opportunities(&self, category: &Category) -> Vec<Opportunity> {
        Aggregator::get_opportunities(self, category)
    }

    fn get_status(&self) -> BTreeMap<Category, CategoryStatus> {
        Aggregator::get_status(self)
    }
}

impl FetchContext {
    fn warn_below_for(&self, source: &str) -> u32 {
        self.warn_below
            .get(source)
            .copied()
            .unwrap_or(DEFAULT_QUOTA_WARN_BELOW)
    }

    /// Fetch every source of `category` and merge the results.
    ///
    /// A source skipped for quota contributes its last good batch, and the
    /// snapshot is marked degraded so readers see it as stale.
    async fn fetch_category(
        self,
        category: Category,
        sources: Vec<Arc<dyn SnapshotSource>>,
    ) -> Result<Refreshed, RefreshError> {
        if sources.is_empty() {
            return Err(RefreshError::Failed {
                reason: format!("no sources configured for {category}"),
            });
        }

        let fetches = sources
            .iter()
            .map(|source| self.fetch_source(&category, source.as_ref()));
        let outcomes = join_all(fetches).await;

        let mut batches = Vec::new();
        let mut carried = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                SourceOutcome::Fetched(name, events) => {
                    self.last_batches
                        .insert((category.clone(), name), events.clone());
                    batches.push(events);
                }
                SourceOutcome::Skipped(name) => {
                    if let Some(batch) = self.last_batches.get(&(category.clone(), name.clone())) {
                        carried.push(batch.value().clone());
                    }
                    skipped.push(name);
                }
                SourceOutcome::Failed(name, reason) => {
                    self.last_batches.remove(&(category.clone(), name));
                    failures.push(reason);
                }
            }
        }

        if batches.is_empty() {
            if failures.is_empty() {
                return Err(RefreshError::QuotaExhausted {
                    source_name: skipped.join(", "),
                });
            }
            return Err(RefreshError::Failed {
                reason: failures.join("; "),
            });
        }

        if !failures.is_empty() || !skipped.is_empty() {
            info!(
                category = %category,
                succeeded = batches.len(),
                failed = failures.len(),
                skipped = skipped.len(),
                carried = carried.len(),
                "Partial refresh"
            );
        }
        let degraded = (!skipped.is_empty()).then(|| RefreshError::QuotaExhausted {
            source_name: skipped.join(", "),
        });
        batches.extend(carried);
        Ok(Refreshed {
            events: merge_events(batches),
            degraded,
        })
    }

    async fn fetch_source(&self, category: &Category, source: &dyn SnapshotSource) -> SourceOutcome {
        let name = source.name();
        let cost = source.request_cost(category);
        let Some(permit) = self.governor.acquire(name, cost) else {
            warn!(category = %category, source = %name, cost, "Skipping source, quota exhausted");
            return SourceOutcome::Skipped(name.to_string());
        };

        let result = source.fetch(category).await;
        permit.commit();
        if let Some(remaining) = source.reported_remaining() {
            self.governor.sync_remaining(name, remaining);
            let below = self.warn_below_for(name);
            if remaining < below {
                warn!(source = %name, remaining, below, "Provider budget running low");
            }
        }

        match result {
            Ok(events) => {
                debug!(category = %category, source = %name, events = events.len(), "Source fetched");
                SourceOutcome::Fetched(name.to_string(), events)
            }
            Err(e) => {
                warn!(category = %category, source = %name, error = %e, "Source fetch failed");
                SourceOutcome::Failed(name.to_string(), format!("{name}: {e}"))
            }
        }
    }
}

/// Fold per-source batches into one event list, keyed by event id in
/// first-seen order.
fn merge_events(batches: Vec<Vec<Event>>) -> Vec<Event> {
    let mut merged: Vec<Event> = Vec::new();
    let mut index: HashMap<EventId, usize> = HashMap::new();

    for event in batches.into_iter().flatten() {
        match index.get(event.event_id()) {
            Some(&i) => {
                if let Err(e) = merged[i].merge(event) {
                    warn!(error = %e, "Could not merge event");
                }
            }
            None => {
                index.insert(event.event_id().clone(), merged.len());
                merged.push(event);
            }
        }
    }
    merged
}
