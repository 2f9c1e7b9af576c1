//! Single-flight refresh coordination for [`FreshnessCache`].

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::snapshot::{CacheEntry, CacheRead, EntryStatus, Refreshed};

use crate::domain::Category;
use crate::error::RefreshError;
use crate::port::outbound::clock::{Clock, SystemClock};

/// Result broadcast to everyone waiting on one refresh.
type Settled = Option<Result<Arc<CacheEntry>, RefreshError>>;

struct InFlight {
    id: u64,
    rx: watch::Receiver<Settled>,
    abort: AbortHandle,
}

#[derive(Default)]
struct Slot {
    entry: Option<Arc<CacheEntry>>,
    in_flight: Option<InFlight>,
    last_error: Option<RefreshError>,
}

struct CacheInner {
    clock: Arc<dyn Clock>,
    timeout: Duration,
    slots: Mutex<HashMap<Category, Slot>>,
    next_id: AtomicU64,
}

/// Per-category snapshot cache with single-flight refresh.
///
/// Cloning is cheap and every clone shares the same slots.
#[derive(Clone)]
pub struct FreshnessCache {
    inner: Arc<CacheInner>,
}

impl FreshnessCache {
    /// Create a cache on the system clock.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    /// Create a cache on an injected clock.
    #[must_use]
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                clock,
                timeout,
                slots: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Refresh timeout applied to every refresh.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Serve the snapshot of `category`, refreshing it first if it is
    /// missing or at least `ttl` old.
    ///
    /// `refresh_fn` is called only when this caller starts the refresh; it
    /// is invoked while the cache lock is held and must not touch the cache.
    /// The future it returns runs on its own task. It resolves to the new
    /// events, or to a [`Refreshed`] that marks them as partly carried over.
    ///
    /// # Errors
    ///
    /// Returns the refresh error when the refresh fails and there is no
    /// earlier snapshot to fall back to.
    pub async fn get_or_refresh<F, Fut, T>(
        &self,
        category: &Category,
        refresh_fn: F,
        ttl: Duration,
    ) -> Result<CacheRead, RefreshError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RefreshError>> + Send + 'static,
        T: Into<Refreshed> + Send + 'static,
    {
        let (id, mut rx) = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(category.clone()).or_default();

            if let Some(entry) = &slot.entry {
                if !entry.is_older_than(ttl, self.inner.clock.now()) {
                    return Ok(CacheRead::current(Arc::clone(entry)));
                }
            }

            match &slot.in_flight {
                Some(flight) => {
                    debug!(category = %category, "Joining in-flight refresh");
                    (flight.id, flight.rx.clone())
                }
                None => self.start(category, slot, refresh_fn(), ttl),
            }
        };

        let settled = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        };
        let result = settled.unwrap_or_else(|| {
            self.inner.abandon(category, id);
            Err(RefreshError::Cancelled)
        });

        match result {
            Ok(entry) => Ok(CacheRead::current(entry)),
            Err(error) => match self.peek(category) {
                Some(entry) => Ok(CacheRead::fallback(entry, error)),
                None => Err(error),
            },
        }
    }

    fn start<Fut, T>(
        &self,
        category: &Category,
        slot: &mut Slot,
        refresh: Fut,
        ttl: Duration,
    ) -> (u64, watch::Receiver<Settled>)
    where
        Fut: Future<Output = Result<T, RefreshError>> + Send + 'static,
        T: Into<Refreshed> + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = watch::channel(None);
        let inner = Arc::clone(&self.inner);
        let task_category = category.clone();

        let handle = tokio::spawn(async move {
            let timeout = inner.timeout;
            let result = match tokio::time::timeout(timeout, refresh).await {
                Ok(result) => result.map(Into::into),
                Err(_) => Err(RefreshError::Timeout { after: timeout }),
            };
            let settled = inner.complete(&task_category, id, result, ttl);
            let _ = tx.send(Some(settled));
        });

        debug!(category = %category, refresh_id = id, "Refresh started");
        slot.in_flight = Some(InFlight {
            id,
            rx: rx.clone(),
            abort: handle.abort_handle(),
        });
        (id, rx)
    }

    /// Latest snapshot of `category`, fresh or not. Never blocks on a refresh.
    #[must_use]
    pub fn peek(&self, category: &Category) -> Option<Arc<CacheEntry>> {
        self.inner
            .slots
            .lock()
            .get(category)
            .and_then(|slot| slot.entry.clone())
    }

    /// Whether `category` has no snapshot or one at least `ttl` old.
    #[must_use]
    pub fn is_due(&self, category: &Category, ttl: Duration) -> bool {
        let now = self.inner.clock.now();
        self.peek(category)
            .map_or(true, |entry| entry.is_older_than(ttl, now))
    }

    /// Whether a refresh of `category` is in flight.
    #[must_use]
    pub fn is_refreshing(&self, category: &Category) -> bool {
        self.inner
            .slots
            .lock()
            .get(category)
            .is_some_and(|slot| slot.in_flight.is_some())
    }

    /// Error of the last failed refresh, cleared by the next success.
    #[must_use]
    pub fn last_error(&self, category: &Category) -> Option<RefreshError> {
        self.inner
            .slots
            .lock()
            .get(category)
            .and_then(|slot| slot.last_error.clone())
    }

    /// Abort the in-flight refresh of `category`.
    ///
    /// Every waiter receives [`RefreshError::Cancelled`], or the previous
    /// snapshot marked stale. Returns whether a refresh was running.
    pub fn cancel(&self, category: &Category) -> bool {
        let mut slots = self.inner.slots.lock();
        let Some(slot) = slots.get_mut(category) else {
            return false;
        };
        let Some(flight) = slot.in_flight.take() else {
            return false;
        };
        flight.abort.abort();
        slot.last_error = Some(RefreshError::Cancelled);
        info!(category = %category, refresh_id = flight.id, "Refresh cancelled");
        true
    }

    /// Status of every category the cache has seen.
    #[must_use]
    pub fn statuses(&self) -> BTreeMap<Category, EntryStatus> {
        let now = self.inner.clock.now();
        self.inner
            .slots
            .lock()
            .iter()
            .map(|(category, slot)| (category.clone(), slot.status(now)))
            .collect()
    }
}

impl Slot {
    fn status(&self, now: DateTime<Utc>) -> EntryStatus {
        EntryStatus {
            fetched_at: self.entry.as_ref().map(|e| e.fetched_at()),
            stale: self
                .entry
                .as_ref()
                .map_or(true, |e| e.is_stale(now) || e.degraded().is_some()),
            refreshing: self.in_flight.is_some(),
            events: self.entry.as_ref().map_or(0, |e| e.snapshot().len()),
            last_error: self.last_error.as_ref().map(ToString::to_string),
        }
    }
}

impl CacheInner {
    /// Settle refresh `id`. Only the refresh currently registered for the
    /// category may install its snapshot; a superseded one reports
    /// cancellation.
    fn complete(
        &self,
        category: &Category,
        id: u64,
        result: Result<Refreshed, RefreshError>,
        ttl: Duration,
    ) -> Result<Arc<CacheEntry>, RefreshError> {
        let mut slots = self.slots.lock();
        let slot = slots.entry(category.clone()).or_default();
        if !slot.in_flight.as_ref().is_some_and(|f| f.id == id) {
            debug!(category = %category, refresh_id = id, "Discarding superseded refresh");
            return Err(RefreshError::Cancelled);
        }
        slot.in_flight = None;

        match result {
            Ok(refreshed) => {
                let entry = Arc::new(
                    CacheEntry::new(category.clone(), refreshed.events, self.clock.now(), ttl)
                        .with_degraded(refreshed.degraded),
                );
                info!(
                    category = %category,
                    events = entry.snapshot().len(),
                    degraded = entry.degraded().is_some(),
                    "Snapshot refreshed"
                );
                slot.entry = Some(Arc::clone(&entry));
                slot.last_error = entry.degraded().cloned();
                Ok(entry)
            }
            Err(error) => {
                warn!(
                    category = %category,
                    error = %error,
                    has_snapshot = slot.entry.is_some(),
                    "Refresh failed"
                );
                slot.last_error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Clear a refresh whose task ended without reporting (aborted or panicked).
    fn abandon(&self, category: &Category, id: u64) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(category) {
            if slot.in_flight.as_ref().is_some_and(|f| f.id == id) {
                slot.in_flight = None;
                slot.last_error = Some(RefreshError::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Event;
    use crate::testkit::clock::ManualClock;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> (FreshnessCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        (
            FreshnessCache::with_clock(Duration::from_secs(5), clock.clone()),
            clock,
        )
    }

    fn ok_refresh(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<Result<Vec<Event>, RefreshError>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(Vec::new()))
        }
    }

    #[tokio::test]
    async fn fresh_entry_is_served_without_refresh() {
        let (cache, clock) = cache();
        let category = Category::from("nfl");
        let calls = Arc::new(AtomicUsize::new(0));
        let ttl = Duration::from_secs(60);

        cache.get_or_refresh(&category, ok_refresh(&calls), ttl).await.unwrap();
        clock.advance(chrono::Duration::seconds(59));
        cache.get_or_refresh(&category, ok_refresh(&calls), ttl).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::seconds(1));
        cache.get_or_refresh(&category, ok_refresh(&calls), ttl).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_without_snapshot_is_an_error() {
        let (cache, _) = cache();
        let result = cache
            .get_or_refresh(
                &Category::from("nfl"),
                || async { Err::<Vec<Event>, _>(RefreshError::Failed { reason: "down".into() }) },
                Duration::from_secs(60),
            )
            .await;

        assert_eq!(result.unwrap_err(), RefreshError::Failed { reason: "down".into() });
        assert!(cache.last_error(&Category::from("nfl")).is_some());
    }

    #[tokio::test]
    async fn status_reports_missing_snapshot_as_stale() {
        let (cache, _) = cache();
        let category = Category::from("nfl");
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(cache.is_due(&category, Duration::from_secs(60)));

        cache
            .get_or_refresh(&category, ok_refresh(&calls), Duration::from_secs(60))
            .await
            .unwrap();

        let statuses = cache.statuses();
        let status = &statuses[&category];
        assert!(!status.stale);
        assert!(!status.refreshing);
        assert!(status.fetched_at.is_some());
        assert!(!cache.is_due(&category, Duration::from_secs(60)));
    }
}
