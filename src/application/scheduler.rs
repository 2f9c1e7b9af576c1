//! Periodic refresh driver.
//!
//! The cache never refreshes on its own. [`RefreshScheduler`] polls it on a
//! fixed interval and refreshes every category whose snapshot is due and
//! not already being refreshed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::aggregator::Aggregator;
use crate::domain::Category;

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Categories that now hold a fresh snapshot.
    pub refreshed: Vec<Category>,
    /// Categories whose refresh failed but still serve an older snapshot.
    pub stale: Vec<Category>,
    /// Categories whose refresh failed with nothing to fall back to.
    pub failed: Vec<(Category, String)>,
    /// Opportunities across all categories after the tick.
    pub opportunities: usize,
}

impl CycleReport {
    /// Whether the tick attempted no refresh at all.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.refreshed.is_empty() && self.stale.is_empty() && self.failed.is_empty()
    }
}

/// Issues refreshes for due categories on a fixed interval.
pub struct RefreshScheduler {
    aggregator: Arc<Aggregator>,
    interval: Duration,
    reports: Option<mpsc::Sender<CycleReport>>,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>, interval: Duration) -> Self {
        Self {
            aggregator,
            interval,
            reports: None,
        }
    }

    /// Send every report of [`run`](Self::run) to `tx`.
    #[must_use]
    pub fn with_reports(mut self, tx: mpsc::Sender<CycleReport>) -> Self {
        self.reports = Some(tx);
        self
    }

    /// Refresh every due, idle category once.
    pub async fn tick(&self) -> CycleReport {
        let cache = self.aggregator.cache();
        let due: Vec<Category> = self
            .aggregator
            .categories()
            .filter(|spec| cache.is_due(&spec.category, spec.ttl))
            .filter(|spec| !cache.is_refreshing(&spec.category))
            .map(|spec| spec.category.clone())
            .collect();
        debug!(due = due.len(), "Scheduler tick");

        let results = join_all(due.iter().map(|category| async move {
            (category.clone(), self.aggregator.refresh(category).await)
        }))
        .await;

        let mut report = CycleReport::default();
        for (category, result) in results {
            match result {
                Ok(read) if read.stale => {
                    if let Some(error) = &read.error {
                        warn!(category = %category, error = %error, "Serving stale snapshot");
                    }
                    report.stale.push(category);
                }
                Ok(_) => report.refreshed.push(category),
                Err(e) => {
                    warn!(category = %category, error = %e, "No snapshot available");
                    report.failed.push((category, e.to_string()));
                }
            }
        }

        report.opportunities = self
            .aggregator
            .categories()
            .map(|spec| self.aggregator.get_opportunities(&spec.category).len())
            .sum();
        report
    }

    /// Tick until `shutdown` turns true or its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "Refresh scheduler started");

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    let report = self.tick().await;
                    if !report.is_idle() {
                        info!(
                            refreshed = report.refreshed.len(),
                            stale = report.stale.len(),
                            failed = report.failed.len(),
                            opportunities = report.opportunities,
                            "Refresh cycle complete"
                        );
                    }
                    if let Some(tx) = &self.reports {
                        if let Err(e) = tx.try_send(report) {
                            debug!(error = %e, "Dropping cycle report");
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cache::FreshnessCache;
    use crate::application::detector::OpportunityDetector;
    use crate::application::quota::QuotaGovernor;
    use crate::testkit::domain::arbitrage_event;
    use crate::testkit::source::ScriptedSource;

    fn scheduler(source: ScriptedSource) -> RefreshScheduler {
        let aggregator = Aggregator::new(
            FreshnessCache::new(Duration::from_secs(5)),
            Arc::new(QuotaGovernor::new()),
            OpportunityDetector::default(),
        )
        .with_source(Arc::new(source))
        .with_category("nfl", Duration::from_secs(300), vec!["feed".into()]);
        RefreshScheduler::new(Arc::new(aggregator), Duration::from_millis(10))
    }

    #[tokio::test]
    async fn tick_refreshes_only_due_categories() {
        let source = ScriptedSource::new("feed").with_events(vec![arbitrage_event("nfl", "E1")]);
        let calls = source.calls();
        let scheduler = scheduler(source);

        let first = scheduler.tick().await;
        let second = scheduler.tick().await;

        assert_eq!(first.refreshed, vec![Category::from("nfl")]);
        assert_eq!(first.opportunities, 1);
        assert!(second.is_idle());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tick_reports_failures_without_snapshot() {
        let scheduler = scheduler(ScriptedSource::new("feed").then_fail("offline"));

        let report = scheduler.tick().await;

        assert_eq!(report.failed.len(), 1);
        assert!(report.failed[0].1.contains("offline"));
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let (report_tx, mut report_rx) = mpsc::channel(4);
        let scheduler = scheduler(ScriptedSource::new("feed")).with_reports(report_tx);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });
        let report = report_rx.recv().await.unwrap();
        assert_eq!(report.refreshed, vec![Category::from("nfl")]);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
