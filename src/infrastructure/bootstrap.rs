//! Composition root: builds the aggregator from configuration.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::file::JsonFileSource;
use crate::application::aggregator::Aggregator;
use crate::application::cache::FreshnessCache;
use crate::application::detector::OpportunityDetector;
use crate::application::quota::QuotaGovernor;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::clock::{Clock, SystemClock};

/// Build an aggregator on the system clock.
#[must_use]
pub fn build_aggregator(config: &Config) -> Aggregator {
    build_aggregator_with_clock(config, Arc::new(SystemClock))
}

/// Build an aggregator whose cache, quotas and sources share `clock`.
#[must_use]
pub fn build_aggregator_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Aggregator {
    let governor = Arc::new(QuotaGovernor::with_clock(Arc::clone(&clock)));
    for source in &config.sources {
        let Some(quota) = &source.quota else { continue };
        if let Some(window) = quota.window() {
            governor.register(source.name.as_str(), quota.limit, window);
        }
    }

    let cache = FreshnessCache::with_clock(config.refresh.timeout(), Arc::clone(&clock));
    let detector = OpportunityDetector::new(config.detector.clone());

    let mut aggregator = Aggregator::new(cache, governor, detector);
    for source in &config.sources {
        let adapter = JsonFileSource::new(source.name.as_str(), source.dir.clone(), source.format)
            .with_cost(source.cost)
            .with_clock(Arc::clone(&clock));
        aggregator = aggregator.with_source(Arc::new(adapter));
        if let Some(quota) = &source.quota {
            aggregator = aggregator.with_quota_warning(source.name.as_str(), quota.warn_below);
        }
    }
    for category in &config.categories {
        aggregator =
            aggregator.with_category(category.name.as_str(), category.ttl(), category.sources.clone());
    }

    info!(
        categories = config.categories.len(),
        sources = config.sources.len(),
        min_edge = %config.detector.min_edge,
        "Aggregator ready"
    );
    aggregator
}
