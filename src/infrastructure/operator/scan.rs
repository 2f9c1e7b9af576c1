//! One-shot scan operator implementation.

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::info;

use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::scan::{CategoryScan, ScanOperator, ScanRequest};

use super::entry::Operator;
use super::shared;

#[async_trait]
impl ScanOperator for Operator {
    async fn scan(&self, request: ScanRequest) -> Result<Vec<CategoryScan>> {
        let config = Config::parse_toml(&request.config_toml)?;
        config.init_logging();

        let targets = shared::target_categories(&config, request.category.as_deref())?;
        let aggregator = bootstrap::build_aggregator(&config);

        let reads = join_all(targets.iter().map(|category| aggregator.refresh(category))).await;
        let mut statuses = aggregator.get_status();

        let scans: Vec<CategoryScan> = targets
            .into_iter()
            .zip(reads)
            .map(|(category, read)| {
                let error = match read {
                    Ok(read) => read.error.map(|e| e.to_string()),
                    Err(e) => Some(e.to_string()),
                };
                CategoryScan {
                    status: statuses.remove(&category).unwrap_or_default(),
                    error,
                    opportunities: aggregator.get_opportunities(&category),
                    value_signals: aggregator.get_value_signals(&category),
                    category,
                }
            })
            .collect();

        info!(
            categories = scans.len(),
            arbitrage = scans.iter().map(CategoryScan::arbitrage_count).sum::<usize>(),
            "Scan complete"
        );
        Ok(scans)
    }
}
