//! One-shot refresh projection types.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Category, Opportunity, ValueSignal};
use crate::error::Result;
use crate::port::inbound::market::CategoryStatus;

/// One-shot refresh request.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Raw TOML configuration content.
    pub config_toml: String,
    /// Restrict the scan to one category.
    pub category: Option<String>,
}

/// Result of scanning one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryScan {
    pub category: Category,
    pub status: CategoryStatus,
    /// Refresh error, if the refresh failed or fell back to stale data.
    pub error: Option<String>,
    pub opportunities: Vec<Opportunity>,
    pub value_signals: Vec<ValueSignal>,
}

impl CategoryScan {
    /// Number of risk-free opportunities found.
    #[must_use]
    pub fn arbitrage_count(&self) -> usize {
        self.opportunities.iter().filter(|o| o.is_arbitrage()).count()
    }
}

/// Scan use-case.
#[async_trait]
pub trait ScanOperator: Send + Sync {
    /// Refresh every (or one) category once and report what was found.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the requested
    /// category is not configured.
    async fn scan(&self, request: ScanRequest) -> Result<Vec<CategoryScan>>;
}
