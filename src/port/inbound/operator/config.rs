//! Configuration projection types for operator-facing adapters.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;

/// Effective configuration, defaults and overrides applied.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub log_level: String,
    pub log_format: String,
    pub min_edge: Decimal,
    pub min_value: Decimal,
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub categories: Vec<CategoryView>,
    pub sources: Vec<SourceView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub ttl_secs: u64,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceView {
    pub name: String,
    pub dir: String,
    pub format: String,
    pub cost: u32,
    /// `"<limit>/<window>"`, or `None` when unlimited.
    pub quota: Option<String>,
}

/// Non-fatal findings of `config validate`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigValidationReport {
    pub warnings: Vec<String>,
}

/// Configuration use-cases.
pub trait ConfigurationOperator: Send + Sync {
    /// Parse and project the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn show_config(&self, config_toml: &str) -> Result<ConfigView>;

    /// Validate the configuration and collect warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn validate_config(&self, config_toml: &str) -> Result<ConfigValidationReport>;
}
