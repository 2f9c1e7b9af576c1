//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; two environment variables
//! override values from the file:
//!
//! - `ARBITRAGE_MIN_THRESHOLD`: detector minimum edge
//! - `SCRAPE_INTERVAL_SECONDS`: scheduler poll interval
//!
//! # Example
//!
//! ```no_run
//! use sharpline::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{CategoryConfig, SourceConfig};
use super::logging::LoggingConfig;
use super::refresh::RefreshConfig;
use crate::application::detector::DetectorConfig;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `detector.min_edge`.
pub const MIN_EDGE_ENV: &str = "ARBITRAGE_MIN_THRESHOLD";

/// Environment variable overriding `refresh.poll_interval_secs`.
pub const POLL_INTERVAL_ENV: &str = "SCRAPE_INTERVAL_SECONDS";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Detection thresholds.
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Refresh timeout and scheduler interval.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Categories to aggregate.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,

    /// Snapshot sources referenced by categories.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Parse configuration from TOML content, apply environment overrides
    /// and validate.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - An override variable does not parse
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set but does
    /// not parse.
    #[allow(clippy::result_large_err)]
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(MIN_EDGE_ENV) {
            self.detector.min_edge = Decimal::from_str(raw.trim())
                .map_err(|e| invalid(MIN_EDGE_ENV, e.to_string()))?;
        }
        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            self.refresh.poll_interval_secs = raw
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| invalid(POLL_INTERVAL_ENV, e.to_string()))?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are present, values are within
    /// acceptable ranges and every category names known sources.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let detector = &self.detector;
        if detector.min_edge < Decimal::ZERO || detector.min_edge >= Decimal::ONE {
            return Err(invalid("min_edge", "must be in [0, 1)").into());
        }
        if detector.min_value < Decimal::ZERO || detector.min_value >= Decimal::ONE {
            return Err(invalid("min_value", "must be in [0, 1)").into());
        }

        if self.refresh.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than 0").into());
        }
        if self.refresh.poll_interval_secs == 0 {
            return Err(invalid("poll_interval_secs", "must be greater than 0").into());
        }

        let mut source_names = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "sources.name",
                }
                .into());
            }
            if !source_names.insert(source.name.as_str()) {
                return Err(invalid("sources", format!("duplicate source {}", source.name)).into());
            }
            if let Some(quota) = &source.quota {
                if quota.limit == 0 {
                    return Err(invalid("quota.limit", "must be greater than 0").into());
                }
                if quota.window().is_none() {
                    return Err(invalid(
                        "quota.window_secs",
                        format!("rolling window of {} needs window_secs > 0", source.name),
                    )
                    .into());
                }
            }
        }

        if self.categories.is_empty() {
            return Err(ConfigError::MissingField {
                field: "categories",
            }
            .into());
        }
        let mut category_names = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "categories.name",
                }
                .into());
            }
            if !category_names.insert(category.name.as_str()) {
                return Err(
                    invalid("categories", format!("duplicate category {}", category.name)).into(),
                );
            }
            if category.ttl_secs == 0 {
                return Err(invalid("ttl_secs", "must be greater than 0").into());
            }
            if category.sources.is_empty() {
                return Err(invalid(
                    "categories.sources",
                    format!("category {} has no sources", category.name),
                )
                .into());
            }
            if let Some(unknown) = category
                .sources
                .iter()
                .find(|name| !source_names.contains(name.as_str()))
            {
                return Err(invalid(
                    "categories.sources",
                    format!("category {} references unknown source {unknown}", category.name),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Look up a source by name.
    #[must_use]
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
