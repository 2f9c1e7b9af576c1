//! Runtime control projection types for operator-facing adapters.
//!
//! Defines request and response types for the long-running refresh loop.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;

/// Runtime overrides from CLI flags.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Raw TOML configuration content.
    pub config_toml: String,

    /// Override for the scheduler poll interval.
    pub interval_secs: Option<u64>,

    /// Whether to output logs as JSON.
    pub json_logs: bool,
}

/// Startup information shown before the loop starts.
#[derive(Debug, Clone, Serialize)]
pub struct RunStartupSnapshot {
    pub categories: Vec<String>,
    pub poll_interval_secs: u64,
    pub min_edge: Decimal,
}

/// Runtime use-cases.
#[async_trait]
pub trait RuntimeOperator: Send + Sync {
    /// Resolve what `execute_run` will do.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or an override is invalid.
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot>;

    /// Refresh on the scheduler interval until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or an override is invalid.
    async fn execute_run(&self, request: RunRequest) -> Result<()>;
}
