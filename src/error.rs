//! Error types for the crate.
//!
//! Failures in this crate are never fatal to the process. A malformed quote
//! is dropped ([`DomainError`]), and a failed refresh falls back to stale
//! data ([`RefreshError`]). Only configuration problems stop the binary
//! ([`ConfigError`]).

use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Why a category refresh produced no new snapshot.
///
/// Cloneable so one single-flight result can be handed to every waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// Network, auth or parse failure in every source of the category.
    #[error("refresh failed: {reason}")]
    Failed { reason: String },

    /// Every source was skipped because its budget is spent.
    #[error("quota exhausted for {source_name}")]
    QuotaExhausted { source_name: String },

    /// The refresh did not finish within the configured timeout.
    #[error("refresh timed out after {after:?}")]
    Timeout { after: Duration },

    /// The in-flight refresh was aborted.
    #[error("refresh cancelled")]
    Cancelled,

    /// No such category is configured.
    #[error("unknown category: {category}")]
    UnknownCategory { category: String },
}

impl RefreshError {
    /// Quota exhaustion is an expected condition rather than a fault.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("source {name} failed: {reason}")]
    Source { name: String, reason: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
