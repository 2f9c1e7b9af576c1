//! Category and source tables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::outbound::file::SnapshotFormat;
use crate::application::aggregator::DEFAULT_QUOTA_WARN_BELOW;
use crate::domain::QuotaWindow;

/// One `[[categories]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    /// Snapshot TTL in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Names of the `[[sources]]` queried for this category.
    pub sources: Vec<String>,
}

fn default_ttl_secs() -> u64 {
    300
}

impl CategoryConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// One `[[sources]]` entry: a directory of snapshot files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// Directory holding `<category>.json` snapshots.
    pub dir: PathBuf,
    #[serde(default)]
    pub format: SnapshotFormat,
    /// Quota units charged per fetch.
    #[serde(default = "default_cost")]
    pub cost: u32,
    /// Call budget. Unlimited when absent.
    #[serde(default)]
    pub quota: Option<QuotaConfig>,
}

fn default_cost() -> u32 {
    1
}

/// Window a quota resets on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Calendar month, UTC.
    #[default]
    Month,
    /// Fixed-length window of `window_secs`.
    Rolling,
}

/// `[sources.quota]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Units allowed per window.
    pub limit: u32,
    #[serde(default)]
    pub window: WindowKind,
    /// Rolling window length; required for `rolling`.
    #[serde(default)]
    pub window_secs: Option<u64>,
    /// Warn when the provider reports fewer remaining calls than this.
    #[serde(default = "default_warn_below")]
    pub warn_below: u32,
}

fn default_warn_below() -> u32 {
    DEFAULT_QUOTA_WARN_BELOW
}

impl QuotaConfig {
    /// Window policy, or `None` for a rolling window without a length.
    #[must_use]
    pub fn window(&self) -> Option<QuotaWindow> {
        match self.window {
            WindowKind::Month => Some(QuotaWindow::CalendarMonth),
            WindowKind::Rolling => self
                .window_secs
                .filter(|secs| *secs > 0)
                .map(|seconds| QuotaWindow::Rolling { seconds }),
        }
    }
}
