//! Refresh timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How refreshes are bounded and how often the scheduler polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Upper bound on one category refresh, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Scheduler poll interval in seconds. Overridden by
    /// `SCRAPE_INTERVAL_SECONDS`.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    300
}

impl RefreshConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}
