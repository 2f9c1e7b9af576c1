//! Call-budget accounting for rate- and quota-limited sources.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

/// Longest rolling window honoured; longer configurations are clamped.
const MAX_ROLLING_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// How a source's budget window is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaWindow {
    /// Resets at 00:00 UTC on the first day of each month.
    CalendarMonth,
    /// Resets `seconds` after the window opened.
    Rolling {
        /// Window length.
        seconds: u64,
    },
}

impl QuotaWindow {
    /// Start of the window containing `now`.
    #[must_use]
    pub fn start_for(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::CalendarMonth => month_start(now.year(), now.month()).unwrap_or(now),
            Self::Rolling { .. } => now,
        }
    }

    /// End of a window that opened at `start`.
    #[must_use]
    pub fn end_for(self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::CalendarMonth => {
                let (year, month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                month_start(year, month).unwrap_or(start)
            }
            Self::Rolling { seconds } => {
                let secs = seconds.min(MAX_ROLLING_SECS) as i64;
                start + Duration::seconds(secs)
            }
        }
    }
}

impl fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalendarMonth => write!(f, "month"),
            Self::Rolling { seconds } => write!(f, "{seconds}s"),
        }
    }
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single()
}

/// Budget state of one source.
///
/// `pending` holds units reserved by calls that have been admitted but have
/// not completed yet; they count against the limit until committed or
/// released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaState {
    source: String,
    window: QuotaWindow,
    window_start: DateTime<Utc>,
    used: u32,
    pending: u32,
    limit: u32,
}

impl QuotaState {
    /// Open a fresh window at `now`.
    pub fn new(source: impl Into<String>, limit: u32, window: QuotaWindow, now: DateTime<Utc>) -> Self {
        Self {
            source: source.into(),
            window,
            window_start: window.start_for(now),
            used: 0,
            pending: 0,
            limit,
        }
    }

    /// Source name.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Window policy.
    #[must_use]
    pub const fn window(&self) -> QuotaWindow {
        self.window
    }

    /// When the current window opened.
    #[must_use]
    pub const fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// When the current window closes.
    #[must_use]
    pub fn window_end(&self) -> DateTime<Utc> {
        self.window.end_for(self.window_start)
    }

    /// Units consumed in the current window.
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }

    /// Units reserved by in-flight calls.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// Budget per window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Units still available, net of reservations.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.limit
            .saturating_sub(self.used.saturating_add(self.pending))
    }

    /// Start a new window containing `now`. Usage drops to zero; pending
    /// reservations carry over and are charged when their calls complete.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.window_start = self.window.start_for(now);
        self.used = 0;
    }

    /// Reset if `now` has crossed the window boundary. Returns whether a
    /// reset happened.
    pub fn roll(&mut self, now: DateTime<Utc>) -> bool {
        if now >= self.window_end() {
            self.reset(now);
            return true;
        }
        false
    }

    /// Whether `cost` more units fit in the budget.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        u64::from(self.used) + u64::from(self.pending) + u64::from(cost) <= u64::from(self.limit)
    }

    /// Reserve `cost` units if they fit.
    pub fn reserve(&mut self, cost: u32) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.pending = self.pending.saturating_add(cost);
        true
    }

    /// Charge `cost` units, consuming a matching reservation if present.
    pub fn commit(&mut self, cost: u32) {
        self.pending = self.pending.saturating_sub(cost);
        self.used = self.used.saturating_add(cost);
    }

    /// Drop a reservation for a call that was never sent.
    pub fn release(&mut self, cost: u32) {
        self.pending = self.pending.saturating_sub(cost);
    }

    /// Align with the provider's own count of remaining units. Usage only
    /// ever moves up.
    pub fn sync_remaining(&mut self, remaining: u32) {
        let implied_used = self.limit.saturating_sub(remaining);
        self.used = self.used.max(implied_used);
    }
}
