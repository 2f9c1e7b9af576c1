//! A hand-driven clock.

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;

use crate::port::outbound::clock::Clock;

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    /// Starts at 2024-01-01 00:00 UTC.
    fn default() -> Self {
        Self::new(Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
