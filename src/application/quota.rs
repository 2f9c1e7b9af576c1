//! Per-source call budgets.
//!
//! [`QuotaGovernor`] owns one [`QuotaState`] per registered source, each
//! behind its own mutex, so accounting for one source never contends with
//! another. Sources that were never registered are unlimited.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{QuotaState, QuotaWindow};
use crate::port::outbound::clock::{Clock, SystemClock};

type SharedState = Arc<Mutex<QuotaState>>;

/// Tracks and enforces call budgets for every limited source.
pub struct QuotaGovernor {
    states: DashMap<String, SharedState>,
    clock: Arc<dyn Clock>,
}

impl QuotaGovernor {
    /// Create a governor on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a governor on an injected clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            states: DashMap::new(),
            clock,
        }
    }

    /// Put `source` under a budget of `limit` units per `window`.
    ///
    /// Re-registering replaces the previous state.
    pub fn register(&self, source: impl Into<String>, limit: u32, window: QuotaWindow) {
        let source = source.into();
        let state = QuotaState::new(source.clone(), limit, window, self.clock.now());
        info!(source = %source, limit, window = %window, "Quota registered");
        self.states.insert(source, Arc::new(Mutex::new(state)));
    }

    fn state_handle(&self, source: &str) -> Option<SharedState> {
        self.states.get(source).map(|entry| Arc::clone(entry.value()))
    }

    /// Reserve `cost` units for a call about to be made.
    ///
    /// Returns false when the budget cannot cover the call. A true result
    /// holds the units as pending until [`record_usage`](Self::record_usage)
    /// or [`release`](Self::release).
    pub fn try_acquire(&self, source: &str, cost: u32) -> bool {
        let Some(handle) = self.state_handle(source) else {
            return true;
        };
        let mut state = handle.lock();
        if state.roll(self.clock.now()) {
            info!(source = %source, window_start = %state.window_start(), "Quota window reset");
        }
        let granted = state.reserve(cost);
        if !granted {
            warn!(
                source = %source,
                cost,
                used = state.used(),
                pending = state.pending(),
                limit = state.limit(),
                "Quota exhausted"
            );
        }
        granted
    }

    /// Charge `cost` units for a completed call, successful or not.
    pub fn record_usage(&self, source: &str, cost: u32) {
        if let Some(handle) = self.state_handle(source) {
            let mut state = handle.lock();
            state.commit(cost);
            debug!(source = %source, cost, used = state.used(), "Quota usage recorded");
        }
    }

    /// Return a reservation for a call that was never sent.
    pub fn release(&self, source: &str, cost: u32) {
        if let Some(handle) = self.state_handle(source) {
            handle.lock().release(cost);
        }
    }

    /// Reserve `cost` units and hand back a permit that settles them.
    ///
    /// Returns `None` when the budget cannot cover the call.
    #[must_use]
    pub fn acquire(&self, source: &str, cost: u32) -> Option<QuotaPermit> {
        if !self.try_acquire(source, cost) {
            return None;
        }
        Some(QuotaPermit {
            state: self.state_handle(source),
            cost,
            settled: false,
        })
    }

    /// Reconcile with the provider's reported remaining budget.
    pub fn sync_remaining(&self, source: &str, remaining: u32) {
        if let Some(handle) = self.state_handle(source) {
            let mut state = handle.lock();
            let before = state.used();
            state.sync_remaining(remaining);
            if state.used() != before {
                info!(
                    source = %source,
                    reported_remaining = remaining,
                    used = state.used(),
                    "Quota synced with provider"
                );
            }
        }
    }

    /// Units left in the current window, or `None` for unlimited sources.
    #[must_use]
    pub fn remaining(&self, source: &str) -> Option<u32> {
        let handle = self.state_handle(source)?;
        let mut state = handle.lock();
        state.roll(self.clock.now());
        Some(state.remaining())
    }

    /// Snapshot of a source's budget state.
    #[must_use]
    pub fn state(&self, source: &str) -> Option<QuotaState> {
        let handle = self.state_handle(source)?;
        let mut state = handle.lock();
        state.roll(self.clock.now());
        Some(state.clone())
    }

    /// Whether `source` is under a budget.
    #[must_use]
    pub fn is_limited(&self, source: &str) -> bool {
        self.states.contains_key(source)
    }
}

impl Default for QuotaGovernor {
    fn default() -> Self {
        Self::new()
    }
}

/// Reserved budget for one call.
///
/// Dropping the permit charges the reservation, so a call that was sent but
/// timed out or was cancelled still counts. Call [`cancel`](Self::cancel)
/// only when the request never left the process.
#[derive(Debug)]
pub struct QuotaPermit {
    state: Option<SharedState>,
    cost: u32,
    settled: bool,
}

impl QuotaPermit {
    /// Units held by this permit.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Charge the reservation.
    pub fn commit(mut self) {
        self.settle(true);
    }

    /// Refund the reservation.
    pub fn cancel(mut self) {
        self.settle(false);
    }

    fn settle(&mut self, charge: bool) {
        if self.settled {
            return;
        }
        self.settled = true;
        if let Some(state) = &self.state {
            let mut state = state.lock();
            if charge {
                state.commit(self.cost);
            } else {
                state.release(self.cost);
            }
        }
    }
}

impl Drop for QuotaPermit {
    fn drop(&mut self) {
        self.settle(true);
    }
}
