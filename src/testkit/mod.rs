//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`clock`]: `ManualClock`, a clock tests advance by hand.
//! - [`source`]: `ScriptedSource`, a [`SnapshotSource`](crate::port::outbound::source::SnapshotSource)
//!   with queued results, optional latency and call counting.
//! - [`domain`]: Builders for outcomes, events and raw quotes.
//! - [`config`]: Canonical TOML configurations.

pub mod clock;
pub mod config;
pub mod domain;
pub mod source;
