//! Sharpline - cross-venue odds normalization and arbitrage detection.
//!
//! Quotes for the same real-world event arrive from several venues in
//! different formats (American odds, probabilities, contract cents). This
//! crate normalizes them to implied probabilities, keeps a freshness-aware
//! snapshot per category behind a quota governor, and scans every event for
//! cross-venue arbitrage and single-venue skew.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Plain data: quotes, outcomes, events, opportunities, quotas
//! - [`port`] - Traits at the boundaries (snapshot sources, clock, operator)
//! - [`application`] - Normalization, detection, cache, quota governor, scheduler
//! - [`adapter`] - CLI (inbound) and JSON snapshot files (outbound)
//! - [`infrastructure`] - Configuration, logging and wiring
//!
//! # Example
//!
//! ```
//! use sharpline::application::normalize::implied_probability;
//! use sharpline::domain::RawPrice;
//! use rust_decimal_macros::dec;
//!
//! let p = implied_probability(RawPrice::American(dec!(150))).unwrap();
//! assert_eq!(p, dec!(0.4));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use error::{Error, Result};
