//! Operator-facing inbound ports consumed by CLI adapters.
//!
//! Requests carry raw TOML so adapters never depend on the configuration
//! types; responses are plain projections for display.

pub mod config;
pub mod port;
pub mod runtime;
pub mod scan;
