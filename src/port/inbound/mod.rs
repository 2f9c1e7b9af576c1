//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`market`]: read-only view used by dashboards
//! - [`operator`]: use cases behind the CLI

pub mod market;
pub mod operator;
