//! Outbound adapters (driven side).

pub mod file;
