//! Snapshot source backed by JSON files on disk.
//!
//! Reads `<dir>/<category>.json` on every fetch. The payload can be a list
//! of neutral quotes or a raw venue response saved from The Odds API or
//! Kalshi, which makes the binary usable against captured data and keeps
//! network clients out of the core.
//!
//! An optional `<dir>/<category>.quota.json` sidecar carries the provider's
//! remaining budget, as reported in its `x-requests-remaining` header.

pub mod dto;
mod source;

pub use source::{JsonFileSource, SnapshotFormat};
