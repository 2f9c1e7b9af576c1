//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe what the core needs from the outside world:
//! venue snapshots and the current time.

pub mod clock;
pub mod source;
