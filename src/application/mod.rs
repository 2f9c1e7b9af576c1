//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the application's use cases.

pub mod aggregator;
pub mod cache;
pub mod detector;
pub mod normalize;
pub mod quota;
pub mod scheduler;
