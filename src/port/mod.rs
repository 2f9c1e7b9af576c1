//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (venue snapshot feeds, clocks, dashboards).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!    Dashboard ─────▶│      Application        │
//!    (MarketView)    │  normalize · cache ·    │
//!                    │  quota · detect         │
//!                    └────────────┬────────────┘
//!                                 │
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │ SnapshotSource  │
//!                        │ adapters        │
//!                        └─────────────────┘
//! ```

pub mod inbound;
pub mod outbound;
