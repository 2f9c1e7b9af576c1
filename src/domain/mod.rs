//! Venue-agnostic domain types.
//!
//! Everything here is plain data with validating constructors. Nothing in
//! this layer performs I/O or holds shared state.

pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod opportunity;
pub mod outcome;
pub mod quota;
pub mod quote;

pub use error::DomainError;
pub use event::Event;
pub use id::{Category, EventId, VenueId};
pub use money::{Probability, Stake};
pub use opportunity::{
    LegStake, Opportunity, OpportunityBuildError, OpportunityBuilder, OpportunityKind,
    OpportunityLeg, StakePlan, ValueSignal,
};
pub use outcome::Outcome;
pub use quota::{QuotaState, QuotaWindow};
pub use quote::{RawPrice, RawQuote, Side};
