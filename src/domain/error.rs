//! Domain validation errors for core domain types.
//!
//! These errors are returned when a venue quote cannot be turned into a
//! well-formed [`Outcome`](super::outcome::Outcome) or when an
//! [`Event`](super::event::Event) would mix outcomes of different events.
//!
//! # Examples
//!
//! ```
//! use sharpline::application::normalize::normalize;
//! use sharpline::domain::error::DomainError;
//! use sharpline::domain::quote::{RawPrice, RawQuote, Side};
//! use rust_decimal_macros::dec;
//!
//! let quote = RawQuote::new("draftkings", "game-1", "Chiefs", RawPrice::American(dec!(0)), Side::Single);
//! assert!(matches!(normalize(&quote), Err(DomainError::InvalidQuote { .. })));
//! ```

use thiserror::Error;

use super::id::EventId;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A single venue quote is malformed; the quote is dropped.
    #[error("invalid quote: {reason}")]
    InvalidQuote {
        /// Why the quote was rejected.
        reason: String,
    },

    /// An outcome does not belong to the event it was attached to.
    #[error("outcome for event {found} cannot join event {expected}")]
    EventMismatch {
        /// The event being assembled.
        expected: EventId,
        /// The event the outcome was quoted for.
        found: EventId,
    },
}

impl DomainError {
    /// Shorthand for an [`InvalidQuote`](Self::InvalidQuote) error.
    pub fn invalid_quote(reason: impl Into<String>) -> Self {
        Self::InvalidQuote {
            reason: reason.into(),
        }
    }
}
