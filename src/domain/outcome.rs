//! Normalized outcome quotes.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::id::{EventId, VenueId};
use super::money::Probability;
use super::quote::{RawPrice, Side};

/// One possible resolution of an event as quoted by one venue.
///
/// Outcomes are immutable once produced: the probability is derived during
/// normalization and every field is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    venue: VenueId,
    event_id: EventId,
    label: String,
    probability: Probability,
    raw_price: RawPrice,
    side: Side,
    liquidity: Option<Decimal>,
}

impl Outcome {
    /// Create an outcome, validating the probability lies strictly in (0, 1).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidQuote`] when the probability is out of
    /// range or the label is blank.
    pub fn try_new(
        venue: VenueId,
        event_id: EventId,
        label: impl Into<String>,
        probability: Probability,
        raw_price: RawPrice,
        side: Side,
    ) -> Result<Self, DomainError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(DomainError::invalid_quote("label is empty"));
        }
        if probability <= Decimal::ZERO || probability >= Decimal::ONE {
            return Err(DomainError::invalid_quote(format!(
                "{raw_price} maps to probability {probability}, outside (0, 1)"
            )));
        }

        Ok(Self {
            venue,
            event_id,
            label,
            probability,
            raw_price,
            side,
            liquidity: None,
        })
    }

    /// Attach the liquidity observed behind this quote.
    #[must_use]
    pub fn with_liquidity(mut self, liquidity: Option<Decimal>) -> Self {
        self.liquidity = liquidity;
        self
    }

    /// Venue that quoted this outcome.
    #[must_use]
    pub const fn venue(&self) -> &VenueId {
        &self.venue
    }

    /// Event this outcome resolves.
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Outcome label as quoted.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Grouping key for mutually exclusive labels: trimmed, lowercase.
    #[must_use]
    pub fn label_key(&self) -> String {
        self.label.trim().to_lowercase()
    }

    /// Implied probability.
    #[must_use]
    pub const fn probability(&self) -> Probability {
        self.probability
    }

    /// Price in the venue's own unit.
    #[must_use]
    pub const fn raw_price(&self) -> RawPrice {
        self.raw_price
    }

    /// Market side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Observed liquidity, if the venue reported any.
    #[must_use]
    pub const fn liquidity(&self) -> Option<Decimal> {
        self.liquidity
    }
}
