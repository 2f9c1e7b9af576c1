//! Venue-native price quotes before normalization.
//!
//! Venue payloads are loosely structured, so every identifying field of a
//! [`RawQuote`] is optional. Normalization fails closed on anything missing
//! instead of carrying partial data forward.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{EventId, VenueId};

/// Which side of the market a quote prices.
///
/// Arbitrage buys at the ask; a bid is what the venue pays to take the
/// outcome back. Sportsbook lines have a single price and use `Single`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Price to sell the outcome.
    Bid,
    /// Price to acquire the outcome.
    Ask,
    /// Sportsbook line: one price to back the outcome.
    #[default]
    Single,
}

impl Side {
    /// Whether a detector can buy the outcome at this quote.
    #[must_use]
    pub const fn is_buyable(self) -> bool {
        matches!(self, Self::Ask | Self::Single)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
            Self::Single => write!(f, "single"),
        }
    }
}

/// A price in the unit the venue quoted it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPrice {
    /// Moneyline odds such as `-110` or `+150`.
    American(Decimal),
    /// A probability in `[0, 1]`, as quoted by exchange-style venues.
    Probability(Decimal),
    /// A contract price in cents (`1..=99`), as quoted by Kalshi.
    Cents(Decimal),
}

impl fmt::Display for RawPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::American(odds) if odds.is_sign_positive() => write!(f, "+{odds}"),
            Self::American(odds) => write!(f, "{odds}"),
            Self::Probability(p) => write!(f, "{p}"),
            Self::Cents(c) => write!(f, "{c}c"),
        }
    }
}

/// One venue quote for one outcome, exactly as parsed from a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    /// Venue that published the quote.
    #[serde(default)]
    pub venue: Option<VenueId>,
    /// Event the quote belongs to.
    #[serde(default)]
    pub event_id: Option<EventId>,
    /// Outcome label, e.g. a team name or `Yes`.
    #[serde(default)]
    pub label: Option<String>,
    /// Quoted price.
    #[serde(default)]
    pub price: Option<RawPrice>,
    /// Market side the price applies to.
    #[serde(default)]
    pub side: Side,
    /// Observed liquidity behind the quote, when the venue reports it.
    #[serde(default)]
    pub liquidity: Option<Decimal>,
}

impl RawQuote {
    /// Create a fully populated quote.
    pub fn new(
        venue: impl Into<VenueId>,
        event_id: impl Into<EventId>,
        label: impl Into<String>,
        price: RawPrice,
        side: Side,
    ) -> Self {
        Self {
            venue: Some(venue.into()),
            event_id: Some(event_id.into()),
            label: Some(label.into()),
            price: Some(price),
            side,
            liquidity: None,
        }
    }

    /// Attach a liquidity figure.
    #[must_use]
    pub fn with_liquidity(mut self, liquidity: Decimal) -> Self {
        self.liquidity = Some(liquidity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_neutral_quote_with_defaults() {
        let json = r#"{"venue":"kalshi","event_id":"E1","label":"Yes","price":{"cents":42}}"#;
        let quote: RawQuote = serde_json::from_str(json).unwrap();

        assert_eq!(quote.side, Side::Single);
        assert_eq!(quote.price, Some(RawPrice::Cents(dec!(42))));
        assert!(quote.liquidity.is_none());
    }

    #[test]
    fn missing_fields_parse_as_none() {
        let quote: RawQuote = serde_json::from_str(r#"{"side":"ask"}"#).unwrap();

        assert!(quote.venue.is_none());
        assert!(quote.price.is_none());
        assert_eq!(quote.side, Side::Ask);
    }

    #[test]
    fn american_odds_display_with_sign() {
        assert_eq!(RawPrice::American(dec!(150)).to_string(), "+150");
        assert_eq!(RawPrice::American(dec!(-200)).to_string(), "-200");
    }

    #[test]
    fn only_ask_and_single_are_buyable() {
        assert!(Side::Ask.is_buyable());
        assert!(Side::Single.is_buyable());
        assert!(!Side::Bid.is_buyable());
    }
}
