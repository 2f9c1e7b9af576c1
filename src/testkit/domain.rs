//! Builders for domain primitives used across tests.
//!
//! Concise factories for outcomes, events and raw quotes so tests focus on
//! assertions rather than construction boilerplate.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::{Category, Event, EventId, Outcome, RawPrice, RawQuote, Side, VenueId};

/// An ask-side outcome quoted directly as a probability.
pub fn ask(event_id: &str, venue: &str, label: &str, probability: Decimal) -> Outcome {
    outcome(event_id, venue, label, probability, Side::Ask)
}

/// An outcome quoted directly as a probability.
pub fn outcome(event_id: &str, venue: &str, label: &str, probability: Decimal, side: Side) -> Outcome {
    Outcome::try_new(
        VenueId::from(venue),
        EventId::from(event_id),
        label,
        probability,
        RawPrice::Probability(probability),
        side,
    )
    .unwrap_or_else(|e| panic!("invalid test outcome: {e}"))
}

/// An event observed now.
pub fn event(category: &str, event_id: &str, outcomes: Vec<Outcome>) -> Event {
    Event::try_new(
        EventId::from(event_id),
        Category::from(category),
        outcomes,
        Utc::now(),
    )
    .unwrap_or_else(|e| panic!("invalid test event: {e}"))
}

/// Two-venue event whose best asks sum to 0.95.
pub fn arbitrage_event(category: &str, event_id: &str) -> Event {
    event(
        category,
        event_id,
        vec![
            ask(event_id, "venue-x", "Team A", dec!(0.55)),
            ask(event_id, "venue-x", "Team B", dec!(0.50)),
            ask(event_id, "venue-y", "Team A", dec!(0.60)),
            ask(event_id, "venue-y", "Team B", dec!(0.40)),
        ],
    )
}

/// Two-venue event where one venue already has the cheapest book.
pub fn fair_event(category: &str, event_id: &str) -> Event {
    event(
        category,
        event_id,
        vec![
            ask(event_id, "venue-x", "Team A", dec!(0.50)),
            ask(event_id, "venue-x", "Team B", dec!(0.52)),
            ask(event_id, "venue-y", "Team A", dec!(0.55)),
            ask(event_id, "venue-y", "Team B", dec!(0.55)),
        ],
    )
}

/// Single-price sportsbook quote in American odds.
pub fn american(venue: &str, event_id: &str, label: &str, odds: Decimal) -> RawQuote {
    RawQuote::new(venue, event_id, label, RawPrice::American(odds), Side::Single)
}
