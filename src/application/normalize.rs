//! Price normalization: venue-native quotes to implied probabilities.
//!
//! Normalization is pure. A quote either becomes a validated [`Outcome`] or
//! is rejected with [`DomainError::InvalidQuote`]; nothing is guessed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{
    Category, DomainError, Event, EventId, Outcome, Probability, RawPrice, RawQuote,
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Implied probability of a venue-native price.
///
/// # Errors
///
/// Returns [`DomainError::InvalidQuote`] for zero American odds or odds too
/// large to convert. Range checking happens when the [`Outcome`] is built.
pub fn implied_probability(price: RawPrice) -> Result<Probability, DomainError> {
    match price {
        RawPrice::American(odds) if odds.is_zero() => {
            Err(DomainError::invalid_quote("american odds of 0 are undefined"))
        }
        RawPrice::American(odds) if odds > Decimal::ZERO => {
            Ok(HUNDRED / odds.checked_add(HUNDRED).ok_or_else(out_of_range)?)
        }
        RawPrice::American(odds) => {
            let risk = odds.abs();
            Ok(risk / risk.checked_add(HUNDRED).ok_or_else(out_of_range)?)
        }
        RawPrice::Probability(p) => Ok(p),
        RawPrice::Cents(cents) => Ok(cents / HUNDRED),
    }
}

fn out_of_range() -> DomainError {
    DomainError::invalid_quote("american odds out of range")
}

/// Normalize one raw quote.
///
/// # Errors
///
/// Returns [`DomainError::InvalidQuote`] when venue, event id, label or price
/// is missing or blank, or the implied probability is outside (0, 1).
///
/// # Example
///
/// ```
/// use sharpline::application::normalize::normalize;
/// use sharpline::domain::{RawPrice, RawQuote, Side};
/// use rust_decimal_macros::dec;
///
/// let quote = RawQuote::new("fanduel", "game-1", "Chiefs", RawPrice::American(dec!(-200)), Side::Single);
/// let outcome = normalize(&quote).unwrap();
///
/// assert_eq!(outcome.probability().round_dp(4), dec!(0.6667));
/// ```
pub fn normalize(quote: &RawQuote) -> Result<Outcome, DomainError> {
    let venue = quote
        .venue
        .as_ref()
        .filter(|v| !v.as_str().trim().is_empty())
        .ok_or_else(|| DomainError::invalid_quote("missing venue"))?;
    let event_id = quote
        .event_id
        .as_ref()
        .filter(|e| !e.as_str().trim().is_empty())
        .ok_or_else(|| DomainError::invalid_quote("missing event id"))?;
    let label = quote
        .label
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| DomainError::invalid_quote("missing label"))?;
    let price = quote
        .price
        .ok_or_else(|| DomainError::invalid_quote("missing price"))?;

    let probability = implied_probability(price)?;

    Ok(Outcome::try_new(
        venue.clone(),
        event_id.clone(),
        label,
        probability,
        price,
        quote.side,
    )?
    .with_liquidity(quote.liquidity))
}

/// Normalize a batch of quotes and group them into events.
///
/// Invalid quotes are logged and dropped. Events keep the order in which
/// their id was first seen; outcomes keep input order.
pub fn assemble_events(
    category: &Category,
    quotes: &[RawQuote],
    observed_at: DateTime<Utc>,
) -> Vec<Event> {
    let mut order: Vec<EventId> = Vec::new();
    let mut grouped: HashMap<EventId, Vec<Outcome>> = HashMap::new();
    let mut dropped = 0usize;

    for quote in quotes {
        match normalize(quote) {
            Ok(outcome) => {
                let id = outcome.event_id().clone();
                grouped
                    .entry(id.clone())
                    .or_insert_with(|| {
                        order.push(id);
                        Vec::new()
                    })
                    .push(outcome);
            }
            Err(e) => {
                dropped += 1;
                warn!(
                    category = %category,
                    venue = ?quote.venue,
                    event_id = ?quote.event_id,
                    error = %e,
                    "Dropping invalid quote"
                );
            }
        }
    }

    let events: Vec<Event> = order
        .into_iter()
        .filter_map(|id| {
            let outcomes = grouped.remove(&id)?;
            Event::try_new(id, category.clone(), outcomes, observed_at).ok()
        })
        .collect();

    debug!(
        category = %category,
        quotes = quotes.len(),
        events = events.len(),
        dropped,
        "Assembled events"
    );
    events
}
