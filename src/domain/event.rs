//! Events: mutually exclusive outcomes of one real-world occurrence.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::DomainError;
use super::id::{Category, EventId};
use super::outcome::Outcome;

/// A real-world occurrence together with every venue quote for it.
///
/// All outcomes share the event's id and represent mutually exclusive
/// resolutions ("Team A wins" / "Team B wins", or "Yes" / "No").
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    event_id: EventId,
    category: Category,
    outcomes: Vec<Outcome>,
    observed_at: DateTime<Utc>,
}

impl Event {
    /// Create an event, checking every outcome belongs to it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EventMismatch`] for the first foreign outcome.
    pub fn try_new(
        event_id: EventId,
        category: Category,
        outcomes: Vec<Outcome>,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if let Some(foreign) = outcomes.iter().find(|o| o.event_id() != &event_id) {
            return Err(DomainError::EventMismatch {
                expected: event_id,
                found: foreign.event_id().clone(),
            });
        }

        Ok(Self {
            event_id,
            category,
            outcomes,
            observed_at,
        })
    }

    /// Fold another view of the same event (typically from another venue)
    /// into this one. Outcomes are appended in order; the observation time
    /// becomes the later of the two.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EventMismatch`] if `other` is a different event.
    pub fn merge(&mut self, other: Self) -> Result<(), DomainError> {
        if other.event_id != self.event_id {
            return Err(DomainError::EventMismatch {
                expected: self.event_id.clone(),
                found: other.event_id,
            });
        }
        self.outcomes.extend(other.outcomes);
        self.observed_at = self.observed_at.max(other.observed_at);
        Ok(())
    }

    /// Event identifier.
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Category the event was fetched under.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// All outcome quotes, in arrival order.
    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    /// When the quotes were observed.
    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Number of outcome quotes.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::VenueId;
    use crate::domain::quote::{RawPrice, Side};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn outcome(event: &str, venue: &str, label: &str) -> Outcome {
        Outcome::try_new(
            VenueId::from(venue),
            EventId::from(event),
            label,
            dec!(0.5),
            RawPrice::Probability(dec!(0.5)),
            Side::Ask,
        )
        .unwrap()
    }

    #[test]
    fn rejects_foreign_outcomes() {
        let result = Event::try_new(
            EventId::from("E1"),
            Category::from("nfl"),
            vec![outcome("E1", "x", "A"), outcome("E2", "x", "B")],
            Utc::now(),
        );

        assert_eq!(
            result.unwrap_err(),
            DomainError::EventMismatch {
                expected: EventId::from("E1"),
                found: EventId::from("E2"),
            }
        );
    }

    #[test]
    fn merge_appends_outcomes_and_keeps_latest_time() {
        let early = Utc::now();
        let late = early + Duration::seconds(30);
        let mut event = Event::try_new(
            EventId::from("E1"),
            Category::from("nfl"),
            vec![outcome("E1", "x", "A")],
            early,
        )
        .unwrap();
        let other = Event::try_new(
            EventId::from("E1"),
            Category::from("nfl"),
            vec![outcome("E1", "y", "B")],
            late,
        )
        .unwrap();

        event.merge(other).unwrap();

        assert_eq!(event.outcome_count(), 2);
        assert_eq!(event.observed_at(), late);
    }

    #[test]
    fn merge_refuses_other_events() {
        let mut event =
            Event::try_new(EventId::from("E1"), Category::from("nfl"), vec![], Utc::now())
                .unwrap();
        let other =
            Event::try_new(EventId::from("E2"), Category::from("nfl"), vec![], Utc::now())
                .unwrap();

        assert!(event.merge(other).is_err());
    }
}
