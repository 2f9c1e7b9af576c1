//! Opportunity type with builder pattern.
//!
//! This module provides the [`Opportunity`] struct representing a detected
//! arbitrage or skew signal, along with [`OpportunityBuilder`] for safe
//! construction. The builder derives the total implied probability, edge,
//! stake split and ROI from the legs, so callers never compute them by hand.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use super::id::{Category, EventId, VenueId};
use super::money::{Probability, Stake};

/// Error returned when building an Opportunity fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityBuildError {
    /// Event ID is required but was not provided.
    MissingEventId,
    /// Category is required but was not provided.
    MissingCategory,
    /// Kind is required but was not provided.
    MissingKind,
    /// At least two legs are needed to cover an event.
    TooFewLegs,
    /// The legs sum to a non-positive probability.
    DegenerateTotal,
    /// An arbitrage was requested but the legs leave no edge.
    NoEdge,
}

impl fmt::Display for OpportunityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEventId => write!(f, "event_id is required"),
            Self::MissingCategory => write!(f, "category is required"),
            Self::MissingKind => write!(f, "kind is required"),
            Self::TooFewLegs => write!(f, "at least two legs are required"),
            Self::DegenerateTotal => write!(f, "total implied probability must be positive"),
            Self::NoEdge => write!(f, "arbitrage requires total implied probability below 1"),
        }
    }
}

impl std::error::Error for OpportunityBuildError {}

/// Classification of a detected signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    /// Buying every outcome at the best prices costs less than the payout.
    CrossVenueArbitrage,
    /// No guaranteed profit, but combining venues beats every single venue.
    /// Advisory only.
    SingleVenueSkew,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrossVenueArbitrage => write!(f, "arbitrage"),
            Self::SingleVenueSkew => write!(f, "skew"),
        }
    }
}

/// One outcome to back, at one venue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityLeg {
    /// Venue offering the price.
    pub venue: VenueId,
    /// Outcome label.
    pub label: String,
    /// Implied probability paid for the outcome.
    pub probability: Probability,
    /// Share of the total stake placed on this leg.
    pub stake_fraction: Decimal,
}

/// A detected opportunity for one event.
///
/// Use [`Opportunity::builder`] to construct instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    event_id: EventId,
    category: Category,
    kind: OpportunityKind,
    total_implied_probability: Probability,
    edge: Decimal,
    legs: Vec<OpportunityLeg>,
    expected_roi: Decimal,
    advantage: Option<Decimal>,
}

impl Opportunity {
    /// Create a new builder for constructing an Opportunity.
    #[must_use]
    pub fn builder() -> OpportunityBuilder {
        OpportunityBuilder::new()
    }

    /// Get the event ID.
    #[must_use]
    pub const fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Get the category.
    #[must_use]
    pub const fn category(&self) -> &Category {
        &self.category
    }

    /// Get the signal kind.
    #[must_use]
    pub const fn kind(&self) -> OpportunityKind {
        self.kind
    }

    /// Whether this is a guaranteed-profit arbitrage.
    #[must_use]
    pub fn is_arbitrage(&self) -> bool {
        self.kind == OpportunityKind::CrossVenueArbitrage
    }

    /// Sum of the leg probabilities.
    #[must_use]
    pub const fn total_implied_probability(&self) -> Probability {
        self.total_implied_probability
    }

    /// `1 - total_implied_probability`, never negative.
    #[must_use]
    pub const fn edge(&self) -> Decimal {
        self.edge
    }

    /// Legs in label order.
    #[must_use]
    pub fn legs(&self) -> &[OpportunityLeg] {
        &self.legs
    }

    /// `edge / total_implied_probability` for arbitrage; zero for skew.
    #[must_use]
    pub const fn expected_roi(&self) -> Decimal {
        self.expected_roi
    }

    /// For skew signals: how much lower the combined total is than the
    /// cheapest single-venue book.
    #[must_use]
    pub const fn advantage(&self) -> Option<Decimal> {
        self.advantage
    }

    /// Split `total_stake` across the legs.
    ///
    /// Every leg pays `total_stake / total_implied_probability` if its
    /// outcome wins, so the payout is identical whichever outcome resolves.
    #[must_use]
    pub fn allocate(&self, total_stake: Stake) -> StakePlan {
        let stakes = self
            .legs
            .iter()
            .map(|leg| LegStake {
                venue: leg.venue.clone(),
                label: leg.label.clone(),
                stake: total_stake * leg.stake_fraction,
            })
            .collect();
        let payout = total_stake / self.total_implied_probability;

        StakePlan {
            stakes,
            total_stake,
            payout,
            profit: payout - total_stake,
        }
    }
}

/// Concrete stakes for an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakePlan {
    /// Stake per leg.
    pub stakes: Vec<LegStake>,
    /// Total amount staked.
    pub total_stake: Stake,
    /// Amount returned whichever outcome wins.
    pub payout: Stake,
    /// `payout - total_stake`; negative for skew signals.
    pub profit: Stake,
}

/// Stake placed on one leg.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegStake {
    /// Venue to place the stake at.
    pub venue: VenueId,
    /// Outcome label.
    pub label: String,
    /// Amount to stake.
    pub stake: Stake,
}

/// A venue price meaningfully better than the cross-venue consensus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueSignal {
    /// Event the signal belongs to.
    pub event_id: EventId,
    /// Outcome label.
    pub label: String,
    /// Venue with the best price.
    pub venue: VenueId,
    /// Best implied probability.
    pub probability: Probability,
    /// Mean of each venue's best probability for the label.
    pub consensus: Probability,
    /// `(consensus - probability) / consensus`.
    pub value: Decimal,
}

/// Builder for constructing `Opportunity` instances.
///
/// # Example
///
/// ```
/// use sharpline::domain::opportunity::{Opportunity, OpportunityKind};
/// use rust_decimal_macros::dec;
///
/// let opportunity = Opportunity::builder()
///     .event_id("E1".into())
///     .category("nfl_odds".into())
///     .kind(OpportunityKind::CrossVenueArbitrage)
///     .leg("venue-x".into(), "Team A", dec!(0.55))
///     .leg("venue-y".into(), "Team B", dec!(0.40))
///     .build()
///     .unwrap();
///
/// assert_eq!(opportunity.edge(), dec!(0.05));
/// ```
#[derive(Debug, Default)]
pub struct OpportunityBuilder {
    event_id: Option<EventId>,
    category: Option<Category>,
    kind: Option<OpportunityKind>,
    legs: Vec<(VenueId, String, Probability)>,
    advantage: Option<Decimal>,
}

impl OpportunityBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event ID.
    #[must_use]
    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Set the category.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the kind.
    #[must_use]
    pub fn kind(mut self, kind: OpportunityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Append a leg.
    #[must_use]
    pub fn leg(mut self, venue: VenueId, label: impl Into<String>, probability: Probability) -> Self {
        self.legs.push((venue, label.into(), probability));
        self
    }

    /// Set the skew advantage over the cheapest single-venue book.
    #[must_use]
    pub fn advantage(mut self, advantage: Decimal) -> Self {
        self.advantage = Some(advantage);
        self
    }

    /// Build the Opportunity, calculating derived fields.
    ///
    /// # Errors
    ///
    /// Returns `OpportunityBuildError` if a required field is missing, fewer
    /// than two legs were given, or an arbitrage has no edge.
    pub fn build(self) -> Result<Opportunity, OpportunityBuildError> {
        let event_id = self.event_id.ok_or(OpportunityBuildError::MissingEventId)?;
        let category = self.category.ok_or(OpportunityBuildError::MissingCategory)?;
        let kind = self.kind.ok_or(OpportunityBuildError::MissingKind)?;
        if self.legs.len() < 2 {
            return Err(OpportunityBuildError::TooFewLegs);
        }

        let total: Probability = self.legs.iter().map(|(_, _, p)| *p).sum();
        if total <= Decimal::ZERO {
            return Err(OpportunityBuildError::DegenerateTotal);
        }
        if kind == OpportunityKind::CrossVenueArbitrage && total >= Decimal::ONE {
            return Err(OpportunityBuildError::NoEdge);
        }

        let edge = (Decimal::ONE - total).max(Decimal::ZERO);
        let expected_roi = match kind {
            OpportunityKind::CrossVenueArbitrage => edge / total,
            OpportunityKind::SingleVenueSkew => Decimal::ZERO,
        };

        // The last leg takes whatever division rounding left over, so the
        // fractions always sum to exactly one.
        let last = self.legs.len() - 1;
        let mut allocated = Decimal::ZERO;
        let legs = self
            .legs
            .into_iter()
            .enumerate()
            .map(|(i, (venue, label, probability))| {
                let stake_fraction = if i == last {
                    Decimal::ONE - allocated
                } else {
                    probability / total
                };
                allocated += stake_fraction;
                OpportunityLeg {
                    venue,
                    label,
                    probability,
                    stake_fraction,
                }
            })
            .collect();

        Ok(Opportunity {
            event_id,
            category,
            kind,
            total_implied_probability: total,
            edge,
            legs,
            expected_roi,
            advantage: self.advantage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn arbitrage() -> Opportunity {
        Opportunity::builder()
            .event_id(EventId::from("E1"))
            .category(Category::from("nfl_odds"))
            .kind(OpportunityKind::CrossVenueArbitrage)
            .leg(VenueId::from("x"), "Team A", dec!(0.55))
            .leg(VenueId::from("y"), "Team B", dec!(0.40))
            .build()
            .unwrap()
    }

    #[test]
    fn builder_creates_opportunity_with_calculated_fields() {
        let opp = arbitrage();

        assert_eq!(opp.total_implied_probability(), dec!(0.95));
        assert_eq!(opp.edge(), dec!(0.05));
        assert_eq!(opp.expected_roi(), dec!(0.05) / dec!(0.95));
        let fractions: Decimal = opp.legs().iter().map(|l| l.stake_fraction).sum();
        assert_eq!(fractions, Decimal::ONE);
        assert!((opp.legs()[0].stake_fraction - dec!(0.5789)).abs() < dec!(0.0001));
        assert!((opp.legs()[1].stake_fraction - dec!(0.4211)).abs() < dec!(0.0001));
    }

    #[test]
    fn allocation_pays_equally_on_every_outcome() {
        let plan = arbitrage().allocate(dec!(1000));

        for (stake, leg) in plan.stakes.iter().zip(arbitrage().legs()) {
            let payout = stake.stake / leg.probability;
            assert!((payout - plan.payout).abs() < dec!(0.000001));
        }
        assert!(plan.profit > Decimal::ZERO);
    }

    #[test]
    fn builder_fails_without_event_id() {
        let result = Opportunity::builder()
            .category(Category::from("nfl"))
            .kind(OpportunityKind::CrossVenueArbitrage)
            .leg(VenueId::from("x"), "A", dec!(0.4))
            .leg(VenueId::from("y"), "B", dec!(0.4))
            .build();

        assert_eq!(result.unwrap_err(), OpportunityBuildError::MissingEventId);
    }

    #[test]
    fn builder_rejects_single_leg() {
        let result = Opportunity::builder()
            .event_id(EventId::from("E1"))
            .category(Category::from("nfl"))
            .kind(OpportunityKind::CrossVenueArbitrage)
            .leg(VenueId::from("x"), "A", dec!(0.4))
            .build();

        assert_eq!(result.unwrap_err(), OpportunityBuildError::TooFewLegs);
    }

    #[test]
    fn arbitrage_requires_edge() {
        let result = Opportunity::builder()
            .event_id(EventId::from("E1"))
            .category(Category::from("nfl"))
            .kind(OpportunityKind::CrossVenueArbitrage)
            .leg(VenueId::from("x"), "A", dec!(0.5))
            .leg(VenueId::from("y"), "B", dec!(0.5))
            .build();

        assert_eq!(result.unwrap_err(), OpportunityBuildError::NoEdge);
    }

    #[test]
    fn skew_has_zero_roi_and_clamped_edge() {
        let opp = Opportunity::builder()
            .event_id(EventId::from("E1"))
            .category(Category::from("nfl"))
            .kind(OpportunityKind::SingleVenueSkew)
            .leg(VenueId::from("x"), "A", dec!(0.52))
            .leg(VenueId::from("y"), "B", dec!(0.50))
            .advantage(dec!(0.03))
            .build()
            .unwrap();

        assert_eq!(opp.edge(), Decimal::ZERO);
        assert_eq!(opp.expected_roi(), Decimal::ZERO);
        assert_eq!(opp.advantage(), Some(dec!(0.03)));
        assert!(opp.allocate(dec!(100)).profit < Decimal::ZERO);
    }
}
