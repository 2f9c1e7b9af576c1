//! Cross-venue arbitrage and mispricing detection.
//!
//! Detection is pure and synchronous: it reads one [`Event`] and returns
//! what it finds without touching shared state.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Event, Opportunity, OpportunityKind, Outcome, Probability, ValueSignal, VenueId,
};

/// Thresholds for the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum edge (`1 - total`) to report an arbitrage.
    #[serde(default = "default_min_edge")]
    pub min_edge: Decimal,

    /// Minimum relative improvement over consensus to report a value signal.
    #[serde(default = "default_min_value")]
    pub min_value: Decimal,
}

fn default_min_edge() -> Decimal {
    Decimal::ZERO
}

fn default_min_value() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_edge: default_min_edge(),
            min_value: default_min_value(),
        }
    }
}

/// Finds arbitrage, skew and value signals in a single event.
#[derive(Debug, Clone, Default)]
pub struct OpportunityDetector {
    config: DetectorConfig,
}

/// Labels of an event in first-seen order, each with its buyable quotes.
struct LabelBook<'a> {
    labels: Vec<(String, Vec<&'a Outcome>)>,
}

impl<'a> LabelBook<'a> {
    /// Returns `None` when any label has no buyable quote.
    fn build(event: &'a Event) -> Option<Self> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut labels: Vec<(String, Vec<&'a Outcome>)> = Vec::new();

        for outcome in event.outcomes() {
            let key = outcome.label_key();
            let slot = *index.entry(key).or_insert_with(|| {
                labels.push((outcome.label().trim().to_string(), Vec::new()));
                labels.len() - 1
            });
            if outcome.side().is_buyable() {
                labels[slot].1.push(outcome);
            }
        }

        if labels.iter().any(|(_, quotes)| quotes.is_empty()) {
            return None;
        }
        Some(Self { labels })
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Cheaper first; on equal price, more liquidity, then venue ascending.
fn compare_quotes(a: &Outcome, b: &Outcome) -> Ordering {
    a.probability()
        .cmp(&b.probability())
        .then_with(|| b.liquidity().cmp(&a.liquidity()))
        .then_with(|| a.venue().cmp(b.venue()))
}

fn best<'a>(quotes: &[&'a Outcome]) -> Option<&'a Outcome> {
    quotes.iter().copied().min_by(|a, b| compare_quotes(a, b))
}

impl OpportunityDetector {
    /// Create a detector with the given thresholds.
    #[must_use]
    pub const fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Detector thresholds.
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Look for an arbitrage, or failing that a skew, in `event`.
    ///
    /// Returns `None` for events with fewer than two outcomes or labels, or
    /// with a label nobody sells.
    #[must_use]
    pub fn detect(&self, event: &Event) -> Option<Opportunity> {
        if event.outcome_count() < 2 {
            return None;
        }
        let book = LabelBook::build(event)?;
        if book.len() < 2 {
            return None;
        }

        let legs: Vec<&Outcome> = book
            .labels
            .iter()
            .map(|(_, quotes)| best(quotes))
            .collect::<Option<_>>()?;
        let total: Probability = legs.iter().map(|o| o.probability()).sum();

        let builder = Opportunity::builder()
            .event_id(event.event_id().clone())
            .category(event.category().clone());
        let builder = book
            .labels
            .iter()
            .zip(&legs)
            .fold(builder, |b, ((label, _), leg)| {
                b.leg(leg.venue().clone(), label.clone(), leg.probability())
            });

        // Sub-threshold arbitrage is dropped, not downgraded to skew.
        if total < Decimal::ONE {
            if total >= Decimal::ONE - self.config.min_edge {
                return None;
            }
            return builder
                .kind(OpportunityKind::CrossVenueArbitrage)
                .build()
                .ok();
        }

        let cheapest_single = cheapest_single_venue(&book)?;
        if cheapest_single < Decimal::ONE || total >= cheapest_single {
            return None;
        }

        builder
            .kind(OpportunityKind::SingleVenueSkew)
            .advantage(cheapest_single - total)
            .build()
            .ok()
    }

    /// Venue prices meaningfully better than the cross-venue consensus.
    ///
    /// For every label quoted by at least two venues, the consensus is the
    /// mean of each venue's best probability. A signal is emitted when the
    /// best price undercuts it by more than `min_value`.
    #[must_use]
    pub fn detect_value(&self, event: &Event) -> Vec<ValueSignal> {
        if event.outcome_count() < 2 {
            return Vec::new();
        }
        let Some(book) = LabelBook::build(event) else {
            return Vec::new();
        };

        let mut signals = Vec::new();
        for (label, quotes) in &book.labels {
            let per_venue = best_per_venue(quotes);
            if per_venue.len() < 2 {
                continue;
            }
            let Some(top) = best(quotes) else { continue };

            let sum: Decimal = per_venue.values().map(|o| o.probability()).sum();
            let consensus = sum / Decimal::from(per_venue.len());
            if consensus.is_zero() {
                continue;
            }
            let value = (consensus - top.probability()) / consensus;
            if value > self.config.min_value {
                signals.push(ValueSignal {
                    event_id: event.event_id().clone(),
                    label: label.clone(),
                    venue: top.venue().clone(),
                    probability: top.probability(),
                    consensus,
                    value,
                });
            }
        }
        signals
    }
}

fn best_per_venue<'a>(quotes: &[&'a Outcome]) -> BTreeMap<&'a VenueId, &'a Outcome> {
    let mut per_venue: BTreeMap<&'a VenueId, &'a Outcome> = BTreeMap::new();
    for &quote in quotes {
        per_venue
            .entry(quote.venue())
            .and_modify(|current| {
                if compare_quotes(quote, current) == Ordering::Less {
                    *current = quote;
                }
            })
            .or_insert(quote);
    }
    per_venue
}

/// Lowest book total among venues quoting every label, if any venue does.
fn cheapest_single_venue(book: &LabelBook<'_>) -> Option<Probability> {
    let mut totals: BTreeMap<&VenueId, (usize, Probability)> = BTreeMap::new();
    for (_, quotes) in &book.labels {
        for (venue, quote) in best_per_venue(quotes) {
            let entry = totals.entry(venue).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += quote.probability();
        }
    }

    totals
        .into_values()
        .filter(|(covered, _)| *covered == book.len())
        .map(|(_, total)| total)
        .min()
}
