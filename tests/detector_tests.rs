//! Detection over normalized sportsbook and exchange quotes.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use sharpline::application::detector::{DetectorConfig, OpportunityDetector};
use sharpline::application::normalize::{assemble_events, implied_probability};
use sharpline::domain::{Category, Event, OpportunityKind, RawPrice, RawQuote, Side, VenueId};
use sharpline::testkit::domain::{american, ask, event};

fn nfl() -> Category {
    Category::from("nfl_odds")
}

fn single_event(quotes: &[RawQuote]) -> Event {
    let mut events = assemble_events(&nfl(), quotes, Utc::now());
    assert_eq!(events.len(), 1, "expected one event");
    events.remove(0)
}

fn prob(odds: Decimal) -> Decimal {
    implied_probability(RawPrice::American(odds)).unwrap()
}

#[test]
fn american_odds_arbitrage_across_two_books() {
    let event = single_event(&[
        american("book-a", "G1", "Chiefs", dec!(110)),
        american("book-a", "G1", "Bills", dec!(-130)),
        american("book-b", "G1", "Chiefs", dec!(-125)),
        american("book-b", "G1", "Bills", dec!(115)),
    ]);

    let opportunity = OpportunityDetector::default().detect(&event).unwrap();

    assert_eq!(opportunity.kind(), OpportunityKind::CrossVenueArbitrage);
    let expected_total = prob(dec!(110)) + prob(dec!(115));
    assert_eq!(opportunity.total_implied_probability(), expected_total);
    assert_eq!(opportunity.edge(), Decimal::ONE - expected_total);
    assert_eq!(opportunity.expected_roi(), opportunity.edge() / expected_total);

    let legs = opportunity.legs();
    assert_eq!(legs.len(), 2);
    assert_eq!((legs[0].label.as_str(), &legs[0].venue), ("Chiefs", &VenueId::from("book-a")));
    assert_eq!((legs[1].label.as_str(), &legs[1].venue), ("Bills", &VenueId::from("book-b")));
}

#[test]
fn stake_plan_pays_the_same_whichever_outcome_wins() {
    let event = single_event(&[
        american("book-a", "G1", "Chiefs", dec!(110)),
        american("book-b", "G1", "Bills", dec!(115)),
    ]);
    let opportunity = OpportunityDetector::default().detect(&event).unwrap();

    let plan = opportunity.allocate(dec!(100));

    let staked: Decimal = plan.stakes.iter().map(|s| s.stake).sum();
    assert!((staked - dec!(100)).abs() < dec!(0.000001));
    for (stake, leg) in plan.stakes.iter().zip(opportunity.legs()) {
        let payout = stake.stake / leg.probability;
        assert!((payout - plan.payout).abs() < dec!(0.0001), "{payout} vs {}", plan.payout);
    }
    assert!(plan.profit > Decimal::ZERO);
}

#[test]
fn fractions_sum_to_one_for_three_way_markets() {
    let event = event(
        "soccer",
        "M1",
        vec![
            ask("M1", "x", "Home", dec!(0.31)),
            ask("M1", "y", "Draw", dec!(0.29)),
            ask("M1", "z", "Away", dec!(0.33)),
        ],
    );

    let opportunity = OpportunityDetector::default().detect(&event).unwrap();

    let fractions: Decimal = opportunity.legs().iter().map(|l| l.stake_fraction).sum();
    assert_eq!(fractions, Decimal::ONE);
    assert_eq!(opportunity.total_implied_probability(), dec!(0.93));
}

#[test]
fn usual_margin_is_not_an_opportunity() {
    let event = single_event(&[
        american("book-a", "G2", "Eagles", dec!(-110)),
        american("book-a", "G2", "Giants", dec!(-110)),
        american("book-b", "G2", "Eagles", dec!(-110)),
        american("book-b", "G2", "Giants", dec!(-110)),
    ]);

    assert!(OpportunityDetector::default().detect(&event).is_none());
}

#[test]
fn min_edge_suppresses_thin_edges_without_downgrading_to_skew() {
    let event = single_event(&[
        american("book-a", "G1", "Chiefs", dec!(110)),
        american("book-a", "G1", "Bills", dec!(-130)),
        american("book-b", "G1", "Chiefs", dec!(-125)),
        american("book-b", "G1", "Bills", dec!(115)),
    ]);
    let strict = OpportunityDetector::new(DetectorConfig {
        min_edge: dec!(0.10),
        ..DetectorConfig::default()
    });

    assert!(strict.detect(&event).is_none());
}

#[test]
fn skew_is_advisory() {
    let event = single_event(&[
        american("book-a", "G3", "Eagles", dec!(-110)),
        american("book-a", "G3", "Giants", dec!(-110)),
        american("book-b", "G3", "Eagles", dec!(-115)),
        american("book-b", "G3", "Giants", dec!(-105)),
    ]);

    let opportunity = OpportunityDetector::default().detect(&event).unwrap();

    assert_eq!(opportunity.kind(), OpportunityKind::SingleVenueSkew);
    assert!(!opportunity.is_arbitrage());
    assert_eq!(opportunity.expected_roi(), Decimal::ZERO);
    assert_eq!(opportunity.edge(), Decimal::ZERO);
    let book_b = prob(dec!(-115)) + prob(dec!(-105));
    let combined = prob(dec!(-110)) + prob(dec!(-105));
    assert_eq!(opportunity.advantage(), Some(book_b - combined));
}

#[test]
fn kalshi_cents_and_bids() {
    let quotes = vec![
        RawQuote::new("kalshi", "KX-1", "Yes", RawPrice::Cents(dec!(45)), Side::Ask),
        RawQuote::new("kalshi", "KX-1", "No", RawPrice::Cents(dec!(58)), Side::Ask),
        RawQuote::new("kalshi", "KX-1", "Yes", RawPrice::Cents(dec!(40)), Side::Bid),
        RawQuote::new("poly", "KX-1", "yes", RawPrice::Probability(dec!(0.47)), Side::Ask),
        RawQuote::new("poly", "KX-1", "no", RawPrice::Probability(dec!(0.50)), Side::Ask),
    ];
    let event = single_event(&quotes);

    let opportunity = OpportunityDetector::default().detect(&event).unwrap();

    // The 0.40 bid is not buyable; labels match across case.
    assert_eq!(opportunity.total_implied_probability(), dec!(0.95));
    let legs = opportunity.legs();
    assert_eq!(legs[0].label, "Yes");
    assert_eq!(legs[0].venue, VenueId::from("kalshi"));
    assert_eq!(legs[1].label, "No");
    assert_eq!(legs[1].venue, VenueId::from("poly"));
}

#[test]
fn malformed_quotes_are_dropped_before_detection() {
    let mut missing_label = american("book-a", "G1", "x", dec!(150));
    missing_label.label = None;
    let quotes = vec![
        american("book-a", "G1", "Chiefs", dec!(110)),
        american("book-b", "G1", "Bills", dec!(115)),
        american("book-c", "G1", "Bills", dec!(0)),
        missing_label,
    ];

    let event = single_event(&quotes);

    assert_eq!(event.outcome_count(), 2);
    assert!(OpportunityDetector::default().detect(&event).unwrap().is_arbitrage());
}

#[test]
fn value_signal_flags_outlier_price() {
    let event = event(
        "nba",
        "N1",
        vec![
            ask("N1", "x", "Lakers", dec!(0.40)),
            ask("N1", "y", "Lakers", dec!(0.55)),
            ask("N1", "z", "Lakers", dec!(0.55)),
            ask("N1", "x", "Celtics", dec!(0.52)),
            ask("N1", "y", "Celtics", dec!(0.50)),
            ask("N1", "z", "Celtics", dec!(0.51)),
        ],
    );

    let signals = OpportunityDetector::default().detect_value(&event);

    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].label, "Lakers");
    assert_eq!(signals[0].venue, VenueId::from("x"));
    assert_eq!(signals[0].consensus, dec!(0.5));
}
