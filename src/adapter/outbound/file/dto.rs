//! Venue payload shapes.
//!
//! Only the fields the normalizer needs are modeled; everything is optional
//! so a sparse payload still parses and incomplete quotes are rejected by
//! normalization instead of by serde.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::{EventId, RawPrice, RawQuote, Side, VenueId};

/// Moneyline market key in The Odds API.
const H2H: &str = "h2h";

/// One game from The Odds API v4 `/sports/{sport}/odds`.
#[derive(Debug, Deserialize)]
pub struct OddsApiGame {
    pub id: Option<String>,
    pub sport_key: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    #[serde(default)]
    pub bookmakers: Vec<OddsApiBookmaker>,
}

#[derive(Debug, Deserialize)]
pub struct OddsApiBookmaker {
    pub key: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub markets: Vec<OddsApiMarket>,
}

#[derive(Debug, Deserialize)]
pub struct OddsApiMarket {
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<OddsApiOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct OddsApiOutcome {
    pub name: Option<String>,
    /// American odds.
    pub price: Option<Decimal>,
}

impl OddsApiGame {
    /// One single-price quote per bookmaker and team in the `h2h` market.
    #[must_use]
    pub fn into_quotes(self) -> Vec<RawQuote> {
        let event_id = self.id.map(EventId::from);
        self.bookmakers
            .into_iter()
            .flat_map(|bookmaker| {
                let venue = bookmaker.key.map(VenueId::from);
                let event_id = event_id.clone();
                bookmaker
                    .markets
                    .into_iter()
                    .filter(|market| market.key == H2H)
                    .flat_map(|market| market.outcomes)
                    .map(move |outcome| RawQuote {
                        venue: venue.clone(),
                        event_id: event_id.clone(),
                        label: outcome.name,
                        price: outcome.price.map(RawPrice::American),
                        side: Side::Single,
                        liquidity: None,
                    })
            })
            .collect()
    }
}

/// Kalshi `GET /markets` response.
#[derive(Debug, Deserialize)]
pub struct KalshiMarketsResponse {
    #[serde(default)]
    pub markets: Vec<KalshiMarket>,
    pub cursor: Option<String>,
}

/// One binary Kalshi market. Prices are in cents.
#[derive(Debug, Deserialize)]
pub struct KalshiMarket {
    pub ticker: Option<String>,
    pub event_ticker: Option<String>,
    pub title: Option<String>,
    pub yes_bid: Option<Decimal>,
    pub yes_ask: Option<Decimal>,
    pub no_bid: Option<Decimal>,
    pub no_ask: Option<Decimal>,
    pub volume: Option<Decimal>,
}

impl KalshiMarket {
    /// Ask and bid quotes for both contracts, attributed to `venue`.
    #[must_use]
    pub fn into_quotes(self, venue: &VenueId) -> Vec<RawQuote> {
        let event_id = self.ticker.map(EventId::from);
        let volume = self.volume;
        [
            ("Yes", Side::Ask, self.yes_ask),
            ("No", Side::Ask, self.no_ask),
            ("Yes", Side::Bid, self.yes_bid),
            ("No", Side::Bid, self.no_bid),
        ]
        .into_iter()
        .map(|(label, side, cents)| RawQuote {
            venue: Some(venue.clone()),
            event_id: event_id.clone(),
            label: Some(label.to_string()),
            price: cents.map(RawPrice::Cents),
            side,
            liquidity: volume,
        })
        .collect()
    }
}

/// Provider budget recorded next to a snapshot.
#[derive(Debug, Deserialize)]
pub struct QuotaSidecar {
    /// Value of the provider's `x-requests-remaining` header.
    #[serde(alias = "x-requests-remaining")]
    pub remaining: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn odds_api_keeps_only_moneyline() {
        let json = r#"{
            "id": "g1",
            "home_team": "Chiefs",
            "away_team": "Bills",
            "bookmakers": [{
                "key": "fanduel",
                "markets": [
                    {"key": "h2h", "outcomes": [{"name": "Chiefs", "price": -150}, {"name": "Bills", "price": 130}]},
                    {"key": "spreads", "outcomes": [{"name": "Chiefs", "price": -110}]}
                ]
            }]
        }"#;
        let game: OddsApiGame = serde_json::from_str(json).unwrap();

        let quotes = game.into_quotes();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].price, Some(RawPrice::American(dec!(-150))));
        assert_eq!(quotes[1].venue, Some(VenueId::from("fanduel")));
    }

    #[test]
    fn kalshi_market_yields_four_quotes() {
        let json = r#"{"ticker": "KXNFL-1", "yes_bid": 40, "yes_ask": 42, "no_bid": 57, "no_ask": 59, "volume": 1200}"#;
        let market: KalshiMarket = serde_json::from_str(json).unwrap();

        let quotes = market.into_quotes(&VenueId::from("kalshi"));

        assert_eq!(quotes.len(), 4);
        assert_eq!(quotes[0].side, Side::Ask);
        assert_eq!(quotes[0].price, Some(RawPrice::Cents(dec!(42))));
        assert_eq!(quotes[3].liquidity, Some(dec!(1200)));
    }

    #[test]
    fn sidecar_accepts_header_name() {
        let sidecar: QuotaSidecar = serde_json::from_str(r#"{"x-requests-remaining": 480}"#).unwrap();
        assert_eq!(sidecar.remaining, 480);
    }
}
