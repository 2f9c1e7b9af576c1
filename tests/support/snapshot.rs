//! Snapshot files in the formats the file source reads.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

/// One The Odds API game with an `h2h` market per bookmaker.
///
/// `books` holds `(bookmaker, home odds, away odds)` in American odds.
pub fn odds_api_game(id: &str, home: &str, away: &str, books: &[(&str, i64, i64)]) -> Value {
    let bookmakers: Vec<Value> = books
        .iter()
        .map(|(key, home_odds, away_odds)| {
            json!({
                "key": key,
                "title": key,
                "markets": [{
                    "key": "h2h",
                    "outcomes": [
                        { "name": home, "price": home_odds },
                        { "name": away, "price": away_odds },
                    ],
                }],
            })
        })
        .collect();

    json!({
        "id": id,
        "sport_key": "americanfootball_nfl",
        "home_team": home,
        "away_team": away,
        "bookmakers": bookmakers,
    })
}

/// One Kalshi market with ask and bid prices in cents.
pub fn kalshi_market(ticker: &str, yes_ask: i64, no_ask: i64) -> Value {
    json!({
        "ticker": ticker,
        "event_ticker": ticker,
        "title": ticker,
        "yes_ask": yes_ask,
        "no_ask": no_ask,
        "yes_bid": yes_ask - 2,
        "no_bid": no_ask - 2,
        "volume": 1200,
    })
}

/// Neutral quote in probability units.
pub fn quote(venue: &str, event_id: &str, label: &str, probability: &str) -> Value {
    json!({
        "venue": venue,
        "event_id": event_id,
        "label": label,
        "price": { "probability": probability },
        "side": "ask",
    })
}

/// Write `<dir>/<category>.json`.
pub fn write(dir: &Path, category: &str, payload: &Value) {
    fs::write(dir.join(format!("{category}.json")), payload.to_string())
        .unwrap_or_else(|e| panic!("failed to write snapshot: {e}"));
}

/// Write the provider-budget sidecar next to a snapshot.
pub fn write_sidecar(dir: &Path, category: &str, remaining: u32) {
    fs::write(
        dir.join(format!("{category}.quota.json")),
        json!({ "x-requests-remaining": remaining }).to_string(),
    )
    .unwrap_or_else(|e| panic!("failed to write sidecar: {e}"));
}

/// Game where the best prices across two books sum below one.
///
/// `book-a`: home +110 (0.4762), away -130 (0.5652).
/// `book-b`: home -125 (0.5556), away +115 (0.4651).
/// Best total is 0.4762 + 0.4651 = 0.9413.
pub fn arbitrage_game(id: &str) -> Value {
    odds_api_game(id, "Chiefs", "Bills", &[("book-a", 110, -130), ("book-b", -125, 115)])
}

/// Game priced -110 both ways by both books: no arbitrage, no skew.
pub fn fair_game(id: &str) -> Value {
    odds_api_game(id, "Eagles", "Giants", &[("book-a", -110, -110), ("book-b", -110, -110)])
}
