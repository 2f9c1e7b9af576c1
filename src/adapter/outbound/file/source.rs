//! [`JsonFileSource`] and the snapshot formats it understands.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::dto::{KalshiMarketsResponse, OddsApiGame, QuotaSidecar};
use crate::application::normalize::assemble_events;
use crate::domain::{Category, Event, RawQuote, VenueId};
use crate::error::Error;
use crate::port::outbound::clock::{Clock, SystemClock};
use crate::port::outbound::source::SnapshotSource;

/// Payload layout of a snapshot file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Array of neutral [`RawQuote`]s.
    #[default]
    Quotes,
    /// The Odds API v4 odds response.
    TheOdds,
    /// Kalshi markets response.
    Kalshi,
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quotes => write!(f, "quotes"),
            Self::TheOdds => write!(f, "theodds"),
            Self::Kalshi => write!(f, "kalshi"),
        }
    }
}

/// Reads per-category snapshot files from a directory.
pub struct JsonFileSource {
    name: String,
    dir: PathBuf,
    format: SnapshotFormat,
    cost: u32,
    clock: Arc<dyn Clock>,
    remaining: Mutex<Option<u32>>,
}

impl JsonFileSource {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            format,
            cost: 1,
            clock: Arc::new(SystemClock),
            remaining: Mutex::new(None),
        }
    }

    /// Quota units charged per fetch.
    #[must_use]
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub const fn format(&self) -> SnapshotFormat {
        self.format
    }

    /// Snapshot file for `category`.
    #[must_use]
    pub fn path_for(&self, category: &Category) -> PathBuf {
        self.dir.join(format!("{category}.json"))
    }

    fn sidecar_for(&self, category: &Category) -> PathBuf {
        self.dir.join(format!("{category}.quota.json"))
    }

    /// Decode a payload into raw quotes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the payload does not match the format.
    pub fn parse_quotes(&self, payload: &str) -> Result<Vec<RawQuote>, Error> {
        let quotes = match self.format {
            SnapshotFormat::Quotes => serde_json::from_str(payload)?,
            SnapshotFormat::TheOdds => {
                let games: Vec<OddsApiGame> = serde_json::from_str(payload)?;
                games.into_iter().flat_map(OddsApiGame::into_quotes).collect()
            }
            SnapshotFormat::Kalshi => {
                let response: KalshiMarketsResponse = serde_json::from_str(payload)?;
                let venue = VenueId::from(self.name.as_str());
                response
                    .markets
                    .into_iter()
                    .flat_map(|market| market.into_quotes(&venue))
                    .collect()
            }
        };
        Ok(quotes)
    }

    /// Record the provider budget from the sidecar, if there is a valid one.
    async fn read_sidecar(&self, category: &Category) {
        let path = self.sidecar_for(category);
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            return;
        };
        match serde_json::from_str::<QuotaSidecar>(&content) {
            Ok(sidecar) => *self.remaining.lock() = Some(sidecar.remaining),
            Err(e) => warn!(path = %path.display(), error = %e, "Ignoring malformed quota sidecar"),
        }
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn request_cost(&self, _category: &Category) -> u32 {
        self.cost
    }

    async fn fetch(&self, category: &Category) -> Result<Vec<Event>, Error> {
        // A count from an earlier fetch must not outlive its sidecar.
        *self.remaining.lock() = None;
        let path = self.path_for(category);
        let payload = tokio::fs::read_to_string(&path).await.map_err(|e| Error::Source {
            name: self.name.clone(),
            reason: format!("{}: {e}", path.display()),
        })?;
        self.read_sidecar(category).await;

        let quotes = self.parse_quotes(&payload)?;
        let events = assemble_events(category, &quotes, self.clock.now());
        debug!(
            source = %self.name,
            category = %category,
            format = %self.format,
            quotes = quotes.len(),
            events = events.len(),
            "Snapshot file read"
        );
        Ok(events)
    }

    fn reported_remaining(&self) -> Option<u32> {
        *self.remaining.lock()
    }
}
