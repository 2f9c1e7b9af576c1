//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Venue identifier (a sportsbook key or a prediction-market platform).
///
/// Ordering is lexicographic; the detector relies on it for deterministic
/// tie-breaks between equally priced venues.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VenueId(String);

impl VenueId {
    /// Create a new `VenueId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the venue ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VenueId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for VenueId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of one real-world occurrence shared by every venue quoting it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    /// Create a new `EventId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the event ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Data category a snapshot belongs to, e.g. `nfl_odds` or
/// `prediction_markets`. The unit of caching and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Create a new `Category` from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the category name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_ids_order_lexicographically() {
        let mut venues = vec![VenueId::from("pinnacle"), VenueId::from("draftkings")];
        venues.sort();
        assert_eq!(venues[0].as_str(), "draftkings");
    }

    #[test]
    fn category_displays_raw_name() {
        assert_eq!(Category::from("nfl_odds").to_string(), "nfl_odds");
    }
}
