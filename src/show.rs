//! Records produced by the crawl

use std::fmt;

/// Relative path of one event detail page, exactly as found in the listing
pub type EventLink = String;

/// One performer playing at one venue
///
/// A detail page with several headliners yields one `Show` per headliner,
/// all sharing the same location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Show {
    /// Performer name
    pub artist: String,

    /// Venue name, if the page carried one
    pub location: Option<String>,
}

impl Show {
    /// Creates a show with a known venue
    pub fn new(artist: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            location: Some(location.into()),
        }
    }
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} @ {}", self.artist, location),
            None => write!(f, "{}", self.artist),
        }
    }
}
