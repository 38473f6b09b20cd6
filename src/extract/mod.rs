//! Markup extractors
//!
//! Two independent, stateless parsers over one HTML document each:
//! - listing pages -> event detail links
//! - event detail pages -> headliner/venue shows
//!
//! Neither can fail: markup they don't recognize yields an empty result.

mod event;
mod guess;
mod listing;

pub use event::extract_shows;
pub use guess::guess_show_from_link;
pub use listing::extract_event_links;
