//! Best-effort show derivation from an event link slug

use crate::show::Show;
use regex::Regex;
use std::sync::LazyLock;

/// `/concerts/<id>-<artist>-at-<venue>`, anchored at the start of the link
static CONCERT_SLUG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^/concerts/\d+-([0-9a-z-]+)-at-([0-9a-z-]+)").ok());

/// Derives a show from a link of the form `/concerts/<id>-<artist>-at-<venue>`
///
/// Slug words are joined with spaces. The artist part is matched greedily,
/// so the last `-at-` that still leaves a non-empty venue splits the two and
/// an artist whose slug contains `-at-` keeps it. Matching stops at the first
/// character outside lowercase ASCII letters, digits, and hyphens. Returns
/// `None` when the link does not follow the pattern.
///
/// # Example
///
/// ```
/// use show_scout::extract::guess_show_from_link;
/// use show_scout::Show;
///
/// let show = guess_show_from_link("/concerts/4242-band-a-at-venue-y").unwrap();
/// assert_eq!(show, Show::new("band a", "venue y"));
/// ```
pub fn guess_show_from_link(link: &str) -> Option<Show> {
    let captures = CONCERT_SLUG.as_ref()?.captures(link)?;
    let artist = captures.get(1)?.as_str();
    let venue = captures.get(2)?.as_str();

    Some(Show::new(artist.replace('-', " "), venue.replace('-', " ")))
}
