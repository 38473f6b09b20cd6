//! Event link extraction from listing pages

use crate::config::MarkupConfig;
use crate::show::EventLink;
use scraper::{Html, Selector};

/// Extracts the event detail links from one listing page
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a>` elements carrying the configured event-link class (as one of
///   their class tokens) *and* an `href` attribute
///
/// **Exclude:**
/// - anchors without `href`
/// - anchors without the class, including other links in the page chrome
///
/// The class is matched per token, so `class="event-link featured"`
/// qualifies. Comparing the whole attribute against the class name would
/// drop such anchors.
///
/// Links keep document order and are returned exactly as written in the
/// `href`, without resolution or deduplication. An empty result means the
/// listing has run out of pages.
///
/// # Example
///
/// ```
/// use show_scout::config::MarkupConfig;
/// use show_scout::extract::extract_event_links;
///
/// let html = r#"<ul><li><a class="event-link" href="/concerts/1-x-at-y">X</a></li></ul>"#;
/// let links = extract_event_links(html, &MarkupConfig::default());
/// assert_eq!(links, vec!["/concerts/1-x-at-y".to_string()]);
/// ```
pub fn extract_event_links(html: &str, markup: &MarkupConfig) -> Vec<EventLink> {
    let document = Html::parse_document(html);

    let anchor_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&anchor_selector)
        .filter(|element| {
            element
                .value()
                .classes()
                .any(|class| class == markup.link_class)
        })
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
