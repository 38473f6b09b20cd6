//! Headliner and venue extraction from event detail pages
//!
//! Detail pages label their regions with a marker attribute
//! (`data-analytics-label` by default). The extractor runs the HTML
//! tokenizer over the page and tracks which labelled region the tag stream
//! is in:
//!
//! | Event                                  | Next region        |
//! |----------------------------------------|--------------------|
//! | start tag, marker = headliner value    | `Artist`           |
//! | start tag, marker = venue value        | `Venue`            |
//! | start tag, marker = anything else      | `Neutral`          |
//! | start tag without the marker attribute | unchanged          |
//! | end tag                                | `Neutral`          |
//! | self-closing tag (`<br/>`)             | start, then end    |
//!
//! Only end tags written in the markup count. Void elements such as `<img>`
//! or `<br>` and elements the parser would close implicitly (`<p>`, `<li>`)
//! leave the region alone. The first end tag inside a headliner region ends
//! it, even when that end tag belongs to a nested child.

use crate::config::MarkupConfig;
use crate::show::Show;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Neutral,
    Artist,
    Venue,
}

impl Region {
    fn from_marker(value: &str, markup: &MarkupConfig) -> Self {
        if value == markup.headliner_value {
            Self::Artist
        } else if value == markup.venue_value {
            Self::Venue
        } else {
            Self::Neutral
        }
    }
}

/// Token sink that collects headliners and the venue
struct ShowSink<'a> {
    markup: &'a MarkupConfig,
    region: Region,
    text: String,
    artists: Vec<String>,
    location: Option<String>,
}

impl<'a> ShowSink<'a> {
    fn new(markup: &'a MarkupConfig) -> Self {
        Self {
            markup,
            region: Region::Neutral,
            text: String::new(),
            artists: Vec::new(),
            location: None,
        }
    }

    /// Attributes the text gathered since the last tag to the current region
    fn flush_text(&mut self) {
        let run = self.text.trim();
        if !run.is_empty() {
            match self.region {
                Region::Artist => self.artists.push(run.to_string()),
                Region::Venue => self.location = Some(run.to_string()),
                Region::Neutral => {}
            }
        }
        self.text.clear();
    }

    fn start_tag(&mut self, tag: &Tag) -> TokenSinkResult<()> {
        let markup = self.markup;
        if let Some(attr) = tag
            .attrs
            .iter()
            .find(|attr| &*attr.name.local == markup.marker_attribute.as_str())
        {
            self.region = Region::from_marker(&attr.value, markup);
        }

        if tag.self_closing {
            self.region = Region::Neutral;
            return TokenSinkResult::Continue;
        }

        // Script and style bodies are text, not markup
        match &*tag.name {
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "style" => TokenSinkResult::RawData(RawKind::Rawtext),
            _ => TokenSinkResult::Continue,
        }
    }
}

impl TokenSink for ShowSink<'_> {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                self.text.push_str(&text);
                TokenSinkResult::Continue
            }
            Token::TagToken(tag) => {
                self.flush_text();
                match tag.kind {
                    TagKind::StartTag => self.start_tag(&tag),
                    TagKind::EndTag => {
                        self.region = Region::Neutral;
                        TokenSinkResult::Continue
                    }
                }
            }
            Token::CommentToken(_) | Token::EOFToken => {
                self.flush_text();
                TokenSinkResult::Continue
            }
            _ => TokenSinkResult::Continue,
        }
    }
}

/// Extracts every show listed on one event detail page
///
/// Each non-blank text run inside a headliner region becomes one `Show`, in
/// document order. A text run is the text between two tags, with character
/// references decoded. The last text run seen inside a venue region is the
/// location shared by all of them; pages without a venue region produce shows
/// with no location. Pages without a headliner region produce nothing.
///
/// Unknown tags and malformed markup are absorbed by the tokenizer, so this
/// never fails.
///
/// # Example
///
/// ```
/// use show_scout::config::MarkupConfig;
/// use show_scout::extract::extract_shows;
/// use show_scout::Show;
///
/// let html = r#"
///     <a data-analytics-label="headliners">Band A</a>
///     <a data-analytics-label="venue_name">Venue Y</a>
/// "#;
/// let shows = extract_shows(html, &MarkupConfig::default());
/// assert_eq!(shows, vec![Show::new("Band A", "Venue Y")]);
/// ```
pub fn extract_shows(html: &str, markup: &MarkupConfig) -> Vec<Show> {
    let mut input = BufferQueue::new();
    input.push_back(StrTendril::from(html));

    let mut tokenizer = Tokenizer::new(ShowSink::new(markup), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    let artists = std::mem::take(&mut tokenizer.sink.artists);
    let location = tokenizer.sink.location.take();

    tracing::trace!(
        artists = artists.len(),
        has_location = location.is_some(),
        "Extracted event details"
    );

    artists
        .into_iter()
        .map(|artist| Show {
            artist,
            location: location.clone(),
        })
        .collect()
}
