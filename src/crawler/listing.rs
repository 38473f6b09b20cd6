//! Listing paginator
//!
//! Walks the metro-area listing one page at a time:
//! 1. GET page `n` (starting at 1) with the window's date filters
//! 2. Extract the event links
//! 3. Empty page → the listing is finished
//! 4. Otherwise hand the links out in order and move to page `n + 1`
//!
//! Pages are fetched only when the consumer has drained the previous one.
//! A non-200 listing response ends the walk with an error; later pages are
//! never attempted because they cannot be discovered without it.

use crate::config::{Config, MarkupConfig};
use crate::crawler::fetcher::PageSource;
use crate::crawler::window::CrawlWindow;
use crate::extract::extract_event_links;
use crate::show::EventLink;
use crate::ScoutError;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Query parameter carrying the 1-based page number
pub const PAGE_PARAM: &str = "page";

/// Totals for one walk over the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingSummary {
    /// Listing pages requested, including the terminating empty page
    pub pages: u32,

    /// Links handed to the consumer
    pub links: usize,
}

/// Lazy, single-use sequence of event links from the paginated listing
///
/// # Result Limit
///
/// With a limit set, exactly `min(limit, available)` links are yielded: a
/// page that crosses the limit is truncated, and no further page is
/// requested once the limit has been reached.
pub struct ListingPaginator<S> {
    source: Arc<S>,
    listing_url: String,
    window_params: Vec<(String, String)>,
    markup: MarkupConfig,
    limit: Option<usize>,
    next_page: u32,
    buffered: VecDeque<EventLink>,
    summary: ListingSummary,
    exhausted: bool,
}

impl<S: PageSource> ListingPaginator<S> {
    /// Creates a paginator positioned before page 1
    ///
    /// The limit comes from `crawler.result-limit`.
    pub fn new(source: Arc<S>, config: &Config, window: &CrawlWindow) -> Result<Self, ScoutError> {
        let window_params = window.query_params(&config.window.date_format)?;

        Ok(Self {
            source,
            listing_url: config.site.listing_url(),
            window_params,
            markup: config.markup.clone(),
            limit: config.crawler.result_limit,
            next_page: 1,
            buffered: VecDeque::new(),
            summary: ListingSummary::default(),
            exhausted: false,
        })
    }

    /// Overrides the result limit
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the next event link, fetching the next page when needed
    ///
    /// # Returns
    ///
    /// * `Ok(Some(link))` - The next link in listing order
    /// * `Ok(None)` - The listing is finished or the limit was reached
    /// * `Err(ScoutError)` - A listing page failed; the paginator is finished
    pub async fn next_link(&mut self) -> Result<Option<EventLink>, ScoutError> {
        loop {
            if self.limit_reached() {
                self.exhausted = true;
                self.buffered.clear();
                return Ok(None);
            }

            if let Some(link) = self.buffered.pop_front() {
                self.summary.links += 1;
                return Ok(Some(link));
            }

            if self.exhausted {
                return Ok(None);
            }

            match self.fetch_next_page().await {
                Ok(links) if links.is_empty() => {
                    tracing::debug!(
                        page = self.next_page - 1,
                        "Empty listing page, pagination finished"
                    );
                    self.exhausted = true;
                    return Ok(None);
                }
                Ok(links) => self.buffered.extend(links),
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }
    }

    /// Pushes every link into `links` until the listing is finished
    ///
    /// Stops early without error when the receiving side has gone away.
    /// The sender is dropped on return, which tells the consumer no more
    /// links are coming.
    pub async fn feed(mut self, links: mpsc::Sender<EventLink>) -> Result<ListingSummary, ScoutError> {
        while let Some(link) = self.next_link().await? {
            if links.send(link).await.is_err() {
                tracing::debug!("Link receiver dropped, stopping pagination");
                break;
            }
        }

        tracing::info!(
            pages = self.summary.pages,
            links = self.summary.links,
            "Listing walk finished"
        );
        Ok(self.summary)
    }

    /// Totals so far
    pub fn summary(&self) -> ListingSummary {
        self.summary
    }

    fn limit_reached(&self) -> bool {
        self.limit
            .map_or(false, |limit| self.summary.links >= limit)
    }

    async fn fetch_next_page(&mut self) -> Result<Vec<EventLink>, ScoutError> {
        let page = self.next_page;
        let mut query = self.window_params.clone();
        query.push((PAGE_PARAM.to_string(), page.to_string()));

        tracing::debug!(page, url = %self.listing_url, "Fetching listing page");
        let body = self.source.get_page(&self.listing_url, &query).await?;

        self.summary.pages += 1;
        self.next_page += 1;

        let links = extract_event_links(&body, &self.markup);
        tracing::debug!(page, links = links.len(), "Parsed listing page");
        Ok(links)
    }
}
