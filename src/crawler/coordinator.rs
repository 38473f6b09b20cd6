//! Crawler coordinator - main crawl orchestration logic
//!
//! This module wires the crawl together:
//! - Resolving the date window
//! - Running the listing paginator as a producer task
//! - Feeding its links through a bounded channel into the detail fetcher
//! - Draining detail results and applying the failure policy
//!
//! ```text
//! ┌────────────┐  links   ┌──────────────┐  results  ┌─────────────┐
//! │ Paginator  │─────────▶│ DetailFetcher│──────────▶│ Coordinator │
//! │ (1 task)   │  mpsc    │ (≤ workers)  │  mpsc     │             │
//! └────────────┘          └──────────────┘           └─────────────┘
//! ```

use crate::config::{validate, Config, FailurePolicy};
use crate::crawler::detail::{DetailFetcher, DetailResult};
use crate::crawler::fetcher::{HttpSource, PageSource};
use crate::crawler::listing::{ListingPaginator, ListingSummary};
use crate::crawler::stats::CrawlStats;
use crate::crawler::window::CrawlWindow;
use crate::extract::guess_show_from_link;
use crate::show::Show;
use crate::ScoutError;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// Main crawler coordinator structure
///
/// One `Crawler` can run any number of crawls; each run builds its own
/// window, paginator, and fetcher and shares only the page source.
pub struct Crawler<S = HttpSource> {
    config: Arc<Config>,
    source: Arc<S>,
}

impl Crawler<HttpSource> {
    /// Creates a crawler that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(ScoutError)` - The config is invalid or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        validate(&config)?;
        let source = HttpSource::new(&config)?;
        Ok(Self::with_source(config, source))
    }
}

/// Something the coordinator waits on
enum Event {
    Listing(Result<Result<ListingSummary, ScoutError>, JoinError>),
    Detail(Option<DetailResult>),
}

impl<S: PageSource> Crawler<S> {
    /// Creates a crawler over any page source
    pub fn with_source(config: Config, source: S) -> Self {
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
        }
    }

    /// The configuration this crawler runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves the crawl window relative to `today`
    pub fn window(&self, today: NaiveDate) -> Result<CrawlWindow, ScoutError> {
        Ok(CrawlWindow::from_config(&self.config.window, today)?)
    }

    /// Runs one crawl and returns every show found
    pub async fn run(&self) -> Result<Vec<Show>, ScoutError> {
        self.run_with_stats().await.map(|(shows, _)| shows)
    }

    /// Runs one crawl and returns the shows with the crawl's counters
    ///
    /// Shows come back in the order their detail pages completed.
    ///
    /// # Failure Handling
    ///
    /// | Failure                    | Effect                                  |
    /// |----------------------------|-----------------------------------------|
    /// | Listing page               | Crawl fails, outstanding fetches cancel |
    /// | Detail page, `abort`       | Crawl fails, outstanding work cancels   |
    /// | Detail page, `skip`        | Logged and left out of the result       |
    pub async fn run_with_stats(&self) -> Result<(Vec<Show>, CrawlStats), ScoutError> {
        let window = self.window(Local::now().date_naive())?;
        let crawler = &self.config.crawler;

        tracing::info!(
            window = %window,
            listing = %self.config.site.listing_url(),
            workers = crawler.workers,
            limit = ?crawler.result_limit,
            policy = ?crawler.failure_policy,
            "Starting crawl"
        );

        let paginator = ListingPaginator::new(Arc::clone(&self.source), &self.config, &window)?;
        let (link_tx, link_rx) = mpsc::channel(crawler.channel_buffer.max(1));
        let mut producer = tokio::spawn(paginator.feed(link_tx));

        let fetcher = DetailFetcher::new(Arc::clone(&self.source), &self.config);
        let (mut results, dispatcher) = fetcher.spawn(link_rx);

        let mut stats = CrawlStats::default();
        let mut shows = Vec::new();
        let mut producer_done = false;

        loop {
            let event = tokio::select! {
                joined = &mut producer, if !producer_done => Event::Listing(joined),
                received = results.recv() => Event::Detail(received),
            };

            match event {
                Event::Listing(joined) => {
                    producer_done = true;
                    match flatten(joined) {
                        Ok(summary) => record_listing(&mut stats, summary),
                        Err(e) => {
                            tracing::error!(error = %e, "Listing failed, aborting crawl");
                            dispatcher.abort();
                            return Err(e);
                        }
                    }
                }
                Event::Detail(Some(result)) => {
                    if let Err(e) = self.handle_result(result, &mut shows, &mut stats) {
                        tracing::error!(error = %e, "Event page failed, aborting crawl");
                        producer.abort();
                        dispatcher.abort();
                        return Err(e);
                    }
                }
                Event::Detail(None) => break,
            }
        }

        // Results only close after the link channel closed, so the
        // producer has already returned.
        if !producer_done {
            let summary = flatten(producer.await)?;
            record_listing(&mut stats, summary);
        }

        if let Err(e) = dispatcher.await {
            if e.is_panic() {
                return Err(ScoutError::Task(e.to_string()));
            }
        }

        stats.shows = shows.len();
        stats.log();
        Ok((shows, stats))
    }

    fn handle_result(
        &self,
        result: DetailResult,
        shows: &mut Vec<Show>,
        stats: &mut CrawlStats,
    ) -> Result<(), ScoutError> {
        let DetailResult { link, outcome } = result;

        match outcome {
            Ok(mut found) => {
                stats.succeeded += 1;

                if found.is_empty() && self.config.crawler.guess_from_link {
                    if let Some(guess) = guess_show_from_link(&link) {
                        tracing::debug!(link = %link, show = %guess, "Using show guessed from link");
                        stats.guessed += 1;
                        found.push(guess);
                    }
                }

                tracing::debug!(link = %link, shows = found.len(), "Event page processed");
                shows.extend(found);
                Ok(())
            }
            Err(e) => {
                stats.failed += 1;
                match self.config.crawler.failure_policy {
                    FailurePolicy::Abort => Err(e),
                    FailurePolicy::Skip => {
                        tracing::warn!(link = %link, error = %e, "Skipping failed event page");
                        Ok(())
                    }
                }
            }
        }
    }
}

fn record_listing(stats: &mut CrawlStats, summary: ListingSummary) {
    stats.pages = summary.pages;
    stats.links = summary.links;
}

fn flatten<T>(joined: Result<Result<T, ScoutError>, JoinError>) -> Result<T, ScoutError> {
    joined.map_err(|e| ScoutError::Task(e.to_string()))?
}

/// Runs a complete crawl with an HTTP page source
pub async fn run_crawl(config: Config) -> Result<Vec<Show>, ScoutError> {
    Crawler::new(config)?.run().await
}
