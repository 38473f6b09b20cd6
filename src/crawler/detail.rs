//! Bounded detail fetcher
//!
//! Pulls event links off a channel, fetches and parses each detail page, and
//! pushes one [`DetailResult`] per link onto a results channel.
//!
//! # Admission
//!
//! Every fetch must hold a permit from a semaphore sized to `workers` before
//! it may start, and releases it as soon as its response has been parsed.
//! The dispatcher waits for a permit before taking on the next link, so at
//! most `workers` detail requests are ever in flight. With one worker the
//! fetches are strictly serialized.
//!
//! # Ordering
//!
//! Links are admitted in the order they arrive; results are sent in the
//! order fetches complete.

use crate::config::{Config, MarkupConfig, SiteConfig};
use crate::crawler::fetcher::PageSource;
use crate::extract::extract_shows;
use crate::show::{EventLink, Show};
use crate::ScoutError;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

/// Outcome of fetching one event detail page
#[derive(Debug)]
pub struct DetailResult {
    /// The link exactly as it came from the listing
    pub link: EventLink,

    /// Shows found on the page, or why the page could not be fetched
    pub outcome: Result<Vec<Show>, ScoutError>,
}

impl DetailResult {
    /// Returns true if the page was fetched
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fetches event detail pages under a concurrency ceiling
pub struct DetailFetcher<S> {
    source: Arc<S>,
    site: SiteConfig,
    markup: MarkupConfig,
    workers: usize,
    buffer: usize,
}

impl<S: PageSource> DetailFetcher<S> {
    /// Creates a fetcher using `crawler.workers` as the ceiling
    pub fn new(source: Arc<S>, config: &Config) -> Self {
        Self {
            source,
            site: config.site.clone(),
            markup: config.markup.clone(),
            workers: config.crawler.workers.max(1),
            buffer: config.crawler.channel_buffer.max(1),
        }
    }

    /// Number of fetches allowed in flight at once
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetches one detail page and extracts its shows
    pub async fn fetch(&self, link: &str) -> Result<Vec<Show>, ScoutError> {
        let url = self.site.detail_url(link);
        let body = self.source.get_page(&url, &[]).await?;
        Ok(extract_shows(&body, &self.markup))
    }

    /// Starts dispatching links from `links`
    ///
    /// Returns the results channel and the dispatcher's handle. The results
    /// channel closes once `links` has closed and every admitted fetch has
    /// reported. Aborting the handle cancels every outstanding fetch.
    pub fn spawn(
        self,
        mut links: mpsc::Receiver<EventLink>,
    ) -> (mpsc::Receiver<DetailResult>, JoinHandle<()>) {
        let (result_tx, result_rx) = mpsc::channel(self.buffer);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let fetcher = Arc::new(self);

        let handle = tokio::spawn(async move {
            let mut tasks = JoinSet::new();
            let mut dispatched: u64 = 0;

            while let Some(link) = links.recv().await {
                let permit = match Arc::clone(&semaphore).acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::error!("Admission semaphore closed");
                        break;
                    }
                };

                dispatched += 1;
                tracing::debug!(
                    link = %link,
                    in_flight = fetcher.workers - semaphore.available_permits(),
                    "Dispatching detail fetch"
                );

                let fetcher = Arc::clone(&fetcher);
                let result_tx = result_tx.clone();
                tasks.spawn(async move {
                    let outcome = fetcher.fetch(&link).await;
                    drop(permit);

                    if let Err(e) = &outcome {
                        tracing::debug!(link = %link, error = %e, "Detail fetch failed");
                    }

                    if result_tx.send(DetailResult { link, outcome }).await.is_err() {
                        tracing::debug!("Result receiver dropped");
                    }
                });

                while let Some(joined) = tasks.try_join_next() {
                    log_join(joined);
                }
            }

            while let Some(joined) = tasks.join_next().await {
                log_join(joined);
            }

            tracing::debug!(dispatched, "Detail dispatcher finished");
        });

        (result_rx, handle)
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            tracing::error!(error = %e, "Detail fetch task panicked");
        }
    }
}
