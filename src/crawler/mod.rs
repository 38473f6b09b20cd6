//! Crawler module for listing and event page fetching
//!
//! This module contains the core crawling logic, including:
//! - The crawl date window
//! - HTTP fetching behind the `PageSource` seam
//! - Sequential listing pagination
//! - Bounded-concurrency detail fetching
//! - Overall crawl coordination

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod stats;
mod window;

pub use coordinator::{run_crawl, Crawler};
pub use detail::{DetailFetcher, DetailResult};
pub use fetcher::{build_http_client, fetch_page, HttpSource, PageSource};
pub use listing::{ListingPaginator, ListingSummary, PAGE_PARAM};
pub use stats::CrawlStats;
pub use window::{CrawlWindow, MAX_DATE_PARAM, MIN_DATE_PARAM};

use crate::config::Config;
use crate::show::Show;
use crate::ScoutError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Resolve the date window
/// 3. Walk the listing and fetch every event page it links to
/// 4. Collect the shows from every event page
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Vec<Show>)` - Every show found, in completion order
/// * `Err(ScoutError)` - The crawl failed; the error names the URL involved
pub async fn crawl(config: Config) -> Result<Vec<Show>, ScoutError> {
    run_crawl(config).await
}
