//! Per-crawl counters

use std::fmt;

/// Counters collected over one crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Listing pages requested
    pub pages: u32,

    /// Event links discovered and dispatched
    pub links: usize,

    /// Detail pages fetched successfully
    pub succeeded: usize,

    /// Detail pages that failed
    pub failed: usize,

    /// Detail pages whose show was derived from the link slug
    pub guessed: usize,

    /// Shows returned
    pub shows: usize,
}

impl CrawlStats {
    /// Emits the counters as one structured log line
    pub fn log(&self) {
        tracing::info!(
            pages = self.pages,
            links = self.links,
            succeeded = self.succeeded,
            failed = self.failed,
            guessed = self.guessed,
            shows = self.shows,
            "Crawl statistics"
        );
    }
}

impl fmt::Display for CrawlStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages, {} events ({} ok, {} failed, {} guessed), {} shows",
            self.pages, self.links, self.succeeded, self.failed, self.guessed, self.shows
        )
    }
}
