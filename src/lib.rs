//! Show-Scout: an upcoming-concert crawler
//!
//! This crate walks a paginated event listing for a metro area, fetches every
//! event detail page it discovers under a bounded concurrency ceiling, and
//! extracts the headliners and venue of each event.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod show;

use thiserror::Error;

/// Main error type for Show-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unexpected HTTP status {status} from {url}")]
    Fetch { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Crawl task failed: {0}")]
    Task(String),
}

impl ScoutError {
    /// Returns the HTTP status code if this is a non-200 response error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => Some(*status),
            Self::Http { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),
}

/// Result type alias for Show-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlStats, CrawlWindow};
pub use show::{EventLink, Show};
