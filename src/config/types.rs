use chrono::NaiveDate;
use serde::Deserialize;

/// Default listing site
pub const DEFAULT_BASE_URL: &str = "https://www.songkick.com";

/// Default metro area (San Francisco Bay Area)
pub const DEFAULT_REGION_ID: &str = "26330-us-sf-bay-area";

/// Main configuration structure for Show-Scout
///
/// Every section is optional; an empty file crawls the default metro area.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub window: WindowConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub markup: MarkupConfig,
}

/// Where the listing and detail pages live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host prefixed to every request path
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Metro area path segment of the listing endpoint
    #[serde(rename = "region-id")]
    pub region_id: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            region_id: DEFAULT_REGION_ID.to_string(),
        }
    }
}

impl SiteConfig {
    /// URL of the paginated listing, without query parameters
    pub fn listing_url(&self) -> String {
        format!(
            "{}/metro-areas/{}",
            self.base_url.trim_end_matches('/'),
            self.region_id
        )
    }

    /// URL of an event detail page
    pub fn detail_url(&self, link: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), link)
    }
}

/// Date range the listing is filtered to
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Days from today to the first day of the window
    #[serde(rename = "offset-days")]
    pub offset_days: u32,

    /// Days from the first to the last day of the window
    #[serde(rename = "span-days")]
    pub span_days: u32,

    /// Fixed first day; overrides `offset-days` when set
    #[serde(rename = "start-date")]
    pub start_date: Option<NaiveDate>,

    /// strftime pattern used for the listing's date filters
    #[serde(rename = "date-format")]
    pub date_format: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            offset_days: 20,
            span_days: 2,
            start_date: None,
            date_format: "%m/%d/%Y".to_string(),
        }
    }
}

/// What to do when a single detail page fails to fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The first detail failure fails the whole crawl
    #[default]
    Abort,

    /// Log the failure and keep the shows from every other page
    Skip,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of detail pages fetched at once
    pub workers: usize,

    /// Maximum number of event links taken from the listing
    #[serde(rename = "result-limit")]
    pub result_limit: Option<usize>,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Handling of failed detail fetches
    #[serde(rename = "failure-policy")]
    pub failure_policy: FailurePolicy,

    /// Derive a show from the link slug when a detail page yields nothing
    #[serde(rename = "guess-from-link")]
    pub guess_from_link: bool,

    /// Capacity of the link and result channels
    #[serde(rename = "channel-buffer")]
    pub channel_buffer: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            result_limit: None,
            request_timeout: 30,
            failure_policy: FailurePolicy::Abort,
            guess_from_link: false,
            channel_buffer: 64,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ShowScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Markers identifying the interesting parts of listing and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Class carried by event anchors on listing pages
    #[serde(rename = "link-class")]
    pub link_class: String,

    /// Attribute whose value labels regions of a detail page
    #[serde(rename = "marker-attribute")]
    pub marker_attribute: String,

    /// Marker value of the headliner region
    #[serde(rename = "headliner-value")]
    pub headliner_value: String,

    /// Marker value of the venue name region
    #[serde(rename = "venue-value")]
    pub venue_value: String,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            link_class: "event-link".to_string(),
            marker_attribute: "data-analytics-label".to_string(),
            headliner_value: "headliners".to_string(),
            venue_value: "venue_name".to_string(),
        }
    }
}
