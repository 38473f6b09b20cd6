//! Date window the listing is filtered to

use crate::config::{validate_date_format, WindowConfig};
use crate::ConfigError;
use chrono::{Days, NaiveDate};
use std::fmt::{self, Write};

/// Query parameter carrying the first day of the window
pub const MIN_DATE_PARAM: &str = "filters[minDate]";

/// Query parameter carrying the last day of the window
pub const MAX_DATE_PARAM: &str = "filters[maxDate]";

/// Inclusive date range of one crawl
///
/// Fixed when the crawl starts; `end >= start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl CrawlWindow {
    /// Creates a window, rejecting an end before the start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if end < start {
            return Err(ConfigError::Validation(format!(
                "window end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Creates a window of `start` plus `span_days`
    pub fn from_span(start: NaiveDate, span_days: u32) -> Result<Self, ConfigError> {
        let end = start
            .checked_add_days(Days::new(span_days.into()))
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "window of {} days from {} is out of range",
                    span_days, start
                ))
            })?;
        Self::new(start, end)
    }

    /// Resolves the configured window relative to `today`
    ///
    /// A configured `start-date` wins over `offset-days`.
    pub fn from_config(config: &WindowConfig, today: NaiveDate) -> Result<Self, ConfigError> {
        let start = match config.start_date {
            Some(start) => start,
            None => today
                .checked_add_days(Days::new(config.offset_days.into()))
                .ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "offset of {} days from {} is out of range",
                        config.offset_days, today
                    ))
                })?,
        };
        Self::from_span(start, config.span_days)
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Listing query parameters for this window
    ///
    /// Values are rendered with the strftime `format` and left unencoded;
    /// the HTTP client percent-encodes them.
    pub fn query_params(&self, format: &str) -> Result<Vec<(String, String)>, ConfigError> {
        validate_date_format(format)?;
        Ok(vec![
            (MIN_DATE_PARAM.to_string(), format_date(self.start, format)?),
            (MAX_DATE_PARAM.to_string(), format_date(self.end, format)?),
        ])
    }
}

impl fmt::Display for CrawlWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn format_date(date: NaiveDate, format: &str) -> Result<String, ConfigError> {
    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| ConfigError::InvalidDateFormat(format.to_string()))?;
    Ok(out)
}
