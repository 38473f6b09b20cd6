use crate::config::types::{
    Config, CrawlerConfig, MarkupConfig, SiteConfig, UserAgentConfig, WindowConfig,
};
use crate::ConfigError;
use chrono::format::{Item, StrftimeItems};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_window_config(&config.window)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_markup_config(&config.markup)?;
    Ok(())
}

/// Validates the listing site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' cannot carry a query or fragment",
            config.base_url
        )));
    }

    if config.region_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "region_id cannot be empty".to_string(),
        ));
    }

    if config.region_id.contains('/') || config.region_id.contains('?') {
        return Err(ConfigError::Validation(format!(
            "region_id must be a single path segment, got '{}'",
            config.region_id
        )));
    }

    Ok(())
}

/// Validates the date window settings
fn validate_window_config(config: &WindowConfig) -> Result<(), ConfigError> {
    if config.span_days > 366 {
        return Err(ConfigError::Validation(format!(
            "span_days must be <= 366, got {}",
            config.span_days
        )));
    }

    if config.offset_days > 3650 {
        return Err(ConfigError::Validation(format!(
            "offset_days must be <= 3650, got {}",
            config.offset_days
        )));
    }

    validate_date_format(&config.date_format)
}

/// Rejects empty or unparseable strftime patterns
pub(crate) fn validate_date_format(format: &str) -> Result<(), ConfigError> {
    if format.is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.result_limit == Some(0) {
        return Err(ConfigError::Validation(
            "result_limit must be >= 1 when set".to_string(),
        ));
    }

    if config.request_timeout < 1 || config.request_timeout > 300 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be between 1 and 300 seconds, got {}",
            config.request_timeout
        )));
    }

    if config.channel_buffer < 1 {
        return Err(ConfigError::Validation(
            "channel_buffer must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates markup markers
fn validate_markup_config(config: &MarkupConfig) -> Result<(), ConfigError> {
    let fields = [
        ("link_class", &config.link_class),
        ("marker_attribute", &config.marker_attribute),
        ("headliner_value", &config.headliner_value),
        ("venue_value", &config.venue_value),
    ];

    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.link_class.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "link_class must be a single class name, got '{}'",
            config.link_class
        )));
    }

    if config.headliner_value == config.venue_value {
        return Err(ConfigError::Validation(
            "headliner_value and venue_value must differ".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("%m/%d/%Y").is_ok());
        assert!(validate_date_format("%Y-%m-%d").is_ok());

        assert!(validate_date_format("").is_err());
        assert!(validate_date_format("%Q").is_err());
        assert!(validate_date_format("%").is_err());
    }

    #[test]
    fn test_validate_site() {
        let mut site = SiteConfig::default();
        assert!(validate_site_config(&site).is_ok());

        site.base_url = "ftp://example.com".to_string();
        assert!(validate_site_config(&site).is_err());

        site.base_url = "not a url".to_string();
        assert!(validate_site_config(&site).is_err());

        site = SiteConfig::default();
        site.region_id = "a/b".to_string();
        assert!(validate_site_config(&site).is_err());

        site.region_id = "  ".to_string();
        assert!(validate_site_config(&site).is_err());
    }

    #[test]
    fn test_validate_workers_bounds() {
        let mut crawler = CrawlerConfig::default();
        crawler.workers = 0;
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.workers = 65;
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.workers = 1;
        assert!(validate_crawler_config(&crawler).is_ok());
    }

    #[test]
    fn test_validate_result_limit() {
        let mut crawler = CrawlerConfig::default();
        crawler.result_limit = Some(0);
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.result_limit = Some(1);
        assert!(validate_crawler_config(&crawler).is_ok());
    }

    #[test]
    fn test_validate_markup() {
        let mut markup = MarkupConfig::default();
        assert!(validate_markup_config(&markup).is_ok());

        markup.link_class = "event link".to_string();
        assert!(validate_markup_config(&markup).is_err());

        markup = MarkupConfig::default();
        markup.venue_value = markup.headliner_value.clone();
        assert!(validate_markup_config(&markup).is_err());
    }
}
