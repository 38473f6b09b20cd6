//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing site and run the
//! full crawl cycle end-to-end over real HTTP.

use chrono::NaiveDate;
use show_scout::config::{Config, CrawlerConfig, FailurePolicy, SiteConfig, WindowConfig};
use show_scout::crawler::Crawler;
use show_scout::{crawl, Show};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REGION: &str = "26330-us-sf-bay-area";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, workers: usize) -> Config {
    Config {
        site: SiteConfig {
            base_url: base_url.to_string(),
            region_id: REGION.to_string(),
        },
        window: WindowConfig {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            span_days: 7,
            ..WindowConfig::default()
        },
        crawler: CrawlerConfig {
            workers,
            request_timeout: 5,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn listing_body(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<li class="event-listings-element"><a class="event-link" href="{}">Event</a></li>"#,
                link
            )
        })
        .collect();
    format!(
        r#"<html><body><a href="/about">About</a><ul>{}</ul></body></html>"#,
        anchors
    )
}

fn detail_body(artist: &str, venue: &str) -> String {
    format!(
        r#"<html><body>
        <div class="line-up"><a data-analytics-label="headliners" href="/artists/1">{}</a></div>
        <div class="venue-info"><a data-analytics-label="venue_name" href="/venues/1">{}</a></div>
        </body></html>"#,
        artist, venue
    )
}

async fn mount_listing_page(server: &MockServer, page: u32, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/metro-areas/{}", REGION)))
        .and(query_param("page", page.to_string()))
        .and(query_param("filters[minDate]", "01/01/2024"))
        .and(query_param("filters[maxDate]", "01/08/2024"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(links)))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, link: &str, artist: &str, venue: &str) {
    Mock::given(method("GET"))
        .and(path(link.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_body(artist, venue)))
        .mount(server)
        .await;
}

fn sorted(mut shows: Vec<Show>) -> Vec<Show> {
    shows.sort();
    shows
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let mock_server = MockServer::start().await;

    mount_listing_page(
        &mock_server,
        1,
        &["/concerts/1-x-at-y", "/concerts/2-a-at-b"],
    )
    .await;
    mount_listing_page(&mock_server, 2, &[]).await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;
    mount_detail(&mock_server, "/concerts/2-a-at-b", "Band B", "Venue B").await;

    let config = create_test_config(&mock_server.uri(), 2);
    let shows = crawl(config).await.expect("Crawl failed");

    assert_eq!(
        sorted(shows),
        vec![Show::new("Band A", "Venue Y"), Show::new("Band B", "Venue B")]
    );
}

#[tokio::test]
async fn test_empty_page_stops_pagination() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, 1, &["/concerts/1-x-at-y"]).await;
    mount_listing_page(&mock_server, 2, &["/concerts/2-a-at-b"]).await;
    mount_listing_page(&mock_server, 3, &[]).await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;
    mount_detail(&mock_server, "/concerts/2-a-at-b", "Band B", "Venue B").await;

    // Page 4 must never be requested
    Mock::given(method("GET"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[
            "/concerts/9-never-at-never",
        ])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config(&mock_server.uri(), 3)).unwrap();
    let (shows, stats) = crawler.run_with_stats().await.expect("Crawl failed");

    assert_eq!(shows.len(), 2);
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.links, 2);
}

#[tokio::test]
async fn test_listing_error_is_fatal() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, 1, &["/concerts/1-x-at-y"]).await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;

    Mock::given(method("GET"))
        .and(path(format!("/metro-areas/{}", REGION)))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    // No retry and no skipping ahead
    Mock::given(method("GET"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let err = crawl(config).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("metro-areas"));
}

#[tokio::test]
async fn test_detail_error_aborts_by_default() {
    let mock_server = MockServer::start().await;

    mount_listing_page(
        &mock_server,
        1,
        &["/concerts/1-x-at-y", "/concerts/2-a-at-b"],
    )
    .await;
    mount_listing_page(&mock_server, 2, &[]).await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;

    Mock::given(method("GET"))
        .and(path("/concerts/2-a-at-b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let err = crawl(config).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("/concerts/2-a-at-b"));
}

#[tokio::test]
async fn test_detail_error_skipped_when_configured() {
    let mock_server = MockServer::start().await;

    mount_listing_page(
        &mock_server,
        1,
        &[
            "/concerts/1-x-at-y",
            "/concerts/2-a-at-b",
            "/concerts/3-c-at-d",
        ],
    )
    .await;
    mount_listing_page(&mock_server, 2, &[]).await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;
    mount_detail(&mock_server, "/concerts/3-c-at-d", "Band C", "Venue D").await;

    Mock::given(method("GET"))
        .and(path("/concerts/2-a-at-b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 3);
    config.crawler.failure_policy = FailurePolicy::Skip;

    let crawler = Crawler::new(config).unwrap();
    let (shows, stats) = crawler.run_with_stats().await.expect("Crawl failed");

    assert_eq!(
        sorted(shows),
        vec![Show::new("Band A", "Venue Y"), Show::new("Band C", "Venue D")]
    );
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.succeeded, 2);
}

#[tokio::test]
async fn test_result_limit_stops_listing() {
    let mock_server = MockServer::start().await;

    mount_listing_page(
        &mock_server,
        1,
        &[
            "/concerts/1-x-at-y",
            "/concerts/2-a-at-b",
            "/concerts/3-c-at-d",
        ],
    )
    .await;
    mount_detail(&mock_server, "/concerts/1-x-at-y", "Band A", "Venue Y").await;
    mount_detail(&mock_server, "/concerts/2-a-at-b", "Band B", "Venue B").await;

    Mock::given(method("GET"))
        .and(path("/concerts/3-c-at-d"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_body("Band C", "Venue D")))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_body(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 2);
    config.crawler.result_limit = Some(2);

    let shows = crawl(config).await.expect("Crawl failed");
    assert_eq!(
        sorted(shows),
        vec![Show::new("Band A", "Venue Y"), Show::new("Band B", "Venue B")]
    );
}

#[tokio::test]
async fn test_single_worker_serializes_detail_fetches() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(150);
    let links = [
        "/concerts/1-x-at-y",
        "/concerts/2-a-at-b",
        "/concerts/3-c-at-d",
    ];

    mount_listing_page(&mock_server, 1, &links).await;
    mount_listing_page(&mock_server, 2, &[]).await;

    for (i, link) in links.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(link.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_body(&format!("Band {}", i), "Hall"))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server.uri(), 1);
    let start = Instant::now();
    let shows = crawl(config).await.expect("Crawl failed");
    let elapsed = start.elapsed();

    assert_eq!(shows.len(), 3);
    assert!(
        elapsed >= delay * 3,
        "three serialized fetches finished in {:?}",
        elapsed
    );

    // With one worker, completion order is submission order
    let artists: Vec<_> = shows.iter().map(|s| s.artist.as_str()).collect();
    assert_eq!(artists, vec!["Band 0", "Band 1", "Band 2"]);
}

#[tokio::test]
async fn test_guess_from_link_for_bare_detail_page() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, 1, &["/concerts/42-the-band-at-the-hall"]).await;
    mount_listing_page(&mock_server, 2, &[]).await;

    Mock::given(method("GET"))
        .and(path("/concerts/42-the-band-at-the-hall"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 1);
    config.crawler.guess_from_link = true;

    let shows = crawl(config).await.expect("Crawl failed");
    assert_eq!(shows, vec![Show::new("the band", "the hall")]);
}

#[tokio::test]
async fn test_multiple_headliners_on_one_page() {
    let mock_server = MockServer::start().await;

    mount_listing_page(&mock_server, 1, &["/concerts/7-double-bill-at-hall"]).await;
    mount_listing_page(&mock_server, 2, &[]).await;

    Mock::given(method("GET"))
        .and(path("/concerts/7-double-bill-at-hall"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <a data-analytics-label="headliners">Band A</a>
            <a data-analytics-label="headliners">Band B</a>
            <span data-analytics-label="venue_name">The Hall</span>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let shows = crawl(create_test_config(&mock_server.uri(), 2))
        .await
        .expect("Crawl failed");

    assert_eq!(
        shows,
        vec![Show::new("Band A", "The Hall"), Show::new("Band B", "The Hall")]
    );
}
