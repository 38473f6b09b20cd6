//! Show-Scout main entry point
//!
//! Command-line wrapper around the crawler: load a config, crawl, print shows.

use clap::Parser;
use show_scout::config::{load_config_with_hash, Config};
use show_scout::crawler::Crawler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Show-Scout: upcoming concerts in a metro area
///
/// Walks the metro-area event listing for the configured date window and
/// prints every headliner with its venue.
#[derive(Parser, Debug)]
#[command(name = "show-scout")]
#[command(version)]
#[command(about = "Crawl upcoming concerts in a metro area", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Print crawl statistics after the shows
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration given, using defaults");
            Config::default()
        }
    };

    let crawler = Crawler::new(config)?;

    if cli.dry_run {
        handle_dry_run(&crawler)?;
    } else {
        handle_crawl(&crawler, cli.stats).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("show_scout=info,warn"),
            1 => EnvFilter::new("show_scout=debug,info"),
            2 => EnvFilter::new("show_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(crawler: &Crawler) -> Result<(), Box<dyn std::error::Error>> {
    let config = crawler.config();
    let window = crawler.window(chrono::Local::now().date_naive())?;

    println!("=== Show-Scout Dry Run ===\n");

    println!("Listing:");
    println!("  URL: {}", config.site.listing_url());
    println!("  Window: {}", window);
    for (name, value) in window.query_params(&config.window.date_format)? {
        println!("  {} = {}", name, value);
    }

    println!("\nCrawler:");
    println!("  Workers: {}", config.crawler.workers);
    match config.crawler.result_limit {
        Some(limit) => println!("  Result limit: {}", limit),
        None => println!("  Result limit: none"),
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Failure policy: {:?}", config.crawler.failure_policy);
    println!("  Guess from link: {}", config.crawler.guess_from_link);

    println!("\nUser agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(crawler: &Crawler, print_stats: bool) -> Result<(), Box<dyn std::error::Error>> {
    match crawler.run_with_stats().await {
        Ok((shows, stats)) => {
            for show in &shows {
                println!("{}", show);
            }
            if print_stats {
                println!("\n{}", stats);
            }
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
