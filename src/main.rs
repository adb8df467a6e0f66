//! Comment-Trawl main entry point
//!
//! This is the command-line interface for the Comment-Trawl collector.

use anyhow::Context;
use clap::Parser;
use comment_trawl::config::{load_config_with_hash, Config};
use comment_trawl::crawler::run_crawl;
use comment_trawl::output::{is_complete, load_statistics, print_statistics};
use comment_trawl::resources::{load_resources, Descriptor};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Comment-Trawl: a quota-aware threaded comment collector
///
/// Collects every comment thread of the videos in a CSV list, writing one
/// JSON-lines log per video. Quota spend is persisted after every request so
/// an interrupted run picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "comment-trawl")]
#[command(version)]
#[command(about = "A quota-aware threaded comment collector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without issuing requests
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show quota usage and log status from disk and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("comment_trawl=info,warn"),
            1 => EnvFilter::new("comment_trawl=debug,info"),
            2 => EnvFilter::new("comment_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Comment-Trawl Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Page size: {}", config.api.page_size);
    println!("  Order: {}", config.api.order.as_str());
    println!("  Text format: {}", config.api.text_format.as_str());

    println!("\nQuota:");
    println!("  Ceiling: {}", config.quota.ceiling);
    println!("  Margin: {}", config.quota.margin);
    println!("  Ledger: {}", config.ledger_path().display());

    println!("\nCrawler:");
    println!("  Backoff: {}ms", config.crawler.backoff_ms);
    println!(
        "  Network retries: {} (starting at {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms
    );
    println!("  Resume mode: {:?}", config.crawler.resume_mode);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    let descriptors = load_resources(Path::new(&config.crawler.resources))?;
    let mut to_crawl = 0;
    let mut already_done = 0;

    println!(
        "\nResources ({}) from {}:",
        descriptors.len(),
        config.crawler.resources
    );
    for descriptor in &descriptors {
        match descriptor {
            Descriptor::Valid(resource) => {
                if is_complete(config.output_dir(), &resource.id, config.crawler.resume_mode)? {
                    already_done += 1;
                    println!("  - {} (skip: already collected)", resource.id);
                } else {
                    to_crawl += 1;
                    println!(
                        "  * {} [{} / {} / {}]",
                        resource.id,
                        resource.metadata.period,
                        resource.metadata.channel_leaning,
                        resource.metadata.source
                    );
                }
            }
            Descriptor::Invalid { line, reason } => {
                println!("  ! line {}: {} (skip: malformed)", line, reason);
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} videos, skip {} already collected",
        to_crawl, already_done
    );

    Ok(())
}

/// Handles the --stats mode: shows ledger and log status
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Output: {}\n", config.output.directory);

    let stats = load_statistics(config)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl (resources: {}, output: {})",
        config.crawler.resources,
        config.output.directory
    );

    match run_crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl finished: {} requests issued, {} records written",
                report.calls_issued,
                report.records_written
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
