//! Thread-Tally main entry point
//!
//! This is the command-line interface for the Thread-Tally forum word counter.

use clap::Parser;
use std::path::{Path, PathBuf};
use thread_tally::config::{load_config_with_hash, Config};
use thread_tally::crawler::{crawl, Coordinator};
use thread_tally::output::{count_words, print_crawl_summary, write_word_counts_csv};
use thread_tally::CancelFlag;
use tracing_subscriber::EnvFilter;

/// Thread-Tally: forum search crawler and word counter
///
/// Thread-Tally walks every page of a forum search, reads the opening message
/// of each discussion it finds and writes a word frequency table as CSV.
#[derive(Parser, Debug)]
#[command(name = "thread-tally")]
#[command(version)]
#[command(about = "Count the words of every discussion a forum search returns", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the CSV here instead of the configured path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Stop after this many listing pages (overrides the config, 0 = no limit)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Number of top words to list in the summary
    #[arg(long, default_value_t = 20)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.top).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("thread_tally=info,warn"),
            1 => EnvFilter::new("thread_tally=debug,info"),
            2 => EnvFilter::new("thread_tally=trace,debug"),
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
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Thread-Tally Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    match config.crawler.page_limit() {
        Some(limit) => println!("  Page limit: {}", limit),
        None => println!("  Page limit: none"),
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSearch:");
    println!("  Origin: {}", config.search.base_url);
    println!("  Query: {}", config.search.query);
    let coordinator = Coordinator::from_config(config, CancelFlag::new())?;
    let first_page = coordinator.listing_request(1);
    println!("  First listing request: {}", first_page.target());
    for (name, value) in first_page.query() {
        println!("    {} = {}", name, value);
    }

    println!("\nSelectors:");
    println!("  Discussion links: {}", config.selectors.child_link);
    println!("  Body container: {}", config.selectors.body_container);
    println!("  Body paragraphs: {}", config.selectors.body_paragraph);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, top: usize) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancelFlag::new();

    // First Ctrl-C lets in-flight requests drain and keeps the partial result
    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight requests");
            signal_flag.cancel();
        }
    });

    tracing::info!(
        "Searching {} for \"{}\"",
        config.search.base_url,
        config.search.query
    );

    let report = match crawl(&config, cancel).await {
        Ok(report) => {
            tracing::info!(
                "Crawl finished ({}): {} listing pages, {} discussions, {} skipped in {:?}",
                report.stop_reason,
                report.stats.listing_pages,
                report.stats.detail_pages,
                report.stats.detail_skipped,
                report.stats.elapsed
            );
            report
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let counts = count_words(&report.bodies);
    let csv_path = Path::new(&config.output.csv_path);
    write_word_counts_csv(&counts, csv_path)?;
    tracing::info!(
        "Wrote {} words to {}",
        counts.len(),
        csv_path.display()
    );

    print_crawl_summary(&report, &counts, top);

    Ok(())
}
