//! canopy-crawl main entry point
//!
//! This is the command-line interface for the canopy-crawl site crawler.

use anyhow::Context;
use canopy_crawl::config::{load_config_with_hash, Config};
use canopy_crawl::crawler::run_crawl;
use canopy_crawl::policy::{evaluate, FilterVerdict, Policy};
use canopy_crawl::url::frontier_key;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// canopy-crawl: a bounded site crawler
///
/// canopy-crawl starts from seed URLs, follows only links inside the allowed
/// domains, and records the title, description, keywords and out-links of
/// every page it fetches, along with a per-page metrics log.
#[derive(Parser, Debug)]
#[command(name = "canopy-crawl")]
#[command(version)]
#[command(about = "A bounded site crawler", long_about = None)]
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
    #[arg(long, conflicts_with_all = ["stats", "check_url"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "check_url"])]
    stats: bool,

    /// Report whether the link filter would follow URL, then exit
    #[arg(long, value_name = "URL", conflicts_with_all = ["dry_run", "stats"])]
    check_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if let Some(url) = cli.check_url {
        handle_check_url(&config, &url)
    } else {
        handle_crawl(config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("canopy_crawl=info,warn"),
            1 => EnvFilter::new("canopy_crawl=debug,info"),
            2 => EnvFilter::new("canopy_crawl=trace,debug"),
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
    println!("=== canopy-crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    println!("  Keyword limit: {}", config.crawler.keyword_limit);
    if config.crawler.max_pages == 0 {
        println!("  Max pages: unlimited");
    } else {
        println!("  Max pages: {}", config.crawler.max_pages);
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Retries: {} ({}ms apart)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    println!("  Respect robots.txt: {}", config.crawler.respect_robots);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Pages: {}", config.output.pages_path);
    println!("  Metrics: {}", config.output.metrics_path);
    if let Some(database) = &config.output.database_path {
        println!("  Database: {}", database);
    }

    println!(
        "\nAllowed Domains ({}):",
        config.policy.allowed_domains.len()
    );
    for domain in &config.policy.allowed_domains {
        println!("  - {}", domain);
    }

    println!("\nDeny Patterns ({}):", config.policy.deny_patterns.len());
    for pattern in &config.policy.deny_patterns {
        println!("  - /{}/", pattern);
    }
    for substring in &config.policy.deny_substrings {
        println!("  - \"{}\"", substring);
    }
    println!(
        "\nDenied Extensions: {}",
        config.policy.deny_extensions.join(", ")
    );

    // Seeds bypass the filter; the verdict applies to links pointing at them
    let policy = Policy::from_config(&config.policy)?;
    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        let key = frontier_key(seed);
        println!("  * {} ({})", key, describe_verdict(&evaluate(&key, &policy)));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use canopy_crawl::output::{load_statistics, print_statistics};
    use canopy_crawl::storage::open_storage;
    use std::path::Path;

    let database = config
        .output
        .database_path
        .as_deref()
        .context("No database-path configured; statistics need a database")?;

    println!("Database: {}\n", database);

    let storage = open_storage(Path::new(database))
        .with_context(|| format!("Failed to open database {}", database))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --check-url mode: explains the link filter's verdict
fn handle_check_url(config: &Config, url: &str) -> anyhow::Result<()> {
    let policy = Policy::from_config(&config.policy)?;
    let key = frontier_key(url);

    println!("{}: {}", key, describe_verdict(&evaluate(&key, &policy)));

    Ok(())
}

fn describe_verdict(verdict: &FilterVerdict) -> String {
    match verdict {
        FilterVerdict::Allowed => "allowed".to_string(),
        FilterVerdict::Unparseable => "rejected: not an absolute URL".to_string(),
        FilterVerdict::OutOfDomain => "rejected: outside allowed domains".to_string(),
        FilterVerdict::DeniedByPattern { index } => {
            format!("rejected: deny pattern #{}", index + 1)
        }
        FilterVerdict::DeniedByExtension { extension } => {
            format!("rejected: .{} files are denied", extension)
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Seeds: {}, allowed domains: {}",
        config.crawler.seeds.len(),
        config.policy.allowed_domains.len()
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing in-flight fetches");
            on_signal.cancel();
        }
    });

    match run_crawl(&config, config_hash, cancel).await {
        Ok(report) => {
            tracing::info!(
                "Crawl finished ({}): {} pages, {} failures, {} admissible URLs never crawled",
                report.status.to_db_string(),
                report.pages_crawled,
                report.fetch_failures,
                report.frontier.remaining
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
