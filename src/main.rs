//! SiteWarden main entry point
//!
//! This is the command-line interface for the SiteWarden crawler and auditor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitewarden::audit::{Auditor, PageSpeedEngine};
use sitewarden::batch::{run_batch, BatchOptions, ProspectTable};
use sitewarden::browser::{BrowserService, HttpBrowser};
use sitewarden::config::{load_config_with_hash, Config};
use sitewarden::crawler::Crawler;
use sitewarden::output::{
    generate_markdown_summary, generate_summary, load_statistics, print_statistics,
};
use sitewarden::state::CrawlStatus;
use sitewarden::storage::{FsBlobStorage, SqliteStorage, Storage};
use sitewarden::url::{normalize_url, skip_reason};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// SiteWarden: crawls prospect sites and audits their compliance
///
/// SiteWarden crawls one site breadth-first and classifies its pages, and
/// audits URLs for accessibility, privacy, performance and technology to
/// compute an outreach priority.
#[derive(Parser, Debug)]
#[command(name = "sitewarden")]
#[command(version)]
#[command(about = "Site crawler and compliance auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "sitewarden.toml", global = true)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and classify its pages
    Crawl {
        /// Seed URL of the site
        url: String,
    },

    /// Audit a single URL and print the record as JSON
    Audit {
        url: String,

        /// Population served by the prospect, used for priority
        #[arg(long)]
        population: Option<u64>,
    },

    /// Audit the prospects of a CSV table, checkpointing after each group
    Batch {
        /// Prospect table (CSV)
        table: PathBuf,

        /// Audits run together per group
        #[arg(long)]
        concurrency: Option<usize>,

        /// Re-audit rows that already have a completed audit
        #[arg(long)]
        all: bool,

        /// Only audit rows with these priorities (comma separated)
        #[arg(long, value_delimiter = ',')]
        priority: Vec<u8>,
    },

    /// Show statistics of a crawl job from the database
    Stats {
        /// Job id (defaults to the latest job)
        #[arg(long)]
        job: Option<i64>,
    },

    /// Generate the markdown summary of a crawl job
    ExportSummary {
        /// Job id (defaults to the latest job)
        #[arg(long)]
        job: Option<i64>,
    },

    /// Validate config and show what would be crawled without crawling
    DryRun {
        /// Seed URL to check against the skip rules
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl { url } => handle_crawl(config, config_hash, &url).await?,
        Command::Audit { url, population } => handle_audit(config, &url, population).await?,
        Command::Batch {
            table,
            concurrency,
            all,
            priority,
        } => {
            let mut options = BatchOptions::from(config.batch.clone());
            if let Some(concurrency) = concurrency {
                options.concurrency = concurrency;
            }
            if all {
                options.skip_audited = false;
            }
            if !priority.is_empty() {
                options.priority_filter = priority;
            }
            handle_batch(config, &table, options).await?
        }
        Command::Stats { job } => handle_stats(&config, job)?,
        Command::ExportSummary { job } => handle_export_summary(&config, job)?,
        Command::DryRun { url } => handle_dry_run(&config, url.as_deref())?,
    }

    Ok(())
}

/// Sets up logging based on verbosity flags
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitewarden=info,warn"),
            1 => EnvFilter::new("sitewarden=debug,info"),
            2 => EnvFilter::new("sitewarden=trace,debug"),
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

fn browser_service(config: &Config) -> Arc<BrowserService> {
    let engine = Arc::new(HttpBrowser::new(&config.user_agent));
    Arc::new(BrowserService::new(engine))
}

fn build_auditor(config: &Config, browser: Arc<BrowserService>) -> anyhow::Result<Auditor> {
    let performance = PageSpeedEngine::new(&config.audit)
        .context("failed to set up the performance engine")?;
    Ok(
        Auditor::new(browser, Arc::new(performance), config.audit.clone())
            .with_reports_dir(&config.output.reports_dir),
    )
}

/// Handles the crawl command
async fn handle_crawl(
    config: Config,
    config_hash: String,
    url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} (max depth {}, max pages {})",
        url,
        config.crawler.max_depth,
        config.crawler.max_pages
    );

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let storage = Arc::new(Mutex::new(storage));
    let blobs = FsBlobStorage::new(&config.output.screenshots_dir)?;

    let crawler = Crawler::new(
        config.crawler.clone(),
        &config.user_agent.crawler_name,
        browser_service(&config),
    )
    .with_storage(storage.clone())
    .with_blob_storage(Arc::new(blobs))
    .with_config_hash(config_hash);

    let outcome = crawler.crawl(url).await?;

    if let Some(job_id) = outcome.job.id {
        let storage = storage
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        let summary = generate_summary(&*storage, Some(job_id))?;
        generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;
        println!("✓ Summary written to: {}", config.output.summary_path);
    }

    println!(
        "Crawl {}: {} pages, {} errors",
        outcome.job.status,
        outcome.pages.len(),
        outcome.errors.len()
    );
    for page in outcome.selected_pages() {
        println!("  [{}] {}", page.category, page.url);
    }

    if outcome.job.status == CrawlStatus::Failed {
        let message = outcome.job.error.unwrap_or_default();
        tracing::error!("Crawl failed: {}", message);
        return Err(format!("crawl failed: {}", message).into());
    }

    Ok(())
}

/// Handles the audit command
async fn handle_audit(
    config: Config,
    url: &str,
    population: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    use sitewarden::audit::SiteAuditor;

    let browser = browser_service(&config);
    let auditor = build_auditor(&config, browser.clone())?;

    let result = auditor.audit_prospect(url, population).await;
    browser.close().await?;

    let record = result?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    if let Some(path) = &record.report_path {
        tracing::info!("Report written to {}", path);
    }

    Ok(())
}

/// Handles the batch command
async fn handle_batch(
    config: Config,
    table_path: &Path,
    options: BatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut table = ProspectTable::load_csv(table_path)
        .with_context(|| format!("failed to load prospect table {}", table_path.display()))?;

    let browser = browser_service(&config);
    let auditor = build_auditor(&config, browser.clone())?;

    let result = run_batch(&mut table, &auditor, &options).await;
    browser.close().await?;
    let summary = result?;

    println!(
        "Batch finished: {} audited, {} failed, {} checkpoints",
        summary.audited, summary.failed, summary.flushes
    );
    Ok(())
}

/// Handles the stats command: shows statistics from the database
fn handle_stats(config: &Config, job_id: Option<i64>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    let job_id = match job_id {
        Some(id) => id,
        None => match storage.get_latest_job()? {
            Some(job) => job.id,
            None => {
                println!("No crawl jobs recorded yet");
                return Ok(());
            }
        },
    };

    let stats = load_statistics(&storage, job_id)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the export-summary command: generates markdown summary
fn handle_export_summary(
    config: &Config,
    job_id: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage, job_id)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the dry-run command: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, url: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SiteWarden Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Delay: {}ms", config.crawler.delay_ms);
    println!("  Page timeout: {}ms", config.crawler.page_timeout_ms);
    println!("  Respect robots.txt: {}", config.crawler.respect_robots_txt);
    println!("  Screenshots: {}", config.crawler.take_screenshots);
    println!("  Include paths: {:?}", config.crawler.include_paths);
    println!("  Exclude paths: {:?}", config.crawler.exclude_paths);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nAudit:");
    println!("  Total criteria: {}", config.audit.total_criteria);
    println!("  Rule tags: {:?}", config.audit.rule_tags);
    println!("  Performance strategy: {}", config.audit.strategy);

    println!("\nBatch:");
    println!("  Concurrency: {}", config.batch.concurrency);
    println!("  Skip audited: {}", config.batch.skip_audited);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  Reports: {}", config.output.reports_dir);
    println!("  Screenshots: {}", config.output.screenshots_dir);

    println!("\n✓ Configuration is valid");

    if let Some(url) = url {
        let seed = normalize_url(url)?;
        match skip_reason(
            &seed,
            &config.crawler.include_paths,
            &config.crawler.exclude_paths,
        ) {
            Some(reason) => println!("✗ Seed {} would be skipped: {}", seed, reason),
            None => println!("✓ Would start crawling at {}", seed),
        }
    }

    Ok(())
}
