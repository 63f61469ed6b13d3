//! Sitelift main entry point
//!
//! This is the command-line interface for the Sitelift crawler and asset
//! pipeline.

use anyhow::Context;
use clap::Parser;
use sitelift::config::{read_config, validate, Config};
use sitelift::crawler::{build_http_client, resolve_page_list, CrawlResult};
use sitelift::imaging::RustBackend;
use sitelift::output::{
    format_bytes, write_asset_guide, write_asset_manifest, write_crawl_report,
    write_site_structure, OutputLayout,
};
use sitelift::render::ChromiumRenderer;
use sitelift::url::parse_base_url;
use sitelift::{AssetPipeline, CrawlOrchestrator, SiteliftError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sitelift: capture a site and its assets
///
/// Sitelift renders every page of a site in headless Chromium, records
/// screenshots, HTML and structured page metadata, then downloads every
/// referenced asset and re-encodes images into responsive AVIF variants.
#[derive(Parser, Debug)]
#[command(name = "sitelift")]
#[command(version = "1.0.0")]
#[command(about = "Capture a site's pages and assets", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the site (overrides the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Page to crawl; repeat for several. Disables sitemap discovery
    #[arg(long = "page", value_name = "URL")]
    pages: Vec<String>,

    /// Upper bound on the number of pages crawled
    #[arg(long)]
    max_pages: Option<usize>,

    /// Output root directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of pages rendered at once
    #[arg(long)]
    crawl_concurrency: Option<usize>,

    /// Number of assets processed at once
    #[arg(long)]
    asset_concurrency: Option<usize>,

    /// Crawl only; skip asset download and optimization
    #[arg(long)]
    skip_assets: bool,

    /// Validate config and show the resolved page list without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let base = parse_base_url(&config.site.base_url)
        .with_context(|| format!("invalid base URL {}", config.site.base_url))?;
    let client =
        build_http_client(&config.crawler.user_agent).context("failed to build HTTP client")?;

    let pages = resolve_page_list(&config, &client).await?;

    if cli.dry_run {
        handle_dry_run(&config, &pages);
        return Ok(());
    }

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let layout = OutputLayout::from_config(&config.output);

    // Crawl phase
    let renderer = ChromiumRenderer::launch()
        .await
        .context("failed to launch headless Chromium")?;
    let orchestrator = CrawlOrchestrator::new(
        Arc::new(renderer),
        config.crawler.clone(),
        layout.clone(),
        base.clone(),
    )
    .with_cancellation(cancel.clone());

    let CrawlResult { site, stats } = orchestrator.crawl(pages).await?;
    drop(orchestrator);

    write_site_structure(&layout, &site)?;
    write_crawl_report(&layout, &site, &stats)?;

    // Asset phase
    if config.assets.skip_assets {
        tracing::info!("Skipping asset pipeline");
    } else if cancel.is_cancelled() {
        tracing::warn!("Run cancelled, asset pipeline not started");
    } else {
        let pipeline = AssetPipeline::new(
            client,
            Arc::new(RustBackend::new()),
            config.assets.clone(),
            layout.clone(),
            base.as_str(),
        )
        .with_cancellation(cancel.clone());

        let manifest = pipeline.process(site.assets()).await?;
        write_asset_manifest(&layout, &manifest)?;
        write_asset_guide(&layout, &manifest)?;

        tracing::info!(
            "Images: {} -> {} ({}% saved)",
            format_bytes(manifest.summary.original_size_bytes),
            format_bytes(manifest.summary.optimized_size_bytes),
            manifest.summary.savings_percent
        );
    }

    if stats.nothing_captured() {
        return Err(SiteliftError::NoPagesCaptured {
            attempted: stats.attempted,
        }
        .into());
    }

    tracing::info!(
        "Done: {} pages captured, output in {}",
        stats.captured,
        config.output.root.display()
    );

    Ok(())
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match (&cli.config, &cli.base_url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?
        }
        (None, Some(base_url)) => Config::for_site(base_url.clone()),
        (None, None) => anyhow::bail!("either a CONFIG file or --base-url is required"),
    };

    if let Some(base_url) = &cli.base_url {
        config.site.base_url = base_url.clone();
    }
    if !cli.pages.is_empty() {
        config.site.pages = cli.pages.clone();
    }
    if cli.max_pages.is_some() {
        config.site.max_pages = cli.max_pages;
    }
    if let Some(root) = &cli.output {
        config.output.root = root.clone();
    }
    if let Some(n) = cli.crawl_concurrency {
        config.crawler.concurrency = n;
    }
    if let Some(n) = cli.asset_concurrency {
        config.assets.concurrency = n;
    }
    if cli.skip_assets {
        config.assets.skip_assets = true;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitelift=info,warn"),
            1 => EnvFilter::new("sitelift=debug,info"),
            2 => EnvFilter::new("sitelift=trace,debug"),
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

/// Cancels the run on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight work and writing reports");
            cancel.cancel();
        }
    });
}

/// Handles the --dry-run mode: shows the effective config and page list
fn handle_dry_run(config: &Config, pages: &[String]) {
    println!("=== Sitelift Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    if let Some(max) = config.site.max_pages {
        println!("  Max pages: {}", max);
    }

    println!("\nCrawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  Settle delay: {}ms", config.crawler.settle_delay_ms);
    println!(
        "  Viewport: {}x{}",
        config.crawler.viewport_width, config.crawler.viewport_height
    );

    println!("\nAssets:");
    if config.assets.skip_assets {
        println!("  Skipped");
    } else {
        println!("  Concurrency: {}", config.assets.concurrency);
        println!("  Quality: {}", config.assets.quality);
    }

    println!("\nOutput:");
    println!("  Crawl data: {}", config.output.crawl_dir().display());
    println!("  Asset data: {}", config.output.asset_dir().display());

    println!("\nPages ({}):", pages.len());
    for page in pages {
        println!("  - {}", page);
    }
}
