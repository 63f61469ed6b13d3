//! Crawl orchestrator - bounded-concurrency page capture
//!
//! This module drives the crawl phase:
//! - Resolving the page list (explicit list or sitemap)
//! - Running one worker per page behind a counting semaphore
//! - Capturing screenshots and HTML through an isolated render context
//! - Folding worker outcomes into the `SiteStructure`
//! - Extracting navigation once from the homepage

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::{discover_assets, extract_page};
use crate::crawler::navigation::extract_navigation;
use crate::crawler::outcome::{CapturedPage, CrawlStats, PageOutcome};
use crate::output::{write_file, OutputLayout};
use crate::render::{ContextOptions, RenderContext, Renderer};
use crate::sitemap::SitemapResolver;
use crate::state::SiteStructure;
use crate::url::{assign_slugs, normalize_url, slug_for, Frontier};
use crate::SiteliftError;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default number of pages rendered at once
pub const CRAWL_CONCURRENCY: usize = 3;

/// Result of one crawl run
#[derive(Debug)]
pub struct CrawlResult {
    pub site: SiteStructure,
    pub stats: CrawlStats,
}

/// Resolves the list of pages to crawl
///
/// An explicit page list from the config wins and is resolved against the
/// base URL, keeping each entry's own form (a trailing slash survives);
/// otherwise the sitemap resolver is consulted. Duplicates by normalized
/// URL are dropped (first occurrence kept) and `max-pages` truncates the
/// result.
pub async fn resolve_page_list(config: &Config, client: &Client) -> Result<Vec<String>, SiteliftError> {
    let base = crate::url::parse_base_url(&config.site.base_url)?;

    let pages = if config.site.pages.is_empty() {
        SitemapResolver::new(client.clone()).resolve(&base).await
    } else {
        tracing::info!(
            "Using {} pages from configuration, sitemap skipped",
            config.site.pages.len()
        );
        config
            .site
            .pages
            .iter()
            .map(|p| match base.join(p.trim()) {
                Ok(mut url) => {
                    url.set_fragment(None);
                    url.to_string()
                }
                Err(_) => p.clone(),
            })
            .collect()
    };

    let mut seen = HashSet::new();
    let mut pages: Vec<String> = pages
        .into_iter()
        .filter(|p| seen.insert(normalize_url(p, &base)))
        .collect();

    if let Some(max) = config.site.max_pages {
        if pages.len() > max {
            tracing::info!("Limiting page list from {} to {} pages", pages.len(), max);
            pages.truncate(max);
        }
    }

    Ok(pages)
}

/// Everything a worker needs, shared by reference count
struct WorkerContext {
    renderer: Arc<dyn Renderer>,
    frontier: Arc<Frontier>,
    layout: OutputLayout,
    /// Normalized URL to its unique file slug
    slugs: HashMap<String, String>,
    options: ContextOptions,
    config: CrawlerConfig,
    base: Url,
    cancel: CancellationToken,
}

/// Main crawl orchestrator
pub struct CrawlOrchestrator {
    renderer: Arc<dyn Renderer>,
    config: CrawlerConfig,
    layout: OutputLayout,
    base: Url,
    cancel: CancellationToken,
}

impl CrawlOrchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `renderer` - The browser engine used for every page
    /// * `config` - Crawler settings (concurrency, timeouts, viewport)
    /// * `layout` - Where screenshots and HTML are written
    /// * `base` - The site base URL
    pub fn new(
        renderer: Arc<dyn Renderer>,
        config: CrawlerConfig,
        layout: OutputLayout,
        base: Url,
    ) -> Self {
        Self {
            renderer,
            config,
            layout,
            base,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls every page in `page_list`
    ///
    /// Per-page failures are logged and recorded in the stats; they never
    /// fail the run. Only a failure to create the crawl directories is
    /// returned as an error.
    pub async fn crawl(&self, page_list: Vec<String>) -> Result<CrawlResult, SiteliftError> {
        self.layout.create_crawl_dirs()?;

        let start = Instant::now();
        let mut site = SiteStructure::new(self.base.clone(), page_list.clone());
        let mut stats = CrawlStats::new(page_list.len());

        let concurrency = self.config.concurrency.max(1);
        tracing::info!(
            "Crawling {} pages with concurrency {}",
            page_list.len(),
            concurrency
        );

        let frontier = Frontier::new(self.base.clone());
        let normalized: Vec<String> = page_list.iter().map(|p| frontier.normalize(p)).collect();
        let slugs = assign_slugs(normalized.iter().map(String::as_str));

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let worker = Arc::new(WorkerContext {
            renderer: Arc::clone(&self.renderer),
            frontier: Arc::new(frontier),
            layout: self.layout.clone(),
            slugs,
            options: ContextOptions::from_config(&self.config),
            config: self.config.clone(),
            base: self.base.clone(),
            cancel: self.cancel.clone(),
        });

        let mut tasks = JoinSet::new();
        for url in page_list {
            let semaphore = Arc::clone(&semaphore);
            let worker = Arc::clone(&worker);
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = worker.cancel.cancelled() => return PageOutcome::Cancelled { url },
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return PageOutcome::Cancelled { url },
                    },
                };
                worker.run(url).await
            });
        }

        let home = normalize_url(self.base.as_str(), &self.base);
        let mut home_html = None;

        while let Some(joined) = tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Crawl worker panicked: {}", e);
                    continue;
                }
            };
            stats.record(&outcome);

            match outcome {
                PageOutcome::Captured(page) => {
                    let CapturedPage {
                        metadata,
                        assets,
                        html,
                    } = *page;
                    if metadata.url == home && home_html.is_none() {
                        home_html = Some(html);
                    }
                    tracing::info!(
                        "Captured {} ({}/{})",
                        metadata.url,
                        stats.captured,
                        stats.attempted
                    );
                    site.add_assets(assets);
                    if !site.insert_page(metadata) {
                        tracing::debug!("Page already recorded, keeping first capture");
                    }
                }
                PageOutcome::Skipped { url } => tracing::debug!("Skipped {}", url),
                PageOutcome::Failed { url, error } => {
                    tracing::warn!("Failed to capture {}: {}", url, error)
                }
                PageOutcome::Cancelled { url } => tracing::debug!("Cancelled before {}", url),
            }
        }

        match home_html {
            Some(html) => {
                let navigation = extract_navigation(&html, &self.base);
                tracing::info!(
                    "Extracted navigation: {} header items, {} footer items",
                    navigation.header.len(),
                    navigation.footer.len()
                );
                site.set_navigation(navigation);
            }
            None => tracing::warn!("Homepage was not captured, navigation left empty"),
        }

        stats.duration = start.elapsed();
        if self.cancel.is_cancelled() {
            tracing::warn!(
                "Crawl cancelled: {} pages captured, {} not started",
                stats.captured,
                stats.cancelled
            );
        }
        tracing::info!(
            "Crawl completed: {} captured, {} failed, {} skipped in {:?}",
            stats.captured,
            stats.failed,
            stats.skipped,
            stats.duration
        );

        Ok(CrawlResult { site, stats })
    }
}

impl WorkerContext {
    /// Processes one page and reports what happened
    async fn run(&self, url: String) -> PageOutcome {
        if self.cancel.is_cancelled() {
            return PageOutcome::Cancelled { url };
        }

        let normalized = self.frontier.normalize(&url);
        if !self.frontier.mark_visited(&normalized) {
            return PageOutcome::Skipped { url: normalized };
        }

        // Navigate to the URL as given; the normalized form is only a key
        let target = match self.base.join(url.trim()) {
            Ok(mut u) => {
                u.set_fragment(None);
                u
            }
            Err(e) => {
                return PageOutcome::Failed {
                    url: normalized,
                    error: e.to_string(),
                }
            }
        };

        let mut context = match self.renderer.new_context(&self.options).await {
            Ok(context) => context,
            Err(e) => {
                return PageOutcome::Failed {
                    url: normalized,
                    error: e.to_string(),
                }
            }
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(SiteliftError::Cancelled),
            result = self.capture(context.as_mut(), &target, &normalized) => result,
        };

        if let Err(e) = context.close().await {
            tracing::debug!("Failed to close render context for {}: {}", normalized, e);
        }

        match result {
            Ok(page) => PageOutcome::Captured(Box::new(page)),
            Err(SiteliftError::Cancelled) => PageOutcome::Cancelled { url: normalized },
            Err(e) => PageOutcome::Failed {
                url: normalized,
                error: e.to_string(),
            },
        }
    }

    fn slug(&self, key: &str) -> String {
        self.slugs
            .get(key)
            .cloned()
            .unwrap_or_else(|| slug_for(key))
    }

    /// Navigates, settles, captures artifacts and extracts metadata
    ///
    /// `page_url` is what the browser loads; `key` is the normalized URL
    /// recorded in the page map and used for the file slug.
    async fn capture(
        &self,
        context: &mut dyn RenderContext,
        page_url: &Url,
        key: &str,
    ) -> Result<CapturedPage, SiteliftError> {
        tracing::debug!("Rendering {}", page_url);
        context
            .navigate(page_url.as_str(), self.config.navigation_timeout())
            .await?;
        tokio::time::sleep(self.config.settle_delay()).await;

        let html = context.html().await?;
        let screenshot = context.screenshot().await?;

        let slug = self.slug(key);
        write_file(&self.layout.screenshot_path(&slug), &screenshot).await?;
        write_file(&self.layout.html_path(&slug), html.as_bytes()).await?;

        let mut metadata = extract_page(&html, page_url, &self.base);
        metadata.url = key.to_string();
        let assets = discover_assets(&html, page_url);
        tracing::trace!(
            "{}: {} links, {} images, {} assets",
            page_url,
            metadata.links.len(),
            metadata.images.len(),
            assets.len()
        );

        Ok(CapturedPage {
            metadata,
            assets,
            html,
        })
    }
}
