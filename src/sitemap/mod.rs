//! Sitemap resolution
//!
//! Discovers the page list for a crawl from the site's XML sitemap. Each
//! well-known location is tried in order; the first one that yields at least
//! one page wins. When none do, the crawl falls back to the base URL alone.

mod parser;

pub use parser::{parse_sitemap, ParsedSitemap};

use crate::crawler::fetch_text;
use crate::url::base_root;
use crate::SiteliftError;
use reqwest::Client;
use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Per-attempt timeout for sitemap requests
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths tried under the base URL, in order
pub const SITEMAP_PATHS: &[&str] = &["sitemap.xml", "sitemap_index.xml", "sitemap"];

/// Tries each candidate in order and returns the first success
///
/// Failures are logged at debug level and the next candidate is tried.
/// Returns None once the candidates are exhausted.
pub async fn first_success<C, T, E, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Option<T>
where
    C: Display,
    E: Display,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    for candidate in candidates {
        let label = candidate.to_string();
        match attempt(candidate).await {
            Ok(value) => return Some(value),
            Err(e) => tracing::debug!("Candidate {} failed: {}", label, e),
        }
    }
    None
}

/// Resolves a page list from a site's sitemap
pub struct SitemapResolver {
    client: Client,
    timeout: Duration,
}

impl SitemapResolver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: SITEMAP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The sitemap URLs tried for a base URL, in order
    pub fn candidates(base: &Url) -> Vec<String> {
        let root = base_root(base);
        SITEMAP_PATHS
            .iter()
            .map(|path| format!("{}/{}", root, path))
            .collect()
    }

    /// Resolves the page list for `base`
    ///
    /// Never fails: when no candidate yields pages, the result is `[base]`.
    pub async fn resolve(&self, base: &Url) -> Vec<String> {
        let found = first_success(Self::candidates(base), |candidate| async move {
            self.fetch_pages(&candidate).await
        })
        .await;

        match found {
            Some(pages) => {
                tracing::info!("Sitemap resolved {} pages", pages.len());
                pages
            }
            None => {
                tracing::warn!("No usable sitemap found, crawling {} only", base);
                vec![base.to_string()]
            }
        }
    }

    /// Fetches one candidate and returns its page URLs
    ///
    /// A sitemap index is followed one level deep. An empty result is an
    /// error so that the next candidate is tried.
    async fn fetch_pages(&self, sitemap_url: &str) -> Result<Vec<String>, SiteliftError> {
        let body = fetch_text(&self.client, sitemap_url, self.timeout).await?;
        let parsed = parse_sitemap(&body).map_err(|e| sitemap_error(sitemap_url, e))?;

        let mut pages = parsed.urls;
        for child in &parsed.sitemaps {
            match self.fetch_child(child).await {
                Ok(urls) => pages.extend(urls),
                Err(e) => tracing::warn!("Skipping child sitemap {}: {}", child, e),
            }
        }

        let pages = dedup_preserving_order(pages);
        if pages.is_empty() {
            return Err(sitemap_error(sitemap_url, "no <url><loc> entries"));
        }

        tracing::debug!("{} yielded {} pages", sitemap_url, pages.len());
        Ok(pages)
    }

    async fn fetch_child(&self, sitemap_url: &str) -> Result<Vec<String>, SiteliftError> {
        let body = fetch_text(&self.client, sitemap_url, self.timeout).await?;
        let parsed = parse_sitemap(&body).map_err(|e| sitemap_error(sitemap_url, e))?;
        Ok(parsed.urls)
    }
}

fn sitemap_error(url: &str, reason: impl Display) -> SiteliftError {
    SiteliftError::Sitemap {
        url: url.to_string(),
        message: reason.to_string(),
    }
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
