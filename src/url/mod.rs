//! URL handling module for Sitelift
//!
//! This module provides URL normalization, slug derivation, host comparison,
//! and the visited-URL frontier used for crawl deduplication.

mod frontier;
mod normalize;
mod slug;

// Re-export main functions
pub use frontier::Frontier;
pub use normalize::{is_crawlable, is_same_host, normalize_url, resolve_href};
pub use slug::{assign_slugs, slug_for};

use crate::UrlError;
use url::Url;

/// Parses and validates a site base URL
///
/// The base must be http(s) and carry a host; relative page URLs and
/// sitemap candidates are resolved against it.
pub fn parse_base_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns the base URL as a string without its trailing slash
///
/// Used to build `{base}/sitemap.xml` style candidates.
pub fn base_root(base: &Url) -> String {
    base.as_str().trim_end_matches('/').to_string()
}
