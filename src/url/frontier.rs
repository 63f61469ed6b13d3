use crate::url::normalize::{is_crawlable, normalize_url};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// The set of page URLs visited during one crawl run
///
/// Workers consult the frontier before rendering anything. The check and
/// the insert happen under one lock, so a URL submitted several times
/// concurrently is claimed by exactly one worker.
#[derive(Debug)]
pub struct Frontier {
    base: Url,
    visited: Mutex<HashSet<String>>,
}

impl Frontier {
    /// Creates an empty frontier for the given base URL
    pub fn new(base: Url) -> Self {
        Self {
            base,
            visited: Mutex::new(HashSet::new()),
        }
    }

    /// The base URL used to resolve relative inputs
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Normalizes a URL against this frontier's base
    pub fn normalize(&self, url: &str) -> String {
        normalize_url(url, &self.base)
    }

    /// Marks a URL as visited
    ///
    /// # Returns
    ///
    /// * `true` - This call was the first to mark the normalized URL
    /// * `false` - The URL was already visited, or is not a crawlable page
    pub fn mark_visited(&self, url: &str) -> bool {
        let normalized = self.normalize(url);
        if !is_crawlable(&normalized) {
            tracing::debug!("Not a crawlable page: {}", url);
            return false;
        }

        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        visited.insert(normalized)
    }

    /// Returns true if the URL has already been marked
    pub fn is_visited(&self, url: &str) -> bool {
        let normalized = self.normalize(url);
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalized)
    }

    /// Number of distinct URLs marked so far
    pub fn len(&self) -> usize {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
