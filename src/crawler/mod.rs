//! Crawler module for rendering and capturing site pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching for sitemaps and assets
//! - Page metadata and asset extraction from rendered HTML
//! - Header/footer navigation extraction
//! - Bounded-concurrency crawl orchestration

mod coordinator;
mod extractor;
mod fetcher;
mod navigation;
mod outcome;

pub use coordinator::{resolve_page_list, CrawlOrchestrator, CrawlResult, CRAWL_CONCURRENCY};
pub use extractor::{discover_assets, extract_page, INLINE_CONTENT_LIMIT};
pub use fetcher::{build_http_client, fetch_bytes, fetch_text};
pub use navigation::extract_navigation;
pub use outcome::{CapturedPage, CrawlStats, PageFailure, PageOutcome};
