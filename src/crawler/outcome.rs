//! Per-page worker outcomes and run statistics

use crate::state::{AssetSets, PageMetadata};
use std::time::Duration;

/// Everything a successful worker hands back to the orchestrator
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub metadata: PageMetadata,
    pub assets: AssetSets,
    /// Final rendered HTML, kept for navigation extraction
    pub html: String,
}

/// Result of one crawl worker
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Captured(Box<CapturedPage>),
    /// Already visited, or not a crawlable page
    Skipped { url: String },
    Failed { url: String, error: String },
    /// The run was cancelled before or while this page was processed
    Cancelled { url: String },
}

/// A page that could not be captured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub error: String,
}

/// Counters for one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Entries in the resolved page list
    pub attempted: usize,
    pub captured: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub duration: Duration,
    pub failures: Vec<PageFailure>,
}

impl CrawlStats {
    pub fn new(attempted: usize) -> Self {
        Self {
            attempted,
            ..Default::default()
        }
    }

    /// Folds one outcome's counters into the totals
    pub fn record(&mut self, outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Captured(_) => self.captured += 1,
            PageOutcome::Skipped { .. } => self.skipped += 1,
            PageOutcome::Failed { url, error } => {
                self.failed += 1;
                self.failures.push(PageFailure {
                    url: url.clone(),
                    error: error.clone(),
                });
            }
            PageOutcome::Cancelled { .. } => self.cancelled += 1,
        }
    }

    /// True when pages were requested and none were captured
    pub fn nothing_captured(&self) -> bool {
        self.attempted > 0 && self.captured == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.captured as f64 / self.attempted as f64) * 100.0
        }
    }
}
