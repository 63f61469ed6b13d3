use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default user agent presented by the rendering context
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Sitelift
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything but the base URL
    pub fn for_site(base_url: impl Into<String>) -> Self {
        Self {
            site: SiteConfig {
                base_url: base_url.into(),
                pages: Vec::new(),
                max_pages: None,
            },
            crawler: CrawlerConfig::default(),
            assets: AssetConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Target site configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL of the site; also the sitemap lookup root. May be left out
    /// of the file when supplied on the command line.
    #[serde(default)]
    pub base_url: String,

    /// Explicit page list. When non-empty, sitemap resolution is skipped.
    #[serde(default)]
    pub pages: Vec<String>,

    /// Upper bound on the number of sitemap-derived pages
    #[serde(default)]
    pub max_pages: Option<usize>,
}

/// Crawl pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of pages rendered at once
    pub concurrency: usize,

    /// Navigation timeout per page (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Fixed delay after navigation for client-rendered content (milliseconds)
    pub settle_delay_ms: u64,

    pub viewport_width: u32,
    pub viewport_height: u32,

    pub user_agent: String,
}

impl CrawlerConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::crawler::CRAWL_CONCURRENCY,
            navigation_timeout_ms: 30_000,
            settle_delay_ms: 2_000,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Asset pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AssetConfig {
    /// Maximum number of assets downloaded/processed at once
    pub concurrency: usize,

    /// Download timeout per asset (milliseconds)
    pub download_timeout_ms: u64,

    /// Lossy encoding quality for optimized images (1-100)
    pub quality: u8,

    /// Skip the asset phase entirely
    pub skip_assets: bool,
}

impl AssetConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            concurrency: crate::assets::ASSET_CONCURRENCY,
            download_timeout_ms: 30_000,
            quality: 80,
            skip_assets: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Root directory; `crawl-data/` and `asset-data/` are created beneath it
    pub root: PathBuf,
}

impl OutputConfig {
    pub fn crawl_dir(&self) -> PathBuf {
        self.root.join("crawl-data")
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.root.join("asset-data")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
        }
    }
}
