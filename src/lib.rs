//! Sitelift: a site crawler and asset pipeline
//!
//! This crate renders a known (or sitemap-derived) set of pages with a
//! headless browser, extracts structured page metadata, and then downloads
//! and re-encodes every discovered asset into optimized, responsive forms.

pub mod assets;
pub mod config;
pub mod crawler;
pub mod imaging;
pub mod output;
pub mod render;
pub mod sitemap;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitelift operations
#[derive(Debug, Error)]
pub enum SiteliftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Sitemap error for {url}: {message}")]
    Sitemap { url: String, message: String },

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Image processing error: {0}")]
    Image(#[from] imaging::BackendError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::AssetStatus,
        to: state::AssetStatus,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Run cancelled")]
    Cancelled,

    #[error("No pages were captured out of {attempted} attempted")]
    NoPagesCaptured { attempted: usize },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sitelift operations
pub type Result<T> = std::result::Result<T, SiteliftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use assets::{AssetPipeline, ASSET_CONCURRENCY};
pub use config::Config;
pub use crawler::{CrawlOrchestrator, CRAWL_CONCURRENCY};
pub use state::{AssetManifest, AssetStatus, PageMetadata, SiteStructure};
pub use url::{normalize_url, Frontier};
