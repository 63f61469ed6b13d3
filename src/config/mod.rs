//! Configuration module for Sitelift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitelift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitelift.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.site.base_url, config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{AssetConfig, Config, CrawlerConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config, read_config};
pub use validation::validate;
