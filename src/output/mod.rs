//! Output module for persisted crawl and asset artifacts
//!
//! This module handles:
//! - The on-disk layout under the output root
//! - Writing `site-structure.json` and `asset-manifest.json`
//! - Generating the markdown crawl report and asset guide

mod markdown;

pub use markdown::{format_asset_guide, format_crawl_report, format_bytes};

use crate::config::OutputConfig;
use crate::crawler::CrawlStats;
use crate::state::{AssetKind, AssetManifest, SiteStructure};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITE_STRUCTURE_FILE: &str = "site-structure.json";
pub const ASSET_MANIFEST_FILE: &str = "asset-manifest.json";
pub const CRAWL_REPORT_FILE: &str = "CRAWL_REPORT.md";
pub const ASSET_GUIDE_FILE: &str = "ASSET_GUIDE.md";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Paths of every directory and file the run writes
///
/// ```text
/// <root>/crawl-data/{screenshots,html}/
/// <root>/asset-data/images/{original,optimized,responsive}/
/// <root>/asset-data/{fonts,videos,documents}/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    crawl_dir: PathBuf,
    asset_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            crawl_dir: root.join("crawl-data"),
            asset_dir: root.join("asset-data"),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            crawl_dir: config.crawl_dir(),
            asset_dir: config.asset_dir(),
        }
    }

    pub fn crawl_dir(&self) -> &Path {
        &self.crawl_dir
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.crawl_dir.join("screenshots")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.crawl_dir.join("html")
    }

    pub fn screenshot_path(&self, slug: &str) -> PathBuf {
        self.screenshots_dir().join(format!("{}.png", slug))
    }

    pub fn html_path(&self, slug: &str) -> PathBuf {
        self.html_dir().join(format!("{}.html", slug))
    }

    /// Directory holding downloaded files of one category
    pub fn kind_dir(&self, kind: AssetKind) -> PathBuf {
        self.asset_dir.join(kind.dir_name())
    }

    pub fn originals_dir(&self) -> PathBuf {
        self.kind_dir(AssetKind::Image).join("original")
    }

    pub fn optimized_dir(&self) -> PathBuf {
        self.kind_dir(AssetKind::Image).join("optimized")
    }

    pub fn responsive_dir(&self) -> PathBuf {
        self.kind_dir(AssetKind::Image).join("responsive")
    }

    /// Creates every crawl-data directory
    pub fn create_crawl_dirs(&self) -> OutputResult<()> {
        for dir in [self.crawl_dir.clone(), self.screenshots_dir(), self.html_dir()] {
            create_dir(&dir)?;
        }
        Ok(())
    }

    /// Creates every asset-data directory
    pub fn create_asset_dirs(&self) -> OutputResult<()> {
        let mut dirs = vec![
            self.asset_dir.clone(),
            self.originals_dir(),
            self.optimized_dir(),
            self.responsive_dir(),
        ];
        dirs.extend(
            [AssetKind::Font, AssetKind::Video, AssetKind::Document]
                .into_iter()
                .map(|kind| self.kind_dir(kind)),
        );
        for dir in dirs {
            create_dir(&dir)?;
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> OutputResult<()> {
    std::fs::create_dir_all(path).map_err(|source| OutputError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes bytes to a file without blocking the runtime
pub async fn write_file(path: &Path, bytes: &[u8]) -> OutputResult<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })
}

fn write_text(path: &Path, contents: &str) -> OutputResult<()> {
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes a value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> OutputResult<()> {
    let json =
        serde_json::to_string_pretty(value).map_err(|source| OutputError::Serialize { what, source })?;
    write_text(path, &json)
}

/// Writes `site-structure.json` and returns its path
pub fn write_site_structure(layout: &OutputLayout, site: &SiteStructure) -> OutputResult<PathBuf> {
    let path = layout.crawl_dir().join(SITE_STRUCTURE_FILE);
    write_json(&path, &site.document(), "site structure")?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

/// Writes `asset-manifest.json` and returns its path
pub fn write_asset_manifest(
    layout: &OutputLayout,
    manifest: &AssetManifest,
) -> OutputResult<PathBuf> {
    let path = layout.asset_dir().join(ASSET_MANIFEST_FILE);
    write_json(&path, manifest, "asset manifest")?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

/// Writes `CRAWL_REPORT.md` and returns its path
pub fn write_crawl_report(
    layout: &OutputLayout,
    site: &SiteStructure,
    stats: &CrawlStats,
) -> OutputResult<PathBuf> {
    let path = layout.crawl_dir().join(CRAWL_REPORT_FILE);
    write_text(&path, &format_crawl_report(site, stats))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}

/// Writes `ASSET_GUIDE.md` and returns its path
pub fn write_asset_guide(layout: &OutputLayout, manifest: &AssetManifest) -> OutputResult<PathBuf> {
    let path = layout.asset_dir().join(ASSET_GUIDE_FILE);
    write_text(&path, &format_asset_guide(manifest))?;
    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
