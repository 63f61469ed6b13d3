//! Asset manifest records produced by the asset pipeline

use crate::state::asset_status::AssetStatus;
use crate::SiteliftError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One resized copy of an optimized image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageVariant {
    /// Breakpoint name, e.g. `tablet`
    pub tier: String,
    pub width: u32,
    pub height: u32,
    pub path: String,
    pub size: u64,
}

/// Pipeline record for one image URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    pub url: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub original_size: u64,
    pub optimized_size: u64,
    status: AssetStatus,
    pub variants: Vec<ImageVariant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageAsset {
    /// A record for an image whose original bytes were written to disk
    ///
    /// Optimized size starts equal to the original size, so a record that
    /// never gets optimized contributes zero savings.
    pub fn downloaded(url: String, filename: String, local_path: String, size: u64) -> Self {
        Self {
            url,
            filename,
            local_path: Some(local_path),
            optimized_path: None,
            width: None,
            height: None,
            original_size: size,
            optimized_size: size,
            status: AssetStatus::Downloaded,
            variants: Vec::new(),
            error: None,
        }
    }

    /// A record for an image whose download failed
    pub fn failed(url: String, filename: String, error: String) -> Self {
        Self {
            url,
            filename,
            local_path: None,
            optimized_path: None,
            width: None,
            height: None,
            original_size: 0,
            optimized_size: 0,
            status: AssetStatus::Failed,
            variants: Vec::new(),
            error: Some(error),
        }
    }

    pub fn status(&self) -> AssetStatus {
        self.status
    }

    /// Records a successful re-encode
    pub fn mark_optimized(
        &mut self,
        optimized_path: String,
        optimized_size: u64,
        variants: Vec<ImageVariant>,
    ) -> Result<(), SiteliftError> {
        self.status = self.status.transition(AssetStatus::Optimized)?;
        self.optimized_path = Some(optimized_path);
        self.optimized_size = optimized_size;
        self.variants = variants;
        Ok(())
    }

    /// Bytes counted toward the optimized total
    ///
    /// A master that came out larger than its source is not an improvement;
    /// the original stays the better candidate, so it is counted instead.
    pub fn effective_size(&self) -> u64 {
        self.optimized_size.min(self.original_size)
    }
}

/// Pipeline record for a font, video, or document URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAsset {
    pub url: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    status: AssetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileAsset {
    pub fn downloaded(
        url: String,
        filename: String,
        local_path: String,
        size: u64,
        format: Option<String>,
    ) -> Self {
        Self {
            url,
            filename,
            local_path: Some(local_path),
            size,
            format,
            status: AssetStatus::Downloaded,
            error: None,
        }
    }

    pub fn failed(url: String, filename: String, error: String) -> Self {
        Self {
            url,
            filename,
            local_path: None,
            size: 0,
            format: None,
            status: AssetStatus::Failed,
            error: Some(error),
        }
    }

    pub fn status(&self) -> AssetStatus {
        self.status
    }
}

pub type FontAsset = FileAsset;
pub type VideoAsset = FileAsset;
pub type DocumentAsset = FileAsset;

/// Image totals for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSummary {
    pub total_images: usize,
    pub total_downloaded: usize,
    pub total_failed: usize,
    pub total_optimized: usize,
    pub original_size_bytes: u64,
    pub optimized_size_bytes: u64,
    pub savings_percent: u64,
}

impl ManifestSummary {
    /// Computes totals over a set of image records
    pub fn from_images(images: &[ImageAsset]) -> Self {
        let mut summary = Self {
            total_images: images.len(),
            ..Default::default()
        };

        for image in images {
            match image.status() {
                AssetStatus::Failed => summary.total_failed += 1,
                AssetStatus::Optimized => {
                    summary.total_downloaded += 1;
                    summary.total_optimized += 1;
                }
                AssetStatus::Downloaded => summary.total_downloaded += 1,
            }
            summary.original_size_bytes += image.original_size;
            summary.optimized_size_bytes += image.effective_size();
        }

        summary.savings_percent =
            savings_percent(summary.original_size_bytes, summary.optimized_size_bytes);
        summary
    }
}

/// `round((original - optimized) / original * 100)`, or 0 with nothing to compare
pub fn savings_percent(original: u64, optimized: u64) -> u64 {
    if original == 0 {
        return 0;
    }
    let saved = original.saturating_sub(optimized);
    ((saved as f64 / original as f64) * 100.0).round() as u64
}

/// Serialized summary-plus-records for one pipeline run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    pub generated_at: DateTime<Utc>,
    pub base_url: String,
    pub summary: ManifestSummary,
    pub images: Vec<ImageAsset>,
    pub fonts: Vec<FontAsset>,
    pub videos: Vec<VideoAsset>,
    pub documents: Vec<DocumentAsset>,
}

impl AssetManifest {
    /// Assembles a manifest, sorting each record list by URL
    pub fn new(
        base_url: String,
        mut images: Vec<ImageAsset>,
        mut fonts: Vec<FontAsset>,
        mut videos: Vec<VideoAsset>,
        mut documents: Vec<DocumentAsset>,
    ) -> Self {
        images.sort_by(|a, b| a.url.cmp(&b.url));
        fonts.sort_by(|a, b| a.url.cmp(&b.url));
        videos.sort_by(|a, b| a.url.cmp(&b.url));
        documents.sort_by(|a, b| a.url.cmp(&b.url));

        Self {
            generated_at: Utc::now(),
            summary: ManifestSummary::from_images(&images),
            base_url,
            images,
            fonts,
            videos,
            documents,
        }
    }

    /// Number of non-image records that failed
    pub fn failed_files(&self) -> usize {
        self.fonts
            .iter()
            .chain(&self.videos)
            .chain(&self.documents)
            .filter(|f| f.status() == AssetStatus::Failed)
            .count()
    }
}
