//! Asset pipeline - bounded-concurrency download and re-encode
//!
//! Every discovered asset URL becomes one unit of work:
//! - images are downloaded, written as originals, identified, re-encoded
//!   to a full-size master and responsive variants
//! - fonts, videos and documents are downloaded into their directory
//!
//! A failing unit is recorded and never blocks its siblings.

use crate::assets::filter::exclusion_reason;
use crate::assets::naming::{assign_filenames, split_extension};
use crate::config::AssetConfig;
use crate::crawler::fetch_bytes;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, OptimizeParams, OptimizedImage, Quality,
    OUTPUT_EXTENSION,
};
use crate::output::{write_file, OutputLayout};
use crate::state::{AssetKind, AssetManifest, AssetSets, FileAsset, ImageAsset, ImageVariant};
use crate::SiteliftError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Default number of assets processed at once
pub const ASSET_CONCURRENCY: usize = 5;

/// One asset URL with its assigned filename
#[derive(Debug, Clone, PartialEq, Eq)]
struct AssetJob {
    kind: AssetKind,
    url: String,
    filename: String,
}

/// A finished unit of work
#[derive(Debug)]
enum AssetRecord {
    Image(ImageAsset),
    Font(FileAsset),
    Video(FileAsset),
    Document(FileAsset),
}

/// State shared by every asset worker
struct Worker {
    client: Client,
    backend: Arc<dyn ImageBackend>,
    layout: OutputLayout,
    config: AssetConfig,
}

/// Downloads and optimizes a crawl's asset sets
pub struct AssetPipeline {
    worker: Arc<Worker>,
    base_url: String,
    cancel: CancellationToken,
}

impl AssetPipeline {
    pub fn new(
        client: Client,
        backend: Arc<dyn ImageBackend>,
        config: AssetConfig,
        layout: OutputLayout,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            worker: Arc::new(Worker {
                client,
                backend,
                layout,
                config,
            }),
            base_url: base_url.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Processes every URL in `assets` and returns the manifest
    ///
    /// Only a failure to create the asset directories is an error; each
    /// asset's own failure is recorded in its manifest entry.
    pub async fn process(&self, assets: &AssetSets) -> Result<AssetManifest, SiteliftError> {
        self.worker.layout.create_asset_dirs()?;

        let start = Instant::now();
        let jobs = plan_jobs(assets);
        let concurrency = self.worker.config.concurrency.max(1);
        tracing::info!(
            "Processing {} assets with concurrency {}",
            jobs.len(),
            concurrency
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut tasks = JoinSet::new();
        for job in jobs {
            let semaphore = Arc::clone(&semaphore);
            let worker = Arc::clone(&self.worker);
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return None,
                    permit = semaphore.acquire_owned() => permit.ok()?,
                };
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    record = worker.run(job) => Some(record),
                }
            });
        }

        let mut images = Vec::new();
        let mut fonts = Vec::new();
        let mut videos = Vec::new();
        let mut documents = Vec::new();
        let mut abandoned = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(AssetRecord::Image(image))) => images.push(image),
                Ok(Some(AssetRecord::Font(file))) => fonts.push(file),
                Ok(Some(AssetRecord::Video(file))) => videos.push(file),
                Ok(Some(AssetRecord::Document(file))) => documents.push(file),
                Ok(None) => abandoned += 1,
                Err(e) => tracing::error!("Asset worker panicked: {}", e),
            }
        }

        if abandoned > 0 {
            tracing::warn!("Asset run cancelled, {} assets not processed", abandoned);
        }

        let manifest = AssetManifest::new(self.base_url.clone(), images, fonts, videos, documents);
        tracing::info!(
            "Assets completed in {:?}: {} images ({} optimized, {} failed), {} other files ({} failed), {}% saved",
            start.elapsed(),
            manifest.summary.total_images,
            manifest.summary.total_optimized,
            manifest.summary.total_failed,
            manifest.fonts.len() + manifest.videos.len() + manifest.documents.len(),
            manifest.failed_files(),
            manifest.summary.savings_percent
        );

        Ok(manifest)
    }
}

/// Turns asset sets into jobs, dropping excluded images before any request
fn plan_jobs(assets: &AssetSets) -> Vec<AssetJob> {
    let mut jobs = Vec::new();
    for kind in AssetKind::ALL {
        let urls: Vec<String> = assets
            .get(kind)
            .iter()
            .filter(|url| {
                if kind != AssetKind::Image {
                    return true;
                }
                match exclusion_reason(url) {
                    Some(reason) => {
                        tracing::debug!("Excluding {} ({})", url, reason);
                        false
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();

        jobs.extend(
            assign_filenames(&urls, kind)
                .into_iter()
                .map(|(url, filename)| AssetJob {
                    kind,
                    url,
                    filename,
                }),
        );
    }
    jobs
}

/// Manifest-facing path relative to the asset directory
fn relative(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

impl Worker {
    async fn run(&self, job: AssetJob) -> AssetRecord {
        match job.kind {
            AssetKind::Image => AssetRecord::Image(self.process_image(job).await),
            AssetKind::Font => AssetRecord::Font(self.process_file(job).await),
            AssetKind::Video => AssetRecord::Video(self.process_file(job).await),
            AssetKind::Document => AssetRecord::Document(self.process_file(job).await),
        }
    }

    async fn process_file(&self, job: AssetJob) -> FileAsset {
        let AssetJob {
            kind,
            url,
            filename,
        } = job;

        let bytes = match fetch_bytes(&self.client, &url, self.config.download_timeout()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                return FileAsset::failed(url, filename, e.to_string());
            }
        };

        let rel = PathBuf::from(kind.dir_name()).join(&filename);
        if let Err(e) = write_file(&self.layout.asset_dir().join(&rel), &bytes).await {
            tracing::warn!("Failed to save {}: {}", url, e);
            return FileAsset::failed(url, filename, e.to_string());
        }

        let format = match kind {
            AssetKind::Font => split_extension(&filename).1.map(|e| e.to_ascii_lowercase()),
            _ => None,
        };

        tracing::debug!("Downloaded {} ({} bytes)", url, bytes.len());
        FileAsset::downloaded(url, filename, relative(&rel), bytes.len() as u64, format)
    }

    async fn process_image(&self, job: AssetJob) -> ImageAsset {
        let AssetJob { url, filename, .. } = job;

        let bytes = match fetch_bytes(&self.client, &url, self.config.download_timeout()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", url, e);
                return ImageAsset::failed(url, filename, e.to_string());
            }
        };

        let original_rel = PathBuf::from("images/original").join(&filename);
        if let Err(e) = write_file(&self.layout.asset_dir().join(&original_rel), &bytes).await {
            tracing::warn!("Failed to save {}: {}", url, e);
            return ImageAsset::failed(url, filename, e.to_string());
        }

        let mut record = ImageAsset::downloaded(
            url,
            filename,
            relative(&original_rel),
            bytes.len() as u64,
        );

        let backend = Arc::clone(&self.backend);
        let params = OptimizeParams::new(Quality::new(self.config.quality));
        let encoded = tokio::task::spawn_blocking(move || {
            let dims = backend.identify(&bytes)?;
            let optimized = backend.optimize(&bytes, &params)?;
            Ok::<(Dimensions, OptimizedImage), BackendError>((dims, optimized))
        })
        .await;

        let (dims, optimized) = match encoded {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!("Keeping original for {}: {}", record.url, e);
                record.error = Some(e.to_string());
                return record;
            }
            Err(e) => {
                tracing::warn!("Encoder task for {} failed: {}", record.url, e);
                record.error = Some(e.to_string());
                return record;
            }
        };

        record.width = Some(dims.width);
        record.height = Some(dims.height);

        match self.save_optimized(&record.filename, optimized).await {
            Ok((master_rel, master_size, variants)) => {
                if let Err(e) = record.mark_optimized(master_rel, master_size, variants) {
                    tracing::warn!("Could not mark {} optimized: {}", record.url, e);
                } else {
                    tracing::debug!(
                        "Optimized {}: {} -> {} bytes, {} variants",
                        record.url,
                        record.original_size,
                        record.optimized_size,
                        record.variants.len()
                    );
                }
            }
            Err(e) => {
                tracing::warn!("Failed to save optimized copies of {}: {}", record.url, e);
                record.error = Some(e.to_string());
            }
        }

        record
    }

    /// Writes the master and every variant, returning manifest entries
    async fn save_optimized(
        &self,
        filename: &str,
        optimized: OptimizedImage,
    ) -> Result<(String, u64, Vec<ImageVariant>), SiteliftError> {
        let (stem, _) = split_extension(filename);

        let master_rel =
            PathBuf::from("images/optimized").join(format!("{}.{}", stem, OUTPUT_EXTENSION));
        write_file(
            &self.layout.asset_dir().join(&master_rel),
            &optimized.master.bytes,
        )
        .await?;

        let mut variants = Vec::with_capacity(optimized.variants.len());
        for (tier, image) in optimized.variants {
            let rel = PathBuf::from("images/responsive")
                .join(format!("{}-{}.{}", stem, tier, OUTPUT_EXTENSION));
            write_file(&self.layout.asset_dir().join(&rel), &image.bytes).await?;
            variants.push(ImageVariant {
                tier: tier.to_string(),
                width: image.width,
                height: image.height,
                path: relative(&rel),
                size: image.bytes.len() as u64,
            });
        }

        Ok((
            relative(&master_rel),
            optimized.master.bytes.len() as u64,
            variants,
        ))
    }
}
