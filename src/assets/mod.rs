//! Asset pipeline for discovered images, fonts, videos and documents
//!
//! # Components
//!
//! - `filter`: image URLs excluded before any request (beacons, spacers)
//! - `naming`: deterministic, collision-free local filenames
//! - `pipeline`: the bounded worker pool producing the `AssetManifest`

pub mod filter;
pub mod naming;
mod pipeline;

pub use filter::{exclusion_reason, is_excluded};
pub use naming::{assign_filenames, filename_for};
pub use pipeline::{AssetPipeline, ASSET_CONCURRENCY};
