//! State module for crawl and asset pipeline results
//!
//! # Components
//!
//! - `PageMetadata` and its descriptors: what the extractor records per page
//! - `SiteStructure`: the crawl run's page map, asset sets and navigation
//! - `AssetStatus`: one-directional status of an asset record
//! - `AssetManifest`: the asset run's summary and typed records

mod asset_status;
mod manifest;
mod page;
mod site;

// Re-export main types
pub use asset_status::AssetStatus;
pub use manifest::{
    savings_percent, AssetManifest, DocumentAsset, FileAsset, FontAsset, ImageAsset,
    ImageVariant, ManifestSummary, VideoAsset,
};
pub use page::{
    FormInfo, Headings, ImageInfo, InputInfo, LinkInfo, NavItem, Navigation, PageMetadata,
    ScriptInfo, StyleInfo,
};
pub use site::{AssetKind, AssetSets, SiteStructure, SiteStructureDocument, SiteSummary};
