//! The per-run site aggregate owned by the crawl orchestrator

use crate::state::page::{Navigation, PageMetadata};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use url::Url;

/// Category of a discovered binary asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Font,
    Video,
    Document,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [Self::Image, Self::Font, Self::Video, Self::Document];

    /// Directory name under `asset-data/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Font => "fonts",
            Self::Video => "videos",
            Self::Document => "documents",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Four sets of unique absolute asset URLs
///
/// Insertion is idempotent; iteration order is sorted, so serialized
/// output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetSets {
    pub images: BTreeSet<String>,
    pub fonts: BTreeSet<String>,
    pub videos: BTreeSet<String>,
    pub documents: BTreeSet<String>,
}

impl AssetSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL, returning true if it was not already present
    pub fn insert(&mut self, kind: AssetKind, url: impl Into<String>) -> bool {
        self.set_mut(kind).insert(url.into())
    }

    /// Folds another asset collection into this one
    pub fn merge(&mut self, other: AssetSets) {
        self.images.extend(other.images);
        self.fonts.extend(other.fonts);
        self.videos.extend(other.videos);
        self.documents.extend(other.documents);
    }

    pub fn get(&self, kind: AssetKind) -> &BTreeSet<String> {
        match kind {
            AssetKind::Image => &self.images,
            AssetKind::Font => &self.fonts,
            AssetKind::Video => &self.videos,
            AssetKind::Document => &self.documents,
        }
    }

    fn set_mut(&mut self, kind: AssetKind) -> &mut BTreeSet<String> {
        match kind {
            AssetKind::Image => &mut self.images,
            AssetKind::Font => &mut self.fonts,
            AssetKind::Video => &mut self.videos,
            AssetKind::Document => &mut self.documents,
        }
    }

    /// Total URLs across all categories
    pub fn len(&self) -> usize {
        AssetKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Aggregate result of one crawl run
#[derive(Debug, Clone)]
pub struct SiteStructure {
    base_url: Url,
    crawled_at: DateTime<Utc>,
    pages: BTreeMap<String, PageMetadata>,
    assets: AssetSets,
    navigation: Navigation,
    navigation_set: bool,
    page_list: Vec<String>,
}

impl SiteStructure {
    /// Creates an empty structure for a run over `page_list`
    pub fn new(base_url: Url, page_list: Vec<String>) -> Self {
        Self {
            base_url,
            crawled_at: Utc::now(),
            pages: BTreeMap::new(),
            assets: AssetSets::new(),
            navigation: Navigation::default(),
            navigation_set: false,
            page_list,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn crawled_at(&self) -> DateTime<Utc> {
        self.crawled_at
    }

    /// Inserts a page if its URL is not yet present
    ///
    /// Returns false (and keeps the existing entry) on a duplicate URL.
    pub fn insert_page(&mut self, page: PageMetadata) -> bool {
        match self.pages.entry(page.url.clone()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(page);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn page(&self, url: &str) -> Option<&PageMetadata> {
        self.pages.get(url)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageMetadata> {
        self.pages.values()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn add_assets(&mut self, assets: AssetSets) {
        self.assets.merge(assets);
    }

    pub fn assets(&self) -> &AssetSets {
        &self.assets
    }

    /// Sets the navigation trees; only the first call has any effect
    pub fn set_navigation(&mut self, navigation: Navigation) -> bool {
        if self.navigation_set {
            return false;
        }
        self.navigation = navigation;
        self.navigation_set = true;
        true
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn page_list(&self) -> &[String] {
        &self.page_list
    }

    pub fn summary(&self) -> SiteSummary {
        SiteSummary {
            total_pages: self.pages.len(),
            total_images: self.assets.images.len(),
            total_fonts: self.assets.fonts.len(),
            total_videos: self.assets.videos.len(),
            total_documents: self.assets.documents.len(),
        }
    }

    /// Borrowed view in the `site-structure.json` shape
    pub fn document(&self) -> SiteStructureDocument<'_> {
        SiteStructureDocument {
            base_url: self.base_url.as_str(),
            crawled_at: self.crawled_at,
            summary: self.summary(),
            pages: self.pages.values().collect(),
            assets: &self.assets,
            navigation: &self.navigation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub total_pages: usize,
    pub total_images: usize,
    pub total_fonts: usize,
    pub total_videos: usize,
    pub total_documents: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStructureDocument<'a> {
    pub base_url: &'a str,
    pub crawled_at: DateTime<Utc>,
    pub summary: SiteSummary,
    pub pages: Vec<&'a PageMetadata>,
    pub assets: &'a AssetSets,
    pub navigation: &'a Navigation,
}
