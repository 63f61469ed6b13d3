//! Integration tests for Sitelift
//!
//! The browser and the image encoder are replaced by in-memory mocks so the
//! crawl and asset phases can be driven end-to-end without Chromium.

mod asset_tests;
mod crawl_tests;
mod support;
