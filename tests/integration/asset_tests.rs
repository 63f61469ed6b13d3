//! Integration tests for the asset phase
//!
//! Assets are served by wiremock and encoded by `FakeEncoder`.

use crate::support::{jpeg_bytes, CountingEncoder, FakeEncoder};
use reqwest::Client;
use sitelift::config::AssetConfig;
use sitelift::output::{write_asset_guide, write_asset_manifest, OutputLayout};
use sitelift::state::{AssetKind, AssetSets};
use sitelift::{AssetPipeline, AssetStatus};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline(dir: &TempDir, encoder: FakeEncoder, base_url: &str) -> AssetPipeline {
    AssetPipeline::new(
        Client::new(),
        Arc::new(encoder),
        AssetConfig {
            concurrency: 2,
            ..AssetConfig::default()
        },
        OutputLayout::new(dir.path()),
        base_url,
    )
}

#[tokio::test]
async fn test_large_image_gets_every_variant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/hero.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(2000, 1500)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pixel.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());
    let mut assets = AssetSets::new();
    assets.insert(AssetKind::Image, format!("{}/images/hero.jpg", server.uri()));
    assets.insert(AssetKind::Image, format!("{}/pixel.gif", server.uri()));

    let manifest = pipeline(&dir, FakeEncoder::default(), &server.uri())
        .process(&assets)
        .await
        .unwrap();

    assert_eq!(manifest.images.len(), 1);
    let hero = &manifest.images[0];
    assert_eq!(hero.status(), AssetStatus::Optimized);
    assert_eq!(hero.filename, "hero.jpg");
    assert_eq!(hero.width, Some(2000));
    assert_eq!(hero.height, Some(1500));
    assert_eq!(hero.optimized_path.as_deref(), Some("images/optimized/hero.avif"));

    let tiers: Vec<(&str, u32, u32)> = hero
        .variants
        .iter()
        .map(|v| (v.tier.as_str(), v.width, v.height))
        .collect();
    assert_eq!(
        tiers,
        vec![
            ("mobile", 480, 360),
            ("tablet", 768, 576),
            ("desktop", 1024, 768),
            ("wide", 1920, 1440),
        ]
    );
    for variant in &hero.variants {
        assert!(layout.asset_dir().join(&variant.path).is_file());
    }

    assert_eq!(manifest.summary.total_images, 1);
    assert_eq!(manifest.summary.total_optimized, 1);
    assert!(manifest.summary.savings_percent > 0);

    write_asset_manifest(&layout, &manifest).unwrap();
    let guide = write_asset_guide(&layout, &manifest).unwrap();
    let guide = std::fs::read_to_string(guide).unwrap();
    assert!(guide.contains("hero.jpg"));
    assert!(guide.contains("<picture>"));
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(300, 200)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.woff2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut assets = AssetSets::new();
    assets.insert(AssetKind::Image, format!("{}/a.jpg", server.uri()));
    assets.insert(AssetKind::Image, format!("{}/broken.jpg", server.uri()));
    assets.insert(AssetKind::Document, format!("{}/guide.pdf", server.uri()));
    assets.insert(AssetKind::Font, format!("{}/gone.woff2", server.uri()));

    let manifest = pipeline(&dir, FakeEncoder::default(), &server.uri())
        .process(&assets)
        .await
        .unwrap();

    assert_eq!(manifest.images.len(), 2);
    let a = manifest.images.iter().find(|i| i.filename == "a.jpg").unwrap();
    assert_eq!(a.status(), AssetStatus::Optimized);
    assert!(a.variants.is_empty());
    let broken = manifest
        .images
        .iter()
        .find(|i| i.filename == "broken.jpg")
        .unwrap();
    assert_eq!(broken.status(), AssetStatus::Failed);
    assert!(broken.error.is_some());

    assert_eq!(manifest.documents.len(), 1);
    assert!(dir.path().join("asset-data/documents/guide.pdf").is_file());
    assert_eq!(manifest.fonts.len(), 1);
    assert_eq!(manifest.failed_files(), 1);
    assert_eq!(manifest.summary.total_failed, 1);
}

#[tokio::test]
async fn test_encoder_failure_keeps_original() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/photo.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(640, 480)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut assets = AssetSets::new();
    assets.insert(AssetKind::Image, format!("{}/photo.jpg", server.uri()));

    let manifest = pipeline(&dir, FakeEncoder { fail: true }, &server.uri())
        .process(&assets)
        .await
        .unwrap();

    let photo = &manifest.images[0];
    assert_eq!(photo.status(), AssetStatus::Downloaded);
    assert_eq!(photo.local_path.as_deref(), Some("images/original/photo.jpg"));
    assert!(photo.optimized_path.is_none());
    assert!(photo.error.as_deref().unwrap().contains("encoder crashed"));
    assert!(dir
        .path()
        .join("asset-data/images/original/photo.jpg")
        .is_file());
}

#[tokio::test]
async fn test_asset_concurrency_bound_is_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(jpeg_bytes(64, 48))
                .set_delay(Duration::from_millis(20)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut assets = AssetSets::new();
    for i in 0..8 {
        assets.insert(AssetKind::Image, format!("{}/photo-{}.jpg", server.uri(), i));
    }

    let encoder = Arc::new(CountingEncoder::with_delay(Duration::from_millis(50)));
    let manifest = AssetPipeline::new(
        Client::new(),
        Arc::clone(&encoder) as Arc<dyn sitelift::imaging::ImageBackend>,
        AssetConfig {
            concurrency: 3,
            ..AssetConfig::default()
        },
        OutputLayout::new(dir.path()),
        server.uri(),
    )
    .process(&assets)
    .await
    .unwrap();

    assert_eq!(manifest.summary.total_optimized, 8);
    assert_eq!(encoder.calls(), 8);
    assert!(encoder.peak() <= 3);
    assert!(encoder.peak() >= 1);
}

#[tokio::test]
async fn test_cancelled_pipeline_processes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(10, 10)))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut assets = AssetSets::new();
    assets.insert(AssetKind::Image, format!("{}/one.jpg", server.uri()));
    assets.insert(AssetKind::Image, format!("{}/two.jpg", server.uri()));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let manifest = pipeline(&dir, FakeEncoder::default(), &server.uri())
        .with_cancellation(cancel)
        .process(&assets)
        .await
        .unwrap();

    assert!(manifest.images.is_empty());
    assert_eq!(manifest.summary.total_images, 0);
}
