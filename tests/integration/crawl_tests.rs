//! Integration tests for the crawl phase
//!
//! Pages are rendered by `MockRenderer`; sitemaps are served by wiremock.

use crate::support::{crawler_config, page, MockRenderer, FAKE_PNG};
use reqwest::Client;
use sitelift::config::Config;
use sitelift::crawler::resolve_page_list;
use sitelift::output::{write_crawl_report, write_site_structure, OutputLayout};
use sitelift::render::Renderer;
use sitelift::CrawlOrchestrator;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://example.com/";

fn base() -> Url {
    Url::parse(BASE).unwrap()
}

fn orchestrator(renderer: Arc<MockRenderer>, concurrency: usize, dir: &TempDir) -> CrawlOrchestrator {
    CrawlOrchestrator::new(
        renderer,
        crawler_config(concurrency),
        OutputLayout::new(dir.path()),
        base(),
    )
}

fn count_files(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_two_page_crawl_writes_artifacts() {
    let renderer = Arc::new(
        MockRenderer::new()
            .with_page(
                "https://example.com/",
                page(
                    "Home",
                    r#"<h1>Welcome</h1><a href="/about">About</a><img src="/img/hero.jpg" alt="Hero">"#,
                ),
            )
            .with_page(
                "https://example.com/about",
                page("About", r#"<h1>About us</h1><a href="/files/brochure.pdf">Brochure</a>"#),
            ),
    );
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());

    let result = orchestrator(Arc::clone(&renderer), 1, &dir)
        .crawl(vec![
            "https://example.com/".to_string(),
            "https://example.com/about".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 2);
    assert_eq!(result.stats.failed, 0);
    assert_eq!(result.site.page_count(), 2);
    assert_eq!(
        result.site.page("https://example.com/about").unwrap().title,
        "About"
    );
    assert!(result
        .site
        .assets()
        .images
        .contains("https://example.com/img/hero.jpg"));
    assert!(result
        .site
        .assets()
        .documents
        .contains("https://example.com/files/brochure.pdf"));

    assert_eq!(count_files(&layout.screenshots_dir()), 2);
    assert_eq!(count_files(&layout.html_dir()), 2);
    let screenshot = std::fs::read_dir(layout.screenshots_dir())
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert_eq!(std::fs::read(screenshot).unwrap(), FAKE_PNG);

    let path = write_site_structure(&layout, &result.site).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["summary"]["totalPages"], 2);
    assert_eq!(json["summary"]["totalImages"], 1);

    let report = write_crawl_report(&layout, &result.site, &result.stats).unwrap();
    let report = std::fs::read_to_string(report).unwrap();
    assert!(report.contains("https://example.com/about"));

    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_crawl() {
    let mut renderer = MockRenderer::new();
    for i in 1..=5 {
        let url = format!("https://example.com/p{}", i);
        renderer = renderer.with_page(url, page(&format!("Page {}", i), ""));
    }
    let renderer = Arc::new(
        renderer
            .with_failure("https://example.com/p2")
            .with_failure("https://example.com/p4"),
    );
    let dir = TempDir::new().unwrap();

    let pages = (1..=5)
        .map(|i| format!("https://example.com/p{}", i))
        .collect();
    let result = orchestrator(Arc::clone(&renderer), 2, &dir)
        .crawl(pages)
        .await
        .unwrap();

    assert_eq!(result.stats.attempted, 5);
    assert_eq!(result.stats.captured, 3);
    assert_eq!(result.stats.failed, 2);
    assert_eq!(result.site.page_count(), 3);
    assert!(result.site.page("https://example.com/p2").is_none());

    let mut failed: Vec<&str> = result
        .stats
        .failures
        .iter()
        .map(|f| f.url.as_str())
        .collect();
    failed.sort();
    assert_eq!(failed, vec!["https://example.com/p2", "https://example.com/p4"]);
    assert!(!result.stats.nothing_captured());
    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_concurrency_bound_is_respected() {
    let mut renderer = MockRenderer::new().with_delay(Duration::from_millis(50));
    for i in 0..6 {
        renderer = renderer.with_page(format!("https://example.com/p{}", i), page("P", ""));
    }
    let renderer = Arc::new(renderer);
    let dir = TempDir::new().unwrap();

    let pages = (0..6).map(|i| format!("https://example.com/p{}", i)).collect();
    let result = orchestrator(Arc::clone(&renderer), 2, &dir)
        .crawl(pages)
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 6);
    assert!(renderer.max_active() <= 2);
    assert!(renderer.max_active() >= 1);
    assert_eq!(renderer.opened(), 6);
    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_duplicate_urls_rendered_once() {
    let renderer = Arc::new(
        MockRenderer::new()
            .with_page("https://example.com/about", page("About", ""))
            .with_page("https://example.com/about/", page("About", "")),
    );
    let dir = TempDir::new().unwrap();

    let result = orchestrator(Arc::clone(&renderer), 3, &dir)
        .crawl(vec![
            "https://example.com/about".to_string(),
            "https://example.com/about/".to_string(),
            "https://example.com/about#team".to_string(),
        ])
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 1);
    assert_eq!(result.stats.skipped, 2);
    assert_eq!(result.site.page_count(), 1);
    assert!(result.site.page("https://example.com/about").is_some());
    assert_eq!(renderer.navigated().len(), 1);
}

#[tokio::test]
async fn test_navigates_to_url_as_given() {
    let renderer = Arc::new(
        MockRenderer::new().with_page("https://example.com/about/", page("About", "")),
    );
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());

    let result = orchestrator(Arc::clone(&renderer), 1, &dir)
        .crawl(vec!["https://example.com/about/".to_string()])
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 1);
    assert_eq!(renderer.navigated(), vec!["https://example.com/about/"]);
    assert_eq!(
        result.site.page("https://example.com/about").unwrap().title,
        "About"
    );
    assert!(layout.html_path("about").is_file());
}

#[tokio::test]
async fn test_colliding_slugs_keep_every_artifact() {
    let urls = [
        "https://example.com/a/b",
        "https://example.com/a-b",
        "https://example.com/shop",
        "https://example.com/shop?page=2",
    ];
    let mut renderer = MockRenderer::new();
    for (i, url) in urls.iter().enumerate() {
        renderer = renderer.with_page(*url, page(&format!("Page {}", i), ""));
    }
    let renderer = Arc::new(renderer);
    let dir = TempDir::new().unwrap();
    let layout = OutputLayout::new(dir.path());

    let result = orchestrator(renderer, 1, &dir)
        .crawl(urls.iter().map(|u| u.to_string()).collect())
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 4);
    assert_eq!(count_files(&layout.screenshots_dir()), 4);
    assert_eq!(count_files(&layout.html_dir()), 4);
    assert!(layout.html_path("a-b").is_file());
    assert!(layout.html_path("shop").is_file());

    let shop = std::fs::read_to_string(layout.html_path("shop")).unwrap();
    assert!(shop.contains("<title>Page 2</title>"));
}

#[tokio::test]
async fn test_cancellation_stops_new_work() {
    let mut renderer = MockRenderer::new().with_delay(Duration::from_millis(200));
    for i in 0..5 {
        renderer = renderer.with_page(format!("https://example.com/p{}", i), page("P", ""));
    }
    let renderer = Arc::new(renderer);
    let dir = TempDir::new().unwrap();
    let cancel = CancellationToken::new();

    let orchestrator =
        orchestrator(Arc::clone(&renderer), 1, &dir).with_cancellation(cancel.clone());
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let pages = (0..5).map(|i| format!("https://example.com/p{}", i)).collect();
    let result = orchestrator.crawl(pages).await.unwrap();

    assert_eq!(result.stats.captured, 0);
    assert_eq!(result.stats.cancelled, 5);
    assert!(renderer.opened() <= 1);
    assert_eq!(renderer.active_contexts(), 0);
}

#[tokio::test]
async fn test_navigation_extracted_from_homepage() {
    let home = page(
        "Home",
        r#"<header><nav><ul>
            <li><a href="/">Home</a></li>
            <li><a href="/services">Services</a>
                <ul><li><a href="/services/web">Web</a></li></ul>
            </li>
        </ul></nav></header>
        <footer><a href="/privacy">Privacy</a></footer>"#,
    );
    let other = page(
        "Other",
        r#"<header><nav><a href="/elsewhere">Elsewhere</a></nav></header>"#,
    );
    let renderer = Arc::new(
        MockRenderer::new()
            .with_page("https://example.com/", home)
            .with_page("https://example.com/other", other),
    );
    let dir = TempDir::new().unwrap();

    let result = orchestrator(renderer, 2, &dir)
        .crawl(vec![
            "https://example.com/other".to_string(),
            "https://example.com/".to_string(),
        ])
        .await
        .unwrap();

    let nav = result.site.navigation();
    assert_eq!(nav.header.len(), 2);
    assert_eq!(nav.header[1].text, "Services");
    assert_eq!(nav.header[1].children[0].href, "https://example.com/services/web");
    assert_eq!(nav.footer.len(), 1);
    assert_eq!(nav.footer[0].text, "Privacy");
}

#[tokio::test]
async fn test_missing_homepage_leaves_navigation_empty() {
    let renderer = Arc::new(MockRenderer::new().with_page(
        "https://example.com/other",
        page("Other", r#"<nav><a href="/x">X</a></nav>"#),
    ));
    let dir = TempDir::new().unwrap();

    let result = orchestrator(renderer, 1, &dir)
        .crawl(vec!["https://example.com/other".to_string()])
        .await
        .unwrap();

    assert_eq!(result.stats.captured, 1);
    assert!(result.site.navigation().is_empty());
}

#[tokio::test]
async fn test_all_pages_failing_reports_nothing_captured() {
    let renderer = Arc::new(MockRenderer::new());
    let dir = TempDir::new().unwrap();

    let result = orchestrator(renderer, 2, &dir)
        .crawl(vec!["https://example.com/".to_string()])
        .await
        .unwrap();

    assert_eq!(result.stats.failed, 1);
    assert!(result.stats.nothing_captured());
}

#[tokio::test]
async fn test_page_list_from_sitemap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <url><loc>{0}/</loc></url>
                <url><loc>{0}/about</loc></url>
                <url><loc>{0}/about</loc></url>
                <url><loc>{0}/contact</loc></url>
            </urlset>"#,
            server.uri()
        )))
        .mount(&server)
        .await;

    let config = Config::for_site(server.uri());
    let pages = resolve_page_list(&config, &Client::new()).await.unwrap();

    assert_eq!(
        pages,
        vec![
            format!("{}/", server.uri()),
            format!("{}/about", server.uri()),
            format!("{}/contact", server.uri()),
        ]
    );
}

#[tokio::test]
async fn test_sitemap_index_followed_and_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
            <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                <sitemap><loc>{0}/pages-sitemap.xml</loc></sitemap>
                <sitemap><loc>{0}/missing-sitemap.xml</loc></sitemap>
            </sitemapindex>"#,
            server.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pages-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset>
                <url><loc>{0}/a</loc></url>
                <url><loc>{0}/b</loc></url>
                <url><loc>{0}/c</loc></url>
            </urlset>"#,
            server.uri()
        )))
        .mount(&server)
        .await;

    let mut config = Config::for_site(server.uri());
    config.site.max_pages = Some(2);
    let pages = resolve_page_list(&config, &Client::new()).await.unwrap();

    assert_eq!(
        pages,
        vec![format!("{}/a", server.uri()), format!("{}/b", server.uri())]
    );
}

#[tokio::test]
async fn test_no_sitemap_falls_back_to_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset></urlset>"))
        .mount(&server)
        .await;

    let config = Config::for_site(server.uri());
    let pages = resolve_page_list(&config, &Client::new()).await.unwrap();

    assert_eq!(pages, vec![format!("{}/", server.uri())]);
}
