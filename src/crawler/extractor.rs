//! Page extractor for rendered HTML
//!
//! This module turns the final HTML of a rendered page into:
//! - a `PageMetadata` record (title, meta tags, headings, links, forms...)
//! - the set of binary asset URLs referenced by the page
//!
//! Extraction is pure: malformed elements are skipped individually and never
//! fail the page.

use crate::state::{
    AssetKind, AssetSets, FormInfo, Headings, ImageInfo, InputInfo, LinkInfo, PageMetadata,
    ScriptInfo, StyleInfo,
};
use crate::url::{is_same_host, resolve_href};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Inline script and style bodies are cut to this many characters
pub const INLINE_CONTENT_LIMIT: usize = 500;

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".svg", ".bmp", ".ico",
];
const FONT_EXTENSIONS: &[&str] = &[".woff2", ".woff", ".ttf", ".otf", ".eot"];
const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mov", ".ogv"];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip",
];

/// Extracts structured metadata from rendered HTML
///
/// # Rules
///
/// - Heading text is trimmed; empty headings are dropped
/// - Open Graph keys are stored without the `og:` prefix
/// - JSON-LD blocks that fail to parse are skipped one by one
/// - Images fall back to `data-src`; images with neither are dropped
/// - Links are internal when their host matches the base host
///
/// # Arguments
///
/// * `html` - The rendered HTML
/// * `page_url` - The page's own URL, used to resolve relative references
/// * `base_url` - The site base URL, used for internal link classification
///
/// # Example
///
/// ```
/// use sitelift::crawler::extract_page;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/about").unwrap();
/// let html = r#"<html><head><title>About</title></head><body><h1> Us </h1></body></html>"#;
/// let page = extract_page(html, &url, &url);
/// assert_eq!(page.title, "About");
/// assert_eq!(page.headings.h1, vec!["Us".to_string()]);
/// ```
pub fn extract_page(html: &str, page_url: &Url, base_url: &Url) -> PageMetadata {
    let document = Html::parse_document(html);

    let mut og_tags = std::collections::BTreeMap::new();
    for meta in select(&document, "meta[property^='og:']") {
        let property = meta.value().attr("property").unwrap_or_default();
        let content = meta.value().attr("content").unwrap_or_default();
        if let Some(key) = property.strip_prefix("og:") {
            if !key.is_empty() {
                og_tags.insert(key.to_string(), content.trim().to_string());
            }
        }
    }

    PageMetadata {
        url: page_url.to_string(),
        title: select(&document, "title")
            .first()
            .map(|t| text_of(t))
            .unwrap_or_default(),
        description: select(&document, "meta[name='description']")
            .first()
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default(),
        canonical: select(&document, "link[rel='canonical'][href]")
            .first()
            .and_then(|l| l.value().attr("href"))
            .map(|href| absolutize(href, page_url)),
        og_tags,
        structured_data: extract_structured_data(&document),
        headings: Headings {
            h1: headings(&document, "h1"),
            h2: headings(&document, "h2"),
            h3: headings(&document, "h3"),
        },
        images: extract_images(&document, page_url),
        links: extract_links(&document, page_url, base_url),
        forms: extract_forms(&document, page_url),
        scripts: extract_scripts(&document, page_url),
        styles: extract_styles(&document, page_url),
    }
}

/// Collects every binary asset URL referenced by the page
///
/// All URLs are absolute; `data:` URIs are never collected.
pub fn discover_assets(html: &str, page_url: &Url) -> AssetSets {
    let document = Html::parse_document(html);
    let mut assets = AssetSets::new();

    // Images
    for img in select(&document, "img") {
        if let Some(src) = image_source(&img) {
            add(&mut assets, AssetKind::Image, src, page_url);
        }
    }
    for el in select(&document, "img[srcset], source[srcset]") {
        // <source> inside <video> carries video files, not srcset candidates
        if el.value().name() == "source" && inside(&el, "video") {
            continue;
        }
        for candidate in srcset_urls(el.value().attr("srcset").unwrap_or_default()) {
            add(&mut assets, AssetKind::Image, candidate, page_url);
        }
    }
    for meta in select(&document, "meta[property='og:image'][content]") {
        if let Some(content) = meta.value().attr("content") {
            add(&mut assets, AssetKind::Image, content, page_url);
        }
    }
    for link in select(
        &document,
        "link[rel~='icon'][href], link[rel='apple-touch-icon'][href]",
    ) {
        if let Some(href) = link.value().attr("href") {
            add(&mut assets, AssetKind::Image, href, page_url);
        }
    }

    // Fonts declared through <link> (preload and friends)
    for link in select(&document, "link[href]") {
        if let Some(href) = link.value().attr("href") {
            if has_extension(href, FONT_EXTENSIONS) {
                add(&mut assets, AssetKind::Font, href, page_url);
            }
        }
    }

    // CSS url(...) references, inline and in <style> blocks
    let mut css_sources: Vec<String> = select(&document, "[style]")
        .iter()
        .filter_map(|el| el.value().attr("style").map(str::to_string))
        .collect();
    css_sources.extend(select(&document, "style").iter().map(|s| s.text().collect()));
    for css in &css_sources {
        for reference in css_urls(css) {
            if has_extension(&reference, IMAGE_EXTENSIONS) {
                add(&mut assets, AssetKind::Image, &reference, page_url);
            } else if has_extension(&reference, FONT_EXTENSIONS) {
                add(&mut assets, AssetKind::Font, &reference, page_url);
            }
        }
    }

    // Videos
    for el in select(&document, "video[src], video source[src]") {
        if let Some(src) = el.value().attr("src") {
            add(&mut assets, AssetKind::Video, src, page_url);
        }
    }

    // Linked videos and documents
    for a in select(&document, "a[href]") {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if has_extension(href, VIDEO_EXTENSIONS) {
            add(&mut assets, AssetKind::Video, href, page_url);
        } else if has_extension(href, DOCUMENT_EXTENSIONS) {
            add(&mut assets, AssetKind::Document, href, page_url);
        }
    }

    assets
}

/// Runs a selector, returning no elements if it fails to parse
fn select<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

fn select_within<'a>(element: &ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => element.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Trimmed text content with inner whitespace collapsed
fn text_of(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn inside(element: &ElementRef, tag: &str) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .map(|e| e.name() == tag)
            .unwrap_or(false)
    })
}

fn headings(document: &Html, tag: &str) -> Vec<String> {
    select(document, tag)
        .iter()
        .map(text_of)
        .filter(|t| !t.is_empty())
        .collect()
}

fn extract_structured_data(document: &Html) -> Vec<serde_json::Value> {
    let mut blocks = Vec::new();
    for script in select(document, "script[type='application/ld+json']") {
        let raw: String = script.text().collect();
        match serde_json::from_str(raw.trim()) {
            Ok(value) => blocks.push(value),
            Err(e) => tracing::trace!("Skipping malformed JSON-LD block: {}", e),
        }
    }
    blocks
}

/// `src`, or `data-src` when `src` is missing or empty
fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    let usable = |v: &&str| !v.trim().is_empty();
    img.value()
        .attr("src")
        .filter(usable)
        .or_else(|| img.value().attr("data-src").filter(usable))
}

fn extract_images(document: &Html, page_url: &Url) -> Vec<ImageInfo> {
    select(document, "img")
        .iter()
        .filter_map(|img| {
            let src = image_source(img)?;
            let attr = |name: &str| img.value().attr(name).map(str::to_string);
            Some(ImageInfo {
                src: absolutize(src, page_url),
                alt: img.value().attr("alt").unwrap_or_default().trim().to_string(),
                width: attr("width"),
                height: attr("height"),
                loading: attr("loading"),
                srcset: attr("srcset"),
            })
        })
        .collect()
}

fn extract_links(document: &Html, page_url: &Url, base_url: &Url) -> Vec<LinkInfo> {
    select(document, "a[href]")
        .iter()
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
                return None;
            }
            let resolved = absolutize(href, page_url);
            Some(LinkInfo {
                is_internal: is_same_host(&resolved, base_url),
                href: resolved,
                text: text_of(a),
                rel: a.value().attr("rel").map(str::to_string),
            })
        })
        .collect()
}

fn extract_forms(document: &Html, page_url: &Url) -> Vec<FormInfo> {
    select(document, "form")
        .iter()
        .map(|form| {
            let action = form
                .value()
                .attr("action")
                .map(|a| absolutize(a, page_url))
                .unwrap_or_else(|| page_url.to_string());
            let method = form
                .value()
                .attr("method")
                .map(|m| m.trim().to_ascii_uppercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string());

            let inputs = select_within(form, "input, select, textarea")
                .iter()
                .map(|input| {
                    let el = input.value();
                    let input_type = match el.name() {
                        "input" => el.attr("type").unwrap_or("text").to_ascii_lowercase(),
                        other => other.to_string(),
                    };
                    InputInfo {
                        name: el.attr("name").unwrap_or_default().to_string(),
                        input_type,
                        placeholder: el.attr("placeholder").map(str::to_string),
                        required: el.attr("required").is_some(),
                    }
                })
                .collect();

            FormInfo {
                action,
                method,
                inputs,
            }
        })
        .collect()
}

fn extract_scripts(document: &Html, page_url: &Url) -> Vec<ScriptInfo> {
    select(document, "script")
        .iter()
        .filter(|s| s.value().attr("type") != Some("application/ld+json"))
        .filter_map(|script| {
            let el = script.value();
            let src = el.attr("src").map(|s| absolutize(s, page_url));
            let content = if src.is_none() {
                inline_content(script)
            } else {
                None
            };
            if src.is_none() && content.is_none() {
                return None;
            }
            Some(ScriptInfo {
                src,
                content,
                is_async: el.attr("async").is_some(),
                defer: el.attr("defer").is_some(),
            })
        })
        .collect()
}

fn extract_styles(document: &Html, page_url: &Url) -> Vec<StyleInfo> {
    let mut styles: Vec<StyleInfo> = select(document, "link[rel~='stylesheet'][href]")
        .iter()
        .filter_map(|link| {
            Some(StyleInfo {
                href: Some(absolutize(link.value().attr("href")?, page_url)),
                content: None,
                media: link.value().attr("media").map(str::to_string),
            })
        })
        .collect();

    styles.extend(select(document, "style").iter().filter_map(|style| {
        Some(StyleInfo {
            href: None,
            content: Some(inline_content(style)?),
            media: style.value().attr("media").map(str::to_string),
        })
    }));

    styles
}

fn inline_content(element: &ElementRef) -> Option<String> {
    let raw: String = element.text().collect();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(truncate_chars(trimmed, INLINE_CONTENT_LIMIT))
    }
}

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Resolved absolute form of a reference, or the trimmed input if it won't resolve
fn absolutize(raw: &str, page_url: &Url) -> String {
    resolve_href(raw, page_url)
        .map(|u| u.to_string())
        .unwrap_or_else(|| raw.trim().to_string())
}

fn add(assets: &mut AssetSets, kind: AssetKind, raw: &str, page_url: &Url) {
    if let Some(url) = resolve_href(raw, page_url) {
        if assets.insert(kind, url.to_string()) {
            tracing::trace!("Discovered {} asset {}", kind, url);
        }
    }
}

/// Lowercased path check that ignores query and fragment
fn has_extension(reference: &str, extensions: &[&str]) -> bool {
    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    extensions.iter().any(|ext| path.ends_with(ext))
}

/// URLs of each `srcset` candidate, descriptors dropped
fn srcset_urls(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .collect()
}

/// References inside CSS `url(...)` tokens, quotes stripped
fn css_urls(css: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = css;
    while let Some(start) = rest.find("url(") {
        rest = &rest[start + 4..];
        let Some(end) = rest.find(')') else {
            break;
        };
        let reference = rest[..end].trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if !reference.is_empty() && !reference.starts_with("data:") {
            urls.push(reference.to_string());
        }
        rest = &rest[end + 1..];
    }
    urls
}
