//! Markdown report generation
//!
//! This module renders the human-readable companions of the JSON outputs:
//! `CRAWL_REPORT.md` for the crawl phase and `ASSET_GUIDE.md` for the asset
//! pipeline.

use crate::crawler::CrawlStats;
use crate::imaging::{BREAKPOINTS, OUTPUT_EXTENSION};
use crate::state::{AssetManifest, AssetStatus, FileAsset, NavItem, SiteStructure};

/// Formats a byte count with a binary unit
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Markdown table cells must not contain pipes or newlines
fn cell(text: &str) -> String {
    let flat = text.replace('|', "\\|").replace(['\n', '\r'], " ");
    if flat.trim().is_empty() {
        "-".to_string()
    } else {
        flat
    }
}

/// Formats the crawl report
///
/// # Arguments
///
/// * `site` - The crawl's site structure
/// * `stats` - Counters collected while crawling
///
/// # Returns
///
/// A formatted markdown string
pub fn format_crawl_report(site: &SiteStructure, stats: &CrawlStats) -> String {
    let mut md = String::new();
    let summary = site.summary();

    md.push_str("# Site Crawl Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", site.base_url()));
    md.push_str(&format!("- **Crawled At**: {}\n", site.crawled_at().to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        stats.duration.as_secs_f64()
    ));
    md.push_str(&format!("- **Pages Requested**: {}\n\n", stats.attempted));

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Pages captured | {} |\n", stats.captured));
    md.push_str(&format!("| Pages failed | {} |\n", stats.failed));
    md.push_str(&format!("| Pages skipped | {} |\n", stats.skipped));
    if stats.cancelled > 0 {
        md.push_str(&format!("| Pages cancelled | {} |\n", stats.cancelled));
    }
    md.push_str(&format!("| Images | {} |\n", summary.total_images));
    md.push_str(&format!("| Fonts | {} |\n", summary.total_fonts));
    md.push_str(&format!("| Videos | {} |\n", summary.total_videos));
    md.push_str(&format!("| Documents | {} |\n", summary.total_documents));
    md.push_str(&format!(
        "\n**Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if site.page_count() > 0 {
        md.push_str("## Pages\n\n");
        md.push_str("| URL | Title | H1 | Links (internal) | Images | Forms |\n");
        md.push_str("|-----|-------|----|------------------|--------|-------|\n");
        for page in site.pages() {
            md.push_str(&format!(
                "| {} | {} | {} | {} ({}) | {} | {} |\n",
                page.url,
                cell(&page.title),
                page.headings.h1.len(),
                page.links.len(),
                page.internal_link_count(),
                page.images.len(),
                page.forms.len()
            ));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Failures\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for failure in &stats.failures {
            md.push_str(&format!("| {} | {} |\n", failure.url, cell(&failure.error)));
        }
        md.push('\n');
    }

    md.push_str("## Navigation\n\n");
    let navigation = site.navigation();
    if navigation.is_empty() {
        md.push_str("No navigation was extracted.\n");
    } else {
        md.push_str("### Header\n\n");
        push_nav_tree(&mut md, &navigation.header, 0);
        md.push_str("\n### Footer\n\n");
        push_nav_tree(&mut md, &navigation.footer, 0);
    }

    md
}

fn push_nav_tree(md: &mut String, items: &[NavItem], depth: usize) {
    if items.is_empty() && depth == 0 {
        md.push_str("_none_\n");
        return;
    }
    for item in items {
        let indent = "  ".repeat(depth);
        if item.href.is_empty() {
            md.push_str(&format!("{}- {}\n", indent, item.text));
        } else {
            md.push_str(&format!("{}- [{}]({})\n", indent, item.text, item.href));
        }
        push_nav_tree(md, &item.children, depth + 1);
    }
}

/// Formats the asset guide
///
/// # Arguments
///
/// * `manifest` - The asset pipeline's manifest
///
/// # Returns
///
/// A formatted markdown string
pub fn format_asset_guide(manifest: &AssetManifest) -> String {
    let mut md = String::new();
    let summary = &manifest.summary;

    md.push_str("# Asset Guide\n\n");
    md.push_str(&format!("- **Base URL**: {}\n", manifest.base_url));
    md.push_str(&format!(
        "- **Generated At**: {}\n\n",
        manifest.generated_at.to_rfc3339()
    ));

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Images | {} |\n", summary.total_images));
    md.push_str(&format!("| Downloaded | {} |\n", summary.total_downloaded));
    md.push_str(&format!("| Optimized | {} |\n", summary.total_optimized));
    md.push_str(&format!("| Failed | {} |\n", summary.total_failed));
    md.push_str(&format!(
        "| Original size | {} |\n",
        format_bytes(summary.original_size_bytes)
    ));
    md.push_str(&format!(
        "| Optimized size | {} |\n",
        format_bytes(summary.optimized_size_bytes)
    ));
    md.push_str(&format!("| Savings | {}% |\n", summary.savings_percent));
    md.push_str(&format!("| Fonts | {} |\n", manifest.fonts.len()));
    md.push_str(&format!("| Videos | {} |\n", manifest.videos.len()));
    md.push_str(&format!("| Documents | {} |\n\n", manifest.documents.len()));

    md.push_str("## Directory Layout\n\n");
    md.push_str("```text\n");
    md.push_str("asset-data/\n");
    md.push_str("  images/original/      downloaded originals\n");
    md.push_str(&format!(
        "  images/optimized/     full-size .{} re-encodes\n",
        OUTPUT_EXTENSION
    ));
    md.push_str("  images/responsive/    <name>-<tier> resized copies\n");
    md.push_str("  fonts/\n");
    md.push_str("  videos/\n");
    md.push_str("  documents/\n");
    md.push_str("  asset-manifest.json\n");
    md.push_str("```\n\n");

    md.push_str("## Responsive Tiers\n\n");
    md.push_str("| Tier | Width |\n");
    md.push_str("|------|-------|\n");
    for bp in BREAKPOINTS {
        md.push_str(&format!("| {} | {}px |\n", bp.name, bp.width));
    }
    md.push_str("\nA tier is generated only when the source image is at least that wide.\n\n");

    if !manifest.images.is_empty() {
        md.push_str("## Images\n\n");
        md.push_str("| File | Dimensions | Original | Optimized | Variants | Status |\n");
        md.push_str("|------|------------|----------|-----------|----------|--------|\n");
        for image in &manifest.images {
            let dimensions = match (image.width, image.height) {
                (Some(w), Some(h)) => format!("{}x{}", w, h),
                _ => "-".to_string(),
            };
            let variants = if image.variants.is_empty() {
                "-".to_string()
            } else {
                image
                    .variants
                    .iter()
                    .map(|v| v.tier.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                cell(&image.filename),
                dimensions,
                format_bytes(image.original_size),
                format_bytes(image.effective_size()),
                variants,
                image.status()
            ));
        }
        md.push('\n');
    }

    push_file_section(&mut md, "Fonts", &manifest.fonts);
    push_file_section(&mut md, "Videos", &manifest.videos);
    push_file_section(&mut md, "Documents", &manifest.documents);

    let failed: Vec<(&str, &str)> = manifest
        .images
        .iter()
        .filter(|i| i.status() == AssetStatus::Failed)
        .map(|i| (i.url.as_str(), i.error.as_deref().unwrap_or("unknown error")))
        .chain(
            manifest
                .fonts
                .iter()
                .chain(&manifest.videos)
                .chain(&manifest.documents)
                .filter(|f| f.status() == AssetStatus::Failed)
                .map(|f| (f.url.as_str(), f.error.as_deref().unwrap_or("unknown error"))),
        )
        .collect();
    if !failed.is_empty() {
        md.push_str("## Failed Downloads\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");
        for (url, error) in failed {
            md.push_str(&format!("| {} | {} |\n", url, cell(error)));
        }
        md.push('\n');
    }

    md.push_str("## Usage\n\n");
    md.push_str("Serve the responsive copies with a `<picture>` element:\n\n");
    md.push_str("```html\n");
    md.push_str("<picture>\n");
    for bp in BREAKPOINTS.iter().rev() {
        md.push_str(&format!(
            "  <source media=\"(min-width: {}px)\" srcset=\"images/responsive/hero-{}.{}\" type=\"image/{}\">\n",
            bp.width, bp.name, OUTPUT_EXTENSION, OUTPUT_EXTENSION
        ));
    }
    md.push_str(&format!(
        "  <img src=\"images/optimized/hero.{}\" alt=\"\" loading=\"lazy\">\n",
        OUTPUT_EXTENSION
    ));
    md.push_str("</picture>\n");
    md.push_str("```\n");

    md
}

fn push_file_section(md: &mut String, title: &str, files: &[FileAsset]) {
    if files.is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n\n", title));
    md.push_str("| File | Size | Status |\n");
    md.push_str("|------|------|--------|\n");
    for file in files {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&file.filename),
            format_bytes(file.size),
            file.status()
        ));
    }
    md.push('\n');
}
