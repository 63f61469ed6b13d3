//! Deterministic local filenames for downloaded assets

use crate::state::AssetKind;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use url::Url;

/// Hex characters of the URL hash used for synthesized names
const SYNTH_HASH_LEN: usize = 16;
/// Hex characters of the URL hash used to break name collisions
const SUFFIX_HASH_LEN: usize = 8;

fn url_hash(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Extension used when a URL path carries none
pub fn default_extension(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Image => "jpg",
        AssetKind::Font => "woff2",
        AssetKind::Video => "mp4",
        AssetKind::Document => "pdf",
    }
}

/// Replaces unsafe characters with `_` and strips leading dots
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

/// Splits a filename at its last dot
///
/// `("logo", Some("png"))` for `logo.png`; no extension when the dot is
/// first or last.
pub fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < filename.len() => {
            (&filename[..idx], Some(&filename[idx + 1..]))
        }
        _ => (filename, None),
    }
}

/// Local filename for an asset URL
///
/// The path basename is used when it has an extension; otherwise the name is
/// the first 16 hex characters of the URL's SHA-256 plus a per-category
/// extension.
pub fn filename_for(url: &str, kind: AssetKind) -> String {
    let basename = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .map(|segment| sanitize(&segment))
        .unwrap_or_default();

    if let (_, Some(_)) = split_extension(&basename) {
        return basename;
    }

    format!(
        "{}.{}",
        &url_hash(url)[..SYNTH_HASH_LEN],
        default_extension(kind)
    )
}

/// Assigns a unique filename to every URL of one category
///
/// URLs are processed in sorted order; the first claim keeps the plain name
/// and later ones get an 8-hex hash suffix. Images compare by stem because
/// every optimized copy shares the same output extension.
pub fn assign_filenames(urls: &[String], kind: AssetKind) -> Vec<(String, String)> {
    let mut sorted: Vec<&String> = urls.iter().collect();
    sorted.sort();
    sorted.dedup();

    let key = |name: &str| -> String {
        let name = name.to_ascii_lowercase();
        match kind {
            AssetKind::Image => split_extension(&name).0.to_string(),
            _ => name,
        }
    };

    let mut claimed = HashSet::new();
    sorted
        .into_iter()
        .map(|url| {
            let mut filename = filename_for(url, kind);
            if !claimed.insert(key(&filename)) {
                let suffix = &url_hash(url)[..SUFFIX_HASH_LEN];
                filename = match split_extension(&filename) {
                    (stem, Some(ext)) => format!("{}-{}.{}", stem, suffix, ext),
                    (stem, None) => format!("{}-{}", stem, suffix),
                };
                claimed.insert(key(&filename));
                tracing::debug!("Name collision for {}, using {}", url, filename);
            }
            (url.clone(), filename)
        })
        .collect()
}
