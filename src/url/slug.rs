use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap, HashSet};
use url::Url;

/// Hex characters of the URL hash appended to a colliding slug
const SLUG_HASH_LEN: usize = 8;

/// Derives a filesystem-safe slug from a page URL's path
///
/// Leading and trailing slashes are dropped, inner slashes become `-`, and
/// anything outside `[A-Za-z0-9_-]` is replaced with `-`. The site root
/// maps to `index`. Unparseable input is slugged as if it were a path.
///
/// # Examples
///
/// ```
/// use sitelift::url::slug_for;
///
/// assert_eq!(slug_for("https://example.com/"), "index");
/// assert_eq!(slug_for("https://example.com/blog/first-post/"), "blog-first-post");
/// ```
pub fn slug_for(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.to_string(),
    };

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return "index".to_string();
    }

    let slug: String = trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    // Collapse runs produced by replaced characters
    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let collapsed = collapsed.trim_matches('-');
    if collapsed.is_empty() {
        "index".to_string()
    } else {
        collapsed.to_string()
    }
}

/// Assigns every URL a slug no other URL in the set shares
///
/// URLs are processed in sorted order so the result is stable across runs.
/// The first URL to claim a slug keeps it; later claimants (`/a/b` after
/// `/a-b`, or `/shop?page=2` after `/shop`) get the first 8 hex characters
/// of their URL hash appended.
///
/// ```
/// use sitelift::url::assign_slugs;
///
/// let slugs = assign_slugs(["https://example.com/shop", "https://example.com/shop?page=2"]);
/// assert_eq!(slugs["https://example.com/shop"], "shop");
/// assert!(slugs["https://example.com/shop?page=2"].starts_with("shop-"));
/// ```
pub fn assign_slugs<'a>(urls: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let sorted: BTreeSet<&str> = urls.into_iter().collect();
    let mut claimed = HashSet::new();
    let mut slugs = HashMap::with_capacity(sorted.len());

    for url in sorted {
        let mut slug = slug_for(url);
        if !claimed.insert(slug.clone()) {
            let hash = hex::encode(Sha256::digest(url.as_bytes()));
            slug = format!("{}-{}", slug, &hash[..SLUG_HASH_LEN]);
            claimed.insert(slug.clone());
            tracing::debug!("Slug collision for {}, using {}", url, slug);
        }
        slugs.insert(url.to_string(), slug);
    }

    slugs
}
