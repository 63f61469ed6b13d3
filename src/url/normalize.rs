use url::Url;

/// Schemes that are kept verbatim and never treated as pages
const OPAQUE_SCHEMES: &[&str] = &["mailto:", "tel:"];

/// Schemes that never point at a fetchable resource
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "blob:"];

/// Normalizes a URL against the site's base URL
///
/// # Normalization Steps
///
/// 1. `mailto:` and `tel:` links are returned unchanged
/// 2. Scheme-relative `//host/path` links take the base URL's scheme
/// 3. Relative links are resolved against the base URL
/// 4. The fragment is removed
/// 5. A trailing slash is removed (except for the root `/`)
///
/// Malformed input is returned unchanged rather than rejected, and the
/// function is idempotent: normalizing a normalized URL is a no-op.
///
/// # Examples
///
/// ```
/// use sitelift::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(normalize_url("/about/", &base), "https://example.com/about");
/// assert_eq!(normalize_url("//cdn.example.com/x", &base), "https://cdn.example.com/x");
/// assert_eq!(normalize_url("mailto:hi@example.com", &base), "mailto:hi@example.com");
/// ```
pub fn normalize_url(raw: &str, base: &Url) -> String {
    let trimmed = raw.trim();

    if is_opaque(trimmed) {
        return raw.to_string();
    }

    let expanded = expand_scheme_relative(trimmed, base);

    let mut url = match base.join(&expanded) {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };

    url.set_fragment(None);

    if !url.cannot_be_a_base() {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let stripped = path.trim_end_matches('/');
            let stripped = if stripped.is_empty() { "/" } else { stripped }.to_string();
            url.set_path(&stripped);
        }
    }

    url.to_string()
}

/// Resolves an href to an absolute http(s) URL, for asset and link collection
///
/// Returns None if the reference should be excluded:
/// - empty or fragment-only references
/// - javascript:, mailto:, tel:, data: and blob: schemes
/// - references that fail to resolve
/// - non-HTTP(S) URLs after resolution
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|s| lowered.starts_with(s)) {
        return None;
    }

    let mut url = base.join(&expand_scheme_relative(href, base)).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Returns true if the URL names a page the crawler may render
pub fn is_crawlable(url: &str) -> bool {
    if is_opaque(url.trim()) {
        return false;
    }
    Url::parse(url)
        .map(|u| u.scheme() == "http" || u.scheme() == "https")
        .unwrap_or(false)
}

/// Compares the host of `href` (resolved against `base`) with the base host
///
/// Any resolution failure classifies the link as external.
pub fn is_same_host(href: &str, base: &Url) -> bool {
    let Some(base_host) = base.host_str() else {
        return false;
    };

    match base.join(&expand_scheme_relative(href.trim(), base)) {
        Ok(resolved) => resolved
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(base_host))
            .unwrap_or(false),
        Err(_) => false,
    }
}

fn is_opaque(url: &str) -> bool {
    let lowered = url.to_ascii_lowercase();
    OPAQUE_SCHEMES.iter().any(|s| lowered.starts_with(s))
}

fn expand_scheme_relative(href: &str, base: &Url) -> String {
    if href.starts_with("//") {
        format!("{}:{}", base.scheme(), href)
    } else {
        href.to_string()
    }
}
