//! Exclusion rules applied to image URLs before any network request

use url::Url;

const TRACKING_MARKERS: &[&str] = &["pixel", "tracking"];
const ONE_BY_ONE_MARKERS: &[&str] = &["1x1", "width=1&height=1"];

/// Why an image URL is not worth downloading, if it isn't
///
/// # Rules
///
/// - `data:` URLs are already inline
/// - filenames mentioning `pixel` or `tracking` are beacons
/// - queries declaring `1x1` or `width=1&height=1` are spacers
pub fn exclusion_reason(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    if trimmed
        .get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
    {
        return Some("data URL");
    }

    let Ok(url) = Url::parse(trimmed) else {
        return None;
    };

    let filename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if TRACKING_MARKERS.iter().any(|m| filename.contains(m)) {
        return Some("tracking pixel");
    }

    let query = url.query().unwrap_or_default().to_ascii_lowercase();
    if ONE_BY_ONE_MARKERS.iter().any(|m| query.contains(m)) {
        return Some("1x1 spacer");
    }

    None
}

pub fn is_excluded(raw: &str) -> bool {
    exclusion_reason(raw).is_some()
}
