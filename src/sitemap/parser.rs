//! Parse sitemap.xml and sitemap index files.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Locations found in one sitemap document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSitemap {
    /// `<urlset><url><loc>` entries, in document order.
    pub urls: Vec<String>,
    /// `<sitemapindex><sitemap><loc>` entries, in document order.
    pub sitemaps: Vec<String>,
}

impl ParsedSitemap {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.sitemaps.is_empty()
    }
}

/// Parse a sitemap XML string.
///
/// Handles both `urlset` documents and sitemap indexes; the caller decides
/// whether to follow index entries.
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut parsed = ParsedSitemap::default();
    let mut buf = Vec::new();

    let mut in_url = false;
    let mut in_sitemap = false;
    let mut in_loc = false;
    let mut current_loc = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"url" => {
                    in_url = true;
                    current_loc.clear();
                }
                b"sitemap" => {
                    in_sitemap = true;
                    current_loc.clear();
                }
                b"loc" => in_loc = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"url" if in_url => {
                    if !current_loc.is_empty() {
                        parsed.urls.push(current_loc.clone());
                    }
                    in_url = false;
                }
                b"sitemap" if in_sitemap => {
                    if !current_loc.is_empty() {
                        parsed.sitemaps.push(current_loc.clone());
                    }
                    in_sitemap = false;
                }
                b"loc" => in_loc = false,
                _ => {}
            },
            Event::Text(e) if in_loc && (in_url || in_sitemap) => {
                let text = e.unescape().unwrap_or_default();
                current_loc = text.trim().to_string();
            }
            Event::CData(e) if in_loc && (in_url || in_sitemap) => {
                current_loc = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url>
            <loc>https://example.com/</loc>
            <priority>1.0</priority>
          </url>
          <url>
            <loc>https://example.com/about</loc>
            <lastmod>2024-01-15</lastmod>
          </url>
        </urlset>"#;

        let parsed = parse_sitemap(xml).unwrap();
        assert_eq!(
            parsed.urls,
            vec!["https://example.com/", "https://example.com/about"]
        );
        assert!(parsed.sitemaps.is_empty());
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
          <sitemap><loc>https://example.com/sitemap-posts.xml</loc></sitemap>
        </sitemapindex>"#;

        let parsed = parse_sitemap(xml).unwrap();
        assert!(parsed.urls.is_empty());
        assert_eq!(parsed.sitemaps.len(), 2);
    }

    #[test]
    fn test_parse_escaped_and_cdata_locs() {
        let xml = r#"<urlset>
          <url><loc>https://example.com/?a=1&amp;b=2</loc></url>
          <url><loc><![CDATA[https://example.com/cdata]]></loc></url>
        </urlset>"#;

        let parsed = parse_sitemap(xml).unwrap();
        assert_eq!(
            parsed.urls,
            vec!["https://example.com/?a=1&b=2", "https://example.com/cdata"]
        );
    }

    #[test]
    fn test_url_without_loc_skipped() {
        let xml = "<urlset><url><lastmod>2024-01-01</lastmod></url></urlset>";
        let parsed = parse_sitemap(xml).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_error() {
        assert!(parse_sitemap("<urlset><url><loc>x</url></urlset>").is_err());
    }
}
