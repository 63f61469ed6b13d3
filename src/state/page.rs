//! Page metadata records produced by the page extractor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured metadata for one rendered page
///
/// `url` is the dedup key. Images and links hold URLs by value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
    pub canonical: Option<String>,
    /// Open Graph properties keyed without the `og:` prefix
    pub og_tags: BTreeMap<String, String>,
    /// Parsed JSON-LD blocks in document order
    pub structured_data: Vec<serde_json::Value>,
    pub headings: Headings,
    pub images: Vec<ImageInfo>,
    pub links: Vec<LinkInfo>,
    pub forms: Vec<FormInfo>,
    pub scripts: Vec<ScriptInfo>,
    pub styles: Vec<StyleInfo>,
}

impl PageMetadata {
    /// Number of links pointing at the base host
    pub fn internal_link_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_internal).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    pub is_internal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub inputs: Vec<InputInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub defer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// One entry of a header or footer navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub text: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

/// Header and footer link trees, extracted once from the homepage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub header: Vec<NavItem>,
    pub footer: Vec<NavItem>,
}

impl Navigation {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.footer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_keys() {
        let page = PageMetadata {
            url: "https://example.com/".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("ogTags").is_some());
        assert!(json.get("structuredData").is_some());
        assert!(json["headings"].get("h1").is_some());
    }

    #[test]
    fn test_optional_image_fields_omitted() {
        let image = ImageInfo {
            src: "https://example.com/a.png".to_string(),
            alt: String::new(),
            width: None,
            height: None,
            loading: Some("lazy".to_string()),
            srcset: None,
        };
        let json = serde_json::to_value(&image).unwrap();
        assert!(json.get("width").is_none());
        assert_eq!(json["loading"], "lazy");
    }

    #[test]
    fn test_internal_link_count() {
        let page = PageMetadata {
            links: vec![
                LinkInfo {
                    href: "https://example.com/a".to_string(),
                    text: "A".to_string(),
                    rel: None,
                    is_internal: true,
                },
                LinkInfo {
                    href: "https://other.com/".to_string(),
                    text: "Other".to_string(),
                    rel: Some("noopener".to_string()),
                    is_internal: false,
                },
            ],
            ..Default::default()
        };
        assert_eq!(page.internal_link_count(), 1);
    }
}
