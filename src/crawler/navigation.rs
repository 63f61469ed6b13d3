//! Header and footer navigation extraction
//!
//! Runs once per crawl against the homepage HTML. Nested lists become
//! child items; a navigation region without lists yields a flat list of
//! its links.

use crate::state::{NavItem, Navigation};
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const HEADER_ROOTS: &[&str] = &["header nav", "nav", "header"];
const FOOTER_ROOTS: &[&str] = &["footer nav", "footer"];

/// Extracts header and footer link trees from homepage HTML
pub fn extract_navigation(html: &str, page_url: &Url) -> Navigation {
    let document = Html::parse_document(html);

    Navigation {
        header: first_root(&document, HEADER_ROOTS)
            .map(|root| items_in(&root, page_url))
            .unwrap_or_default(),
        footer: first_root(&document, FOOTER_ROOTS)
            .map(|root| items_in(&root, page_url))
            .unwrap_or_default(),
    }
}

fn first_root<'a>(document: &'a Html, candidates: &[&str]) -> Option<ElementRef<'a>> {
    candidates.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    })
}

fn items_in(root: &ElementRef, page_url: &Url) -> Vec<NavItem> {
    if let Some(list) = first_descendant(root, "ul, ol") {
        return list_items(&list, page_url);
    }

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    root.select(&selector)
        .filter_map(|a| link_item(&a, page_url))
        .collect()
}

fn list_items(list: &ElementRef, page_url: &Url) -> Vec<NavItem> {
    list.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .filter_map(|li| {
            let children = first_descendant(&li, "ul, ol")
                .map(|nested| list_items(&nested, page_url))
                .unwrap_or_default();

            match own_link(&li).and_then(|a| link_item(&a, page_url)) {
                Some(mut item) => {
                    item.children = children;
                    Some(item)
                }
                None if !children.is_empty() => Some(NavItem {
                    text: label_of(&li),
                    href: String::new(),
                    children,
                }),
                None => None,
            }
        })
        .collect()
}

fn first_descendant<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// The first link of a list item that is not part of a nested list
fn own_link<'a>(li: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let selector = Selector::parse("a[href]").ok()?;
    li.select(&selector).find(|a| {
        !a.ancestors()
            .take_while(|node| node.id() != li.id())
            .any(|node| {
                node.value()
                    .as_element()
                    .map(|e| e.name() == "ul" || e.name() == "ol")
                    .unwrap_or(false)
            })
    })
}

fn link_item(a: &ElementRef, page_url: &Url) -> Option<NavItem> {
    let raw = a.value().attr("href")?.trim();
    let href = resolve_href(raw, page_url)
        .map(|u| u.to_string())
        .unwrap_or_else(|| raw.to_string());
    let text = collapse(a.text());
    if text.is_empty() && href.is_empty() {
        return None;
    }
    Some(NavItem {
        text,
        href,
        children: Vec::new(),
    })
}

/// Text of a list item excluding its nested lists
fn label_of(li: &ElementRef) -> String {
    let own_text = li
        .children()
        .filter(|node| {
            node.value()
                .as_element()
                .map(|e| e.name() != "ul" && e.name() != "ol")
                .unwrap_or(true)
        })
        .flat_map(|node| match ElementRef::wrap(node) {
            Some(el) => el.text().map(str::to_string).collect::<Vec<_>>(),
            None => node
                .value()
                .as_text()
                .map(|t| vec![t.to_string()])
                .unwrap_or_default(),
        })
        .collect::<Vec<_>>();
    collapse(own_text.iter().map(String::as_str))
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
