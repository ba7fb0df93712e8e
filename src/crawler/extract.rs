//! Main content extraction and chrome stripping
//!
//! A fetched page is reduced to the markup inside its main content
//! container before anything else happens to it. Site chrome (navigation,
//! banners, scripts, hidden elements) is dropped during extraction, and
//! links are only collected from the markup that survives.

use crate::html::{serialize_children, text_of, TagPlan, Transform};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Containers tried in order when locating the main content
const CONTENT_SELECTORS: &[&str] = &["main", "#main-content", "article", ".content"];

/// Class names that mark accessibility skip links
const SKIP_CLASSES: &[&str] = &["skip-link", "skip-to-content", "sr-only"];

/// The usable parts of one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Page title: first `h1` in the content, else the document `<title>`
    pub title: Option<String>,
    /// Serialized content markup with chrome stripped
    pub content: String,
    /// Raw `href` values found in the kept content, in document order
    pub links: Vec<String>,
}

/// Extracts the main content, title, and links from a fetched page
///
/// The first matching container from `main`, `#main-content`, `article`,
/// `.content` is used. Returns `None` when no container matches; such a
/// page carries no extractable content and is dropped from the crawl.
pub fn extract_page(html: &str) -> Option<ExtractedPage> {
    let doc = Html::parse_document(html);

    let container = find_container(&doc)?;

    let mut strip = ChromeStrip { links: Vec::new() };
    let mut content = String::new();
    serialize_children(&container, &mut content, &mut strip);

    let title = first_heading_text(&container).or_else(|| document_title(&doc));

    Some(ExtractedPage {
        title,
        content,
        links: strip.links,
    })
}

fn find_container(doc: &Html) -> Option<ElementRef> {
    for selector in CONTENT_SELECTORS {
        if let Some(el) = Selector::parse(selector)
            .ok()
            .and_then(|sel| doc.select(&sel).next())
        {
            debug!(selector, "Content container found");
            return Some(el);
        }
    }
    None
}

fn first_heading_text(container: &ElementRef) -> Option<String> {
    let sel = Selector::parse("h1").ok()?;
    container
        .select(&sel)
        .next()
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty())
}

fn document_title(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel)
        .next()
        .map(|el| text_of(&el))
        .filter(|t| !t.is_empty())
}

/// Drops site chrome while collecting links from what remains
struct ChromeStrip {
    links: Vec<String>,
}

impl ChromeStrip {
    fn is_chrome(el: &ElementRef) -> bool {
        let value = el.value();
        if matches!(
            value.name(),
            "nav" | "header" | "footer" | "script" | "style" | "noscript"
        ) {
            return true;
        }

        if value.attr("hidden").is_some() || value.attr("aria-hidden") == Some("true") {
            return true;
        }

        value
            .classes()
            .any(|c| SKIP_CLASSES.contains(&c))
    }
}

impl Transform for ChromeStrip {
    fn plan(&mut self, el: &ElementRef) -> TagPlan {
        // plan() only runs for kept elements, so links inside stripped
        // chrome are never collected
        if el.value().name() == "a" {
            if let Some(href) = el.value().attr("href") {
                self.links.push(href.to_string());
            }
        }
        TagPlan::from_element(el)
    }

    fn keep(&mut self, el: &ElementRef) -> bool {
        !Self::is_chrome(el)
    }
}
