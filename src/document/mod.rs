//! Document model: crawled pages, the page forest, and the anchor map

pub mod anchors;
pub mod tree;

pub use anchors::{slugify, AnchorMap};
pub use tree::{build_forest, forest_from_parents, forest_from_paths, PageNode};

/// One crawled page
///
/// Created only by the crawl engine. The content field is replaced by the
/// content normalizer; everything else is immutable after the crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Canonical absolute URL, globally unique within a crawl run
    pub url: String,

    /// Extracted heading text or URL-derived fallback
    pub title: String,

    /// Main-content HTML fragment, already stripped of chrome
    pub content: String,

    /// The page that linked to this one first; None for crawl roots
    pub parent_url: Option<String>,

    /// Crawl recursion depth at which the page was first discovered
    pub depth: u32,

    /// Ordering hint among siblings (order of appearance in the parent)
    pub display_order: u32,
}
