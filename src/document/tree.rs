//! Page tree builder: flat page lists into a forest of page nodes
//!
//! Two interchangeable strategies: explicit parent references recorded during
//! the crawl, or parent/child inference from URL path segmentation when no
//! parent linkage is available. Either way the forest contains every input
//! page exactly once.

use crate::document::Page;
use std::collections::HashMap;
use url::Url;

/// A page together with its ordered children
#[derive(Debug, Clone)]
pub struct PageNode {
    pub page: Page,
    pub children: Vec<PageNode>,
}

impl PageNode {
    /// Number of nodes in this subtree, including self
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(PageNode::count).sum::<usize>()
    }
}

/// Builds a forest from a flat page list
///
/// Uses the explicit-parent strategy when at least one record carries a
/// parent reference, and falls back to path inference otherwise.
pub fn build_forest(pages: Vec<Page>) -> Vec<PageNode> {
    if pages.iter().any(|p| p.parent_url.is_some()) {
        forest_from_parents(pages)
    } else {
        forest_from_paths(pages)
    }
}

/// Groups pages under their recorded `parent_url`
///
/// Pages whose parent is absent or unknown become forest roots. A parent
/// cycle (possible only for page lists built outside the crawl engine) is
/// broken by promoting the first unattached page, in input order, to a root.
pub fn forest_from_parents(pages: Vec<Page>) -> Vec<PageNode> {
    let url_to_idx: HashMap<String, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, p)| (p.url.clone(), i))
        .collect();

    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        match page.parent_url.as_ref().and_then(|u| url_to_idx.get(u)) {
            // Self-parenting is treated as no parent
            Some(&p) if p != i => children_of.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    assemble(pages, roots, children_of)
}

/// Infers parent/child relationships from URL path segmentation
///
/// Each page attaches to the closest crawled ancestor found by shortening
/// its path one segment at a time; a page with no crawled ancestor becomes a
/// root. Pages whose intermediate path segments were never crawled still
/// attach to the nearest crawled ancestor rather than being dropped.
pub fn forest_from_paths(pages: Vec<Page>) -> Vec<PageNode> {
    let url_to_idx: HashMap<String, usize> = pages
        .iter()
        .enumerate()
        .map(|(i, p)| (p.url.trim_end_matches('/').to_string(), i))
        .collect();

    let mut children_of: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        match find_path_ancestor(&page.url, &url_to_idx) {
            Some(p) if p != i => children_of.entry(p).or_default().push(i),
            _ => roots.push(i),
        }
    }

    assemble(pages, roots, children_of)
}

/// Finds the closest strict path-prefix ancestor among known pages
fn find_path_ancestor(url_str: &str, url_to_idx: &HashMap<String, usize>) -> Option<usize> {
    let url = Url::parse(url_str).ok()?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    for keep in (0..segments.len()).rev() {
        let mut candidate = url.clone();
        let path = format!("/{}", segments[..keep].join("/"));
        candidate.set_path(&path);
        let key = candidate.as_str().trim_end_matches('/');
        if let Some(&idx) = url_to_idx.get(key) {
            return Some(idx);
        }
    }

    None
}

/// Turns the index-level structure into owned PageNodes
///
/// Children are ordered by `display_order` (stable, so input order breaks
/// ties). Every page ends up in the forest exactly once; anything left
/// unattached after the roots are built is promoted to a root in input order.
fn assemble(
    pages: Vec<Page>,
    roots: Vec<usize>,
    mut children_of: HashMap<usize, Vec<usize>>,
) -> Vec<PageNode> {
    for children in children_of.values_mut() {
        children.sort_by_key(|&i| pages[i].display_order);
    }

    let total = pages.len();
    let mut slots: Vec<Option<Page>> = pages.into_iter().map(Some).collect();
    let mut forest = Vec::new();

    for root in roots {
        if let Some(node) = take_node(root, &mut slots, &children_of) {
            forest.push(node);
        }
    }

    // Promote anything a parent cycle left unattached
    for i in 0..total {
        if slots[i].is_some() {
            if let Some(node) = take_node(i, &mut slots, &children_of) {
                forest.push(node);
            }
        }
    }

    forest
}

fn take_node(
    idx: usize,
    slots: &mut Vec<Option<Page>>,
    children_of: &HashMap<usize, Vec<usize>>,
) -> Option<PageNode> {
    let page = slots[idx].take()?;
    let mut children = Vec::new();

    if let Some(child_indices) = children_of.get(&idx) {
        for &child in child_indices {
            if let Some(node) = take_node(child, slots, children_of) {
                children.push(node);
            }
        }
    }

    Some(PageNode { page, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, parent: Option<&str>, depth: u32, order: u32) -> Page {
        Page {
            url: url.to_string(),
            title: url.rsplit('/').next().unwrap_or(url).to_string(),
            content: String::new(),
            parent_url: parent.map(str::to_string),
            depth,
            display_order: order,
        }
    }

    fn forest_urls(forest: &[PageNode]) -> Vec<String> {
        fn walk(node: &PageNode, out: &mut Vec<String>) {
            out.push(node.page.url.clone());
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        for node in forest {
            walk(node, &mut out);
        }
        out
    }

    #[test]
    fn test_explicit_parents_basic() {
        let pages = vec![
            page("https://e.com/a", None, 0, 0),
            page("https://e.com/a/b", Some("https://e.com/a"), 1, 0),
            page("https://e.com/a/c", Some("https://e.com/a"), 1, 1),
        ];
        let forest = forest_from_parents(pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 2);
        assert_eq!(forest[0].children[0].page.url, "https://e.com/a/b");
        assert_eq!(forest[0].children[1].page.url, "https://e.com/a/c");
    }

    #[test]
    fn test_unknown_parent_becomes_root() {
        let pages = vec![
            page("https://e.com/a", None, 0, 0),
            page("https://e.com/x", Some("https://e.com/never-crawled"), 1, 0),
        ];
        let forest = forest_from_parents(pages);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_children_ordered_by_display_order() {
        let pages = vec![
            page("https://e.com/a", None, 0, 0),
            page("https://e.com/a/late", Some("https://e.com/a"), 1, 5),
            page("https://e.com/a/early", Some("https://e.com/a"), 1, 1),
        ];
        let forest = forest_from_parents(pages);
        let children: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|c| c.page.url.as_str())
            .collect();
        assert_eq!(children, vec!["https://e.com/a/early", "https://e.com/a/late"]);
    }

    #[test]
    fn test_forest_completeness_explicit() {
        let pages = vec![
            page("https://e.com/a", None, 0, 0),
            page("https://e.com/a/b", Some("https://e.com/a"), 1, 0),
            page("https://e.com/c", None, 0, 1),
            page("https://e.com/c/d", Some("https://e.com/c"), 1, 0),
        ];
        let expected: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
        let forest = forest_from_parents(pages);
        let mut urls = forest_urls(&forest);
        urls.sort();
        let mut want = expected;
        want.sort();
        assert_eq!(urls, want);
    }

    #[test]
    fn test_parent_cycle_promoted_to_root() {
        // Not producible by the crawl engine, but the forest invariant must
        // hold for any input.
        let pages = vec![
            page("https://e.com/a", Some("https://e.com/b"), 1, 0),
            page("https://e.com/b", Some("https://e.com/a"), 1, 0),
        ];
        let forest = forest_from_parents(pages);
        let total: usize = forest.iter().map(PageNode::count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_path_inference_basic() {
        let pages = vec![
            page("https://e.com/docs", None, 0, 0),
            page("https://e.com/docs/setup", None, 0, 1),
            page("https://e.com/docs/setup/linux", None, 0, 2),
        ];
        let forest = forest_from_paths(pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].page.url, "https://e.com/docs");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].children.len(), 1);
    }

    #[test]
    fn test_path_inference_skips_uncrawled_segments() {
        // /docs/a/b exists but /docs/a was never crawled: attach to /docs
        let pages = vec![
            page("https://e.com/docs", None, 0, 0),
            page("https://e.com/docs/a/b", None, 0, 1),
        ];
        let forest = forest_from_paths(pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children[0].page.url, "https://e.com/docs/a/b");
    }

    #[test]
    fn test_path_inference_no_ancestor_is_root() {
        let pages = vec![
            page("https://e.com/docs/setup", None, 0, 0),
            page("https://e.com/blog/post", None, 0, 1),
        ];
        let forest = forest_from_paths(pages);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_path_inference_trailing_slash_agnostic() {
        let pages = vec![
            page("https://e.com/docs/", None, 0, 0),
            page("https://e.com/docs/setup", None, 0, 1),
        ];
        let forest = forest_from_paths(pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
    }

    #[test]
    fn test_build_forest_strategy_selection() {
        // With parents recorded, explicit strategy groups under the parent
        // even when paths disagree.
        let pages = vec![
            page("https://e.com/docs", None, 0, 0),
            page("https://e.com/unrelated", Some("https://e.com/docs"), 1, 0),
        ];
        let forest = build_forest(pages);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
    }
}
