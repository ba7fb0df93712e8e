//! Bounded depth-first crawl of one site section
//!
//! The engine owns the visited set for its section and walks entry points
//! depth-first, so a parent page and its descendants come out adjacent in
//! the collected order. A page that fails to fetch is dropped along with
//! the entire subtree reachable only through it.

use crate::crawler::{extract_page, HttpFetcher};
use crate::document::Page;
use crate::url::{last_path_segment, Scope};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// One configured starting page for a section
#[derive(Debug, Clone)]
pub struct EntryPoint {
    /// Absolute URL of the page
    pub url: String,
    /// Title override; takes precedence over anything extracted from the page
    pub title: Option<String>,
}

/// Work item on the traversal stack
struct Pending {
    canonical: String,
    url: Url,
    depth: u32,
    parent: Option<String>,
    title_override: Option<String>,
}

/// Depth-first crawler for one section
///
/// `max_depth` counts link hops from an entry point: depth 0 is the entry
/// itself, and links are only followed from pages shallower than the limit.
pub struct CrawlEngine<'a> {
    fetcher: &'a HttpFetcher,
    scope: Scope,
    max_depth: u32,
    visited: HashSet<String>,
    skipped: u32,
}

impl<'a> CrawlEngine<'a> {
    pub fn new(fetcher: &'a HttpFetcher, scope: Scope, max_depth: u32) -> Self {
        Self {
            fetcher,
            scope,
            max_depth,
            visited: HashSet::new(),
            skipped: 0,
        }
    }

    /// Pages dropped because their fetch failed
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Crawls all entry points and returns pages in depth-first encounter
    /// order
    ///
    /// Entry points are visited in the given order, each with its subtree
    /// completed before the next entry starts. The same visited set spans
    /// all entries, so a page reachable from two of them is collected once,
    /// under the first.
    pub async fn crawl(&mut self, entries: &[EntryPoint]) -> Vec<Page> {
        let mut stack: Vec<Pending> = Vec::new();

        for entry in entries.iter().rev() {
            let url = match Url::parse(&entry.url) {
                Ok(url) => url,
                Err(err) => {
                    warn!(url = %entry.url, error = %err, "Skipping unparseable entry point");
                    self.skipped += 1;
                    continue;
                }
            };
            stack.push(Pending {
                canonical: crate::url::canonicalize(&url),
                url,
                depth: 0,
                parent: None,
                title_override: entry.title.clone(),
            });
        }

        let mut pages = Vec::new();
        let mut order = 0u32;

        while let Some(item) = stack.pop() {
            if !self.visited.insert(item.canonical.clone()) {
                debug!(url = %item.canonical, "Already visited");
                continue;
            }

            let body = match self.fetcher.fetch(item.url.as_str()).await {
                Ok(body) => body,
                Err(err) => {
                    warn!(url = %item.canonical, error = %err, "Dropping page and its subtree");
                    self.skipped += 1;
                    continue;
                }
            };

            let extracted = match extract_page(&body) {
                Some(extracted) => extracted,
                None => {
                    warn!(url = %item.canonical, "No content found, dropping page");
                    self.skipped += 1;
                    continue;
                }
            };

            if item.depth < self.max_depth {
                // First occurrence wins when a page links to the same URL twice
                let mut seen: HashSet<String> = HashSet::new();
                let children: Vec<Pending> = extracted
                    .links
                    .iter()
                    .filter_map(|href| self.scope.classify(href, &item.url))
                    .filter(|canonical| !self.visited.contains(canonical))
                    .filter(|canonical| seen.insert(canonical.clone()))
                    .filter_map(|canonical| {
                        Url::parse(&canonical).ok().map(|url| Pending {
                            canonical,
                            url,
                            depth: item.depth + 1,
                            parent: Some(item.canonical.clone()),
                            title_override: None,
                        })
                    })
                    .collect();

                // Reversed so the first link on the page pops first
                for child in children.into_iter().rev() {
                    stack.push(child);
                }
            }

            let title = item
                .title_override
                .or(extracted.title)
                .unwrap_or_else(|| last_path_segment(&item.url));

            debug!(url = %item.canonical, depth = item.depth, %title, "Page collected");

            pages.push(Page {
                url: item.canonical,
                title,
                content: extracted.content,
                parent_url: item.parent,
                depth: item.depth,
                display_order: order,
            });
            order += 1;
        }

        info!(
            pages = pages.len(),
            skipped = self.skipped,
            "Section crawl complete"
        );
        pages
    }
}
