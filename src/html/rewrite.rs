//! Content normalizer: the per-page rewriting pipeline
//!
//! Each stage takes a content fragment and returns a transformed fragment;
//! nothing is mutated in place. The stage order is a contract: heading ids
//! must exist before headings are flattened, and link rewriting relies on a
//! complete anchor map, built from every section of the document beforehand.

use crate::document::{slugify, AnchorMap};
use crate::html::{
    escape_attr, rewrite_fragment, serialize_element, serialize_root, Identity, TagPlan, Transform,
};
use crate::url::{canonicalize, resolve_href};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Applies the full normalization pipeline to a page's content
///
/// Stages, in order: section anchor, heading ids, link rewriting, table
/// restructuring, code region marking, heading flattening.
pub fn normalize_page(content: &str, page_url: &Url, anchors: &AnchorMap, section_id: &str) -> String {
    let html = assign_section_anchor(content, section_id);
    let html = assign_heading_ids(&html);
    let html = rewrite_links(&html, page_url, anchors);
    let html = restructure_tables(&html);
    let html = mark_code_regions(&html);
    flatten_headings(&html)
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Stage 1: anchor the page under its document-wide section id
///
/// The id lands on the first `h1`, or the first heading of any level when
/// there is no `h1`. A page with no headings at all gets an empty anchor
/// span prepended so cross-links and TOC entries still have a target.
pub fn assign_section_anchor(content: &str, section_id: &str) -> String {
    let doc = Html::parse_fragment(content);

    let target = first_match(&doc, "h1").or_else(|| first_match(&doc, "h2, h3, h4, h5, h6"));

    match target {
        Some(node_id) => {
            let mut tf = SectionAnchor {
                target: node_id,
                section_id,
            };
            serialize_root(&doc, &mut tf)
        }
        None => format!(
            r#"<span class="page-anchor" id="{}"></span>{}"#,
            escape_attr(section_id),
            serialize_root(&doc, &mut Identity)
        ),
    }
}

fn first_match(doc: &Html, selector: &str) -> Option<NodeId> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next().map(|el| el.id())
}

struct SectionAnchor<'a> {
    target: NodeId,
    section_id: &'a str,
}

impl Transform for SectionAnchor<'_> {
    fn plan(&mut self, el: &ElementRef) -> TagPlan {
        let mut plan = TagPlan::from_element(el);
        if el.id() == self.target {
            plan.set_attr("id", self.section_id);
        }
        plan
    }
}

/// Stage 2: give every heading an id derived from its text
///
/// Runs before heading flattening, which preserves ids while discarding
/// heading semantics. Headings that already carry an id keep it.
pub fn assign_heading_ids(content: &str) -> String {
    struct HeadingIds;

    impl Transform for HeadingIds {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            let mut plan = TagPlan::from_element(el);
            if heading_level(el.value().name()).is_some() && plan.get_attr("id").is_none() {
                let slug = slugify(&crate::html::text_of(el));
                if !slug.is_empty() {
                    plan.set_attr("id", &slug);
                }
            }
            plan
        }
    }

    rewrite_fragment(content, &mut HeadingIds)
}

/// Stage 3: rewrite links for in-document navigation
///
/// A link whose canonical resolved URL is in the anchor map becomes an
/// in-document anchor reference marked `internal-link`; everything else
/// becomes an absolute URL marked `external-link`, opened in a new context.
/// Anchor-only links and unresolvable hrefs are left untouched.
pub fn rewrite_links(content: &str, page_url: &Url, anchors: &AnchorMap) -> String {
    struct Links<'a> {
        page_url: &'a Url,
        anchors: &'a AnchorMap,
    }

    impl Transform for Links<'_> {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            let mut plan = TagPlan::from_element(el);
            if el.value().name() != "a" {
                return plan;
            }

            let href = match plan.get_attr("href") {
                Some(h) if !h.starts_with('#') => h.to_string(),
                _ => return plan,
            };

            let resolved = match resolve_href(&href, self.page_url) {
                Some(url) => url,
                None => return plan,
            };

            match self.anchors.get(&canonicalize(&resolved)) {
                Some(slug) => {
                    plan.set_attr("href", &format!("#{}", slug));
                    plan.add_class("internal-link");
                }
                None => {
                    plan.set_attr("href", resolved.as_str());
                    plan.add_class("external-link");
                    plan.set_attr("target", "_blank");
                }
            }
            plan
        }
    }

    rewrite_fragment(
        content,
        &mut Links {
            page_url,
            anchors,
        },
    )
}

/// Stage 4: restructure tables for static rendering
///
/// A first row composed entirely of header cells is hoisted into an explicit
/// `<thead>` group; tables that already have one are left alone. All tables
/// get the `doc-table` class.
pub fn restructure_tables(content: &str) -> String {
    struct Tables {
        hoisted: HashSet<NodeId>,
    }

    impl Transform for Tables {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            let mut plan = TagPlan::from_element(el);
            if el.value().name() == "table" {
                plan.add_class("doc-table");
            }
            plan
        }

        fn keep(&mut self, el: &ElementRef) -> bool {
            !self.hoisted.contains(&el.id())
        }

        fn emit_before_children(&mut self, el: &ElementRef, out: &mut String) {
            if el.value().name() != "table" {
                return;
            }

            let has_thead = el
                .children()
                .filter_map(ElementRef::wrap)
                .any(|c| c.value().name() == "thead");
            if has_thead {
                return;
            }

            let first_row = match Selector::parse("tr")
                .ok()
                .and_then(|sel| el.select(&sel).next())
            {
                Some(row) => row,
                None => return,
            };

            if !is_header_row(&first_row) {
                return;
            }

            out.push_str("<thead>");
            serialize_element(&first_row, out, &mut Identity);
            out.push_str("</thead>");
            self.hoisted.insert(first_row.id());
        }
    }

    rewrite_fragment(
        content,
        &mut Tables {
            hoisted: HashSet::new(),
        },
    )
}

fn is_header_row(row: &ElementRef) -> bool {
    let cells: Vec<_> = row
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "th" | "td"))
        .collect();
    !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th")
}

/// Stage 5: mark inline and block code regions for styling
pub fn mark_code_regions(content: &str) -> String {
    struct Code;

    impl Transform for Code {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            let mut plan = TagPlan::from_element(el);
            match el.value().name() {
                "pre" => plan.add_class("code-block"),
                "code" => {
                    let in_pre = el
                        .parent()
                        .and_then(ElementRef::wrap)
                        .map(|p| p.value().name() == "pre")
                        .unwrap_or(false);
                    if !in_pre {
                        plan.add_class("inline-code");
                    }
                }
                _ => {}
            }
            plan
        }
    }

    rewrite_fragment(content, &mut Code)
}

/// Stage 6: flatten body headings into non-heading containers
///
/// Body headings would compete with the one structural heading per page
/// emitted by the document assembler, producing duplicate bookmark entries.
/// Each heading becomes a `div` that keeps its id and classes and records
/// its original level. Idempotent: a flattened fragment has no heading
/// elements left to rewrite.
pub fn flatten_headings(content: &str) -> String {
    struct Flatten;

    impl Transform for Flatten {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            let mut plan = TagPlan::from_element(el);
            if let Some(level) = heading_level(el.value().name()) {
                plan.name = "div".to_string();
                let mut class = format!("flattened-heading level-{}", level);
                if let Some(orig) = plan.get_attr("class").map(str::to_string) {
                    if !orig.is_empty() {
                        class.push(' ');
                        class.push_str(&orig);
                    }
                }
                plan.set_attr("class", &class);
            }
            plan
        }
    }

    rewrite_fragment(content, &mut Flatten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn page(url: &str, title: &str) -> Page {
        Page {
            url: url.to_string(),
            title: title.to_string(),
            content: String::new(),
            parent_url: None,
            depth: 0,
            display_order: 0,
        }
    }

    fn anchors() -> AnchorMap {
        AnchorMap::build(
            &[
                page("https://example.com/docs/setup", "Setup"),
                page("https://example.com/docs/guide", "Guide"),
            ],
            &[],
        )
    }

    fn base_url() -> Url {
        Url::parse("https://example.com/docs/guide").unwrap()
    }

    #[test]
    fn test_section_anchor_on_h1() {
        let out = assign_section_anchor("<h1>Title</h1><p>x</p>", "my-page");
        assert!(out.contains(r#"<h1 id="my-page">Title</h1>"#));
    }

    #[test]
    fn test_section_anchor_overwrites_existing_id() {
        let out = assign_section_anchor(r#"<h1 id="old">Title</h1>"#, "new");
        assert!(out.contains(r#"id="new""#));
        assert!(!out.contains("old"));
    }

    #[test]
    fn test_section_anchor_falls_back_to_lower_heading() {
        let out = assign_section_anchor("<h3>Sub</h3>", "my-page");
        assert!(out.contains(r#"<h3 id="my-page">Sub</h3>"#));
    }

    #[test]
    fn test_section_anchor_span_when_no_headings() {
        let out = assign_section_anchor("<p>only text</p>", "my-page");
        assert!(out.starts_with(r#"<span class="page-anchor" id="my-page"></span>"#));
        assert!(out.contains("<p>only text</p>"));
    }

    #[test]
    fn test_heading_ids_assigned() {
        let out = assign_heading_ids("<h2>Getting Started</h2>");
        assert_eq!(out, r#"<h2 id="getting-started">Getting Started</h2>"#);
    }

    #[test]
    fn test_heading_ids_keep_existing() {
        let out = assign_heading_ids(r#"<h2 id="keep">Getting Started</h2>"#);
        assert!(out.contains(r#"id="keep""#));
    }

    #[test]
    fn test_internal_link_rewritten_to_anchor() {
        let out = rewrite_links(r#"<a href="/docs/setup">Setup</a>"#, &base_url(), &anchors());
        assert!(out.contains(r##"href="#setup""##));
        assert!(out.contains("internal-link"));
    }

    #[test]
    fn test_internal_link_matches_despite_fragment_and_query() {
        let out = rewrite_links(
            r#"<a href="/docs/setup?ref=nav#install">Setup</a>"#,
            &base_url(),
            &anchors(),
        );
        assert!(out.contains(r##"href="#setup""##));
    }

    #[test]
    fn test_external_link_made_absolute() {
        let out = rewrite_links(r#"<a href="/blog/post">Post</a>"#, &base_url(), &anchors());
        assert!(out.contains(r#"href="https://example.com/blog/post""#));
        assert!(out.contains("external-link"));
        assert!(out.contains(r#"target="_blank""#));
        assert!(!out.contains('#'));
    }

    #[test]
    fn test_anchor_only_link_untouched() {
        let html = r##"<a href="#local">jump</a>"##;
        assert_eq!(rewrite_links(html, &base_url(), &anchors()), html);
    }

    #[test]
    fn test_mailto_link_untouched() {
        let html = r#"<a href="mailto:a@b.com">mail</a>"#;
        assert_eq!(rewrite_links(html, &base_url(), &anchors()), html);
    }

    #[test]
    fn test_table_header_row_hoisted() {
        let html = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
        let out = restructure_tables(html);
        assert!(out.contains("<thead><tr><th>A</th><th>B</th></tr></thead>"));
        assert!(out.contains("doc-table"));
        // The hoisted row is not emitted a second time
        assert_eq!(out.matches("<th>A</th>").count(), 1);
    }

    #[test]
    fn test_table_with_plain_first_row_untouched() {
        let html = "<table><tbody><tr><td>1</td></tr></tbody></table>";
        let out = restructure_tables(html);
        assert!(!out.contains("thead"));
    }

    #[test]
    fn test_table_with_existing_thead_not_rewrapped() {
        let html =
            "<table><thead><tr><th>A</th></tr></thead><tbody><tr><td>1</td></tr></tbody></table>";
        let out = restructure_tables(html);
        assert_eq!(out.matches("<thead>").count(), 1);
    }

    #[test]
    fn test_code_regions_marked() {
        let out = mark_code_regions("<p><code>x</code></p><pre><code>y</code></pre>");
        assert!(out.contains(r#"<code class="inline-code">x</code>"#));
        assert!(out.contains(r#"<pre class="code-block">"#));
        // Code inside pre is not inline
        assert!(!out.contains(r#"inline-code">y"#));
    }

    #[test]
    fn test_flatten_headings() {
        let out = flatten_headings(r#"<h3 id="sub" class="fancy">Sub</h3>"#);
        assert_eq!(
            out,
            r#"<div id="sub" class="flattened-heading level-3 fancy">Sub</div>"#
        );
    }

    #[test]
    fn test_flatten_idempotent() {
        let once = flatten_headings("<h1>A</h1><h2 id=\"b\">B</h2><p>text</p>");
        let twice = flatten_headings(&once);
        assert_eq!(once, twice);
        for tag in ["<h1", "<h2", "<h3", "<h4", "<h5", "<h6"] {
            assert!(!once.contains(tag));
        }
    }

    #[test]
    fn test_normalize_page_pipeline() {
        let content = r#"<h1>Guide</h1><h2>Install</h2><a href="/docs/setup">setup</a>"#;
        let out = normalize_page(content, &base_url(), &anchors(), "guide");

        // Section anchor survived flattening
        assert!(out.contains(r#"<div id="guide" class="flattened-heading level-1">Guide</div>"#));
        // Heading id assigned before flattening
        assert!(out.contains(r#"id="install""#));
        // Links rewritten
        assert!(out.contains(r##"href="#setup""##));
        // No heading elements remain
        assert!(!out.contains("<h1") && !out.contains("<h2"));
    }
}
