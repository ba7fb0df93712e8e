//! Document assembly
//!
//! Takes the normalized sections of one document and produces a single
//! self-contained HTML file: title block, a table of contents mirroring
//! each section's page forest, and the section contents concatenated in
//! configuration order. The generation timestamp is captured once at
//! assembly start and reused everywhere it appears.

use crate::document::{AnchorMap, PageNode};
use crate::html::{escape_attr, escape_text};
use chrono::{DateTime, Utc};
use tracing::info;

/// Deepest heading level emitted for a page; deeper nodes saturate here
const MAX_HEADING_LEVEL: u32 = 6;

/// Timestamp format used in the title block and footer
const TIMESTAMP_FORMAT: &str = "%d %B %Y %H:%M UTC";

/// Document-level metadata for the title block
#[derive(Debug, Clone, Default)]
pub struct DocumentMeta {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
}

/// One section's normalized pages, arranged as a forest
#[derive(Debug)]
pub struct SectionPages {
    pub name: String,
    /// Anchor id of the section wrapper, distinct from every page slug
    pub slug: String,
    pub forest: Vec<PageNode>,
}

/// Assembles one complete HTML document from its sections
///
/// Returns the markup and the generation timestamp stamped into it. The
/// table of contents mirrors each section's forest exactly: one entry per
/// node, children nested beneath parents, in forest order. Page content is
/// emitted under a structural heading whose level is `2 + depth`, capped
/// at [`MAX_HEADING_LEVEL`].
pub fn assemble_document(
    meta: &DocumentMeta,
    sections: &[SectionPages],
    anchors: &AnchorMap,
    stylesheet: &str,
) -> (String, DateTime<Utc>) {
    let generated_at = Utc::now();
    let stamp = generated_at.format(TIMESTAMP_FORMAT).to_string();

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_text(&meta.title)));
    out.push_str("<style>\n");
    out.push_str(stylesheet);
    out.push_str("\n</style>\n</head>\n<body>\n");

    render_title_block(&mut out, meta, &stamp);
    render_toc(&mut out, sections, anchors);

    for section in sections {
        render_section(&mut out, section);
    }

    out.push_str(&format!(
        "<footer class=\"doc-footer\"><p>Generated {}</p></footer>\n",
        escape_text(&stamp)
    ));
    out.push_str("</body>\n</html>\n");

    info!(
        title = %meta.title,
        sections = sections.len(),
        "Document assembled"
    );

    (out, generated_at)
}

fn render_title_block(out: &mut String, meta: &DocumentMeta, stamp: &str) {
    out.push_str("<div class=\"title-page\">\n");
    out.push_str(&format!(
        "<h1 class=\"document-title\">{}</h1>\n",
        escape_text(&meta.title)
    ));
    if let Some(author) = &meta.author {
        out.push_str(&format!(
            "<p class=\"document-author\">{}</p>\n",
            escape_text(author)
        ));
    }
    if let Some(description) = &meta.description {
        out.push_str(&format!(
            "<p class=\"document-description\">{}</p>\n",
            escape_text(description)
        ));
    }
    out.push_str(&format!(
        "<p class=\"provenance\">Compiled from the live site on {}. \
         Content may have changed since.</p>\n",
        escape_text(stamp)
    ));
    out.push_str("</div>\n");
}

fn render_toc(out: &mut String, sections: &[SectionPages], anchors: &AnchorMap) {
    out.push_str("<nav class=\"toc\">\n<h1 id=\"table-of-contents\">Table of Contents</h1>\n<ul>\n");
    for section in sections {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            escape_attr(&section.slug),
            escape_text(&section.name)
        ));
        if !section.forest.is_empty() {
            out.push_str("\n<ul>\n");
            for node in &section.forest {
                render_toc_node(out, node, anchors);
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n</nav>\n");
}

fn render_toc_node(out: &mut String, node: &PageNode, anchors: &AnchorMap) {
    let slug = anchors.get(&node.page.url).unwrap_or("");
    out.push_str(&format!(
        "<li><a href=\"#{}\">{}</a>",
        escape_attr(slug),
        escape_text(&node.page.title)
    ));
    if !node.children.is_empty() {
        out.push_str("\n<ul>\n");
        for child in &node.children {
            render_toc_node(out, child, anchors);
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</li>\n");
}

fn render_section(out: &mut String, section: &SectionPages) {
    out.push_str(&format!(
        "<section class=\"doc-section\" id=\"{}\">\n",
        escape_attr(&section.slug)
    ));
    out.push_str(&format!(
        "<h1 class=\"section-title\">{}</h1>\n",
        escape_text(&section.name)
    ));
    for node in &section.forest {
        render_page_node(out, node, 0);
    }
    out.push_str("</section>\n");
}

fn render_page_node(out: &mut String, node: &PageNode, depth: u32) {
    let level = (2 + depth).min(MAX_HEADING_LEVEL);
    out.push_str(&format!(
        "<h{} class=\"page-title\">{}</h{}>\n",
        level,
        escape_text(&node.page.title),
        level
    ));
    out.push_str("<div class=\"page-body\">\n");
    // Content was normalized upstream; emitted as-is
    out.push_str(&node.page.content);
    out.push_str("\n</div>\n");

    for child in &node.children {
        render_page_node(out, child, depth + 1);
    }
}
