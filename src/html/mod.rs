//! HTML serialization machinery for the rewriting pipeline
//!
//! scraper's DOM is read-only, so every pipeline stage re-emits the fragment
//! through this serializer: immutable parse tree in, transformed markup out.
//! A [`Transform`] decides, per element, what tag and attributes to emit,
//! whether to drop the subtree, and what to splice in before the children.

pub mod rewrite;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements serialized without a closing tag
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// The tag and attributes to emit for one element
#[derive(Debug, Clone)]
pub(crate) struct TagPlan {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl TagPlan {
    /// A plan that reproduces the element unchanged
    pub fn from_element(el: &ElementRef) -> Self {
        Self {
            name: el.value().name().to_string(),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, replacing any existing value
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(attr) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            attr.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Appends a class unless it is already present
    pub fn add_class(&mut self, class: &str) {
        match self.attrs.iter_mut().find(|(k, _)| k == "class") {
            Some(attr) => {
                if !attr.1.split_whitespace().any(|c| c == class) {
                    attr.1.push(' ');
                    attr.1.push_str(class);
                }
            }
            None => self.attrs.push(("class".to_string(), class.to_string())),
        }
    }
}

/// Per-element rewriting hooks used by the serializer
pub(crate) trait Transform {
    /// The tag and attributes to emit for this element
    fn plan(&mut self, el: &ElementRef) -> TagPlan {
        TagPlan::from_element(el)
    }

    /// Whether to emit this element at all; dropping it drops the subtree
    fn keep(&mut self, _el: &ElementRef) -> bool {
        true
    }

    /// Markup spliced in directly after the opening tag, before any children
    fn emit_before_children(&mut self, _el: &ElementRef, _out: &mut String) {}
}

/// A transform that reproduces the input unchanged
pub(crate) struct Identity;

impl Transform for Identity {}

/// Parses an HTML fragment and re-serializes it through a transform
pub(crate) fn rewrite_fragment(html: &str, tf: &mut dyn Transform) -> String {
    let doc = Html::parse_fragment(html);
    serialize_root(&doc, tf)
}

/// Serializes all children of a parsed fragment's root through a transform
pub(crate) fn serialize_root(doc: &Html, tf: &mut dyn Transform) -> String {
    let mut out = String::new();
    for child in doc.root_element().children() {
        serialize_node(child, &mut out, tf);
    }
    out
}

pub(crate) fn serialize_children(el: &ElementRef, out: &mut String, tf: &mut dyn Transform) {
    for child in el.children() {
        serialize_node(child, out, tf);
    }
}

pub(crate) fn serialize_node(node: NodeRef<Node>, out: &mut String, tf: &mut dyn Transform) {
    match node.value() {
        Node::Text(text) => out.push_str(&escape_text(&text.text)),
        Node::Element(_) => {
            if let Some(el) = ElementRef::wrap(node) {
                serialize_element(&el, out, tf);
            }
        }
        // Comments, doctypes, and processing instructions are dropped
        _ => {}
    }
}

pub(crate) fn serialize_element(el: &ElementRef, out: &mut String, tf: &mut dyn Transform) {
    if !tf.keep(el) {
        return;
    }

    let plan = tf.plan(el);

    out.push('<');
    out.push_str(&plan.name);
    for (name, value) in &plan.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&plan.name.as_str()) {
        return;
    }

    tf.emit_before_children(el, out);
    serialize_children(el, out, tf);

    out.push_str("</");
    out.push_str(&plan.name);
    out.push('>');
}

/// Collected, whitespace-trimmed text content of an element
pub(crate) fn text_of(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_roundtrip() {
        let html = r#"<div class="x"><p>hello <em>world</em></p></div>"#;
        assert_eq!(rewrite_fragment(html, &mut Identity), html);
    }

    #[test]
    fn test_text_is_escaped() {
        let out = rewrite_fragment("<p>a &amp; b</p>", &mut Identity);
        assert_eq!(out, "<p>a &amp; b</p>");
    }

    #[test]
    fn test_void_elements_not_closed() {
        let out = rewrite_fragment(r#"<p>a<br>b</p>"#, &mut Identity);
        assert_eq!(out, "<p>a<br>b</p>");
    }

    #[test]
    fn test_attr_quotes_escaped() {
        let out = rewrite_fragment(r#"<a title="say &quot;hi&quot;">x</a>"#, &mut Identity);
        assert_eq!(out, r#"<a title="say &quot;hi&quot;">x</a>"#);
    }

    #[test]
    fn test_comments_dropped() {
        let out = rewrite_fragment("<p>a</p><!-- gone --><p>b</p>", &mut Identity);
        assert_eq!(out, "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_tag_plan_add_class() {
        let mut plan = TagPlan {
            name: "p".to_string(),
            attrs: vec![("class".to_string(), "a b".to_string())],
        };
        plan.add_class("c");
        plan.add_class("a");
        assert_eq!(plan.get_attr("class"), Some("a b c"));
    }
}
