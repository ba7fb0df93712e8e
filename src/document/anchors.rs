//! Slug derivation and the document-wide URL→anchor map
//!
//! The anchor map is built once per document, from the complete set of pages
//! across every section, before any page content is rewritten. It is
//! immutable afterwards.

use crate::document::Page;
use std::collections::{HashMap, HashSet};

/// Derives a URL-safe slug from heading text
///
/// Lower-cases the text, strips characters outside alphanumeric, whitespace
/// and hyphen, then collapses whitespace/hyphen runs to a single hyphen.
/// This is the canonical normalization for page anchors, section names, and
/// document titles alike.
///
/// # Examples
///
/// ```
/// use sitebinder::document::slugify;
///
/// assert_eq!(slugify("Design Standards: 2024 Edition"), "design-standards-2024-edition");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_separator = true;
        }
        // Everything else is dropped without acting as a separator
    }

    slug
}

/// Mapping from canonical page URL to a document-unique anchor slug
#[derive(Debug, Clone)]
pub struct AnchorMap {
    map: HashMap<String, String>,
}

impl AnchorMap {
    /// Builds the anchor map from all pages of a document
    ///
    /// `reserved` slugs (section anchors, the TOC anchor) are taken before
    /// any page slug is assigned. Collisions are resolved deterministically
    /// by appending `-2`, `-3`, ... in page-iteration order; a title that
    /// slugifies to nothing falls back to `page`.
    pub fn build<'a>(pages: impl IntoIterator<Item = &'a Page>, reserved: &[String]) -> Self {
        let mut taken: HashSet<String> = reserved.iter().cloned().collect();
        let mut map = HashMap::new();

        for page in pages {
            if map.contains_key(&page.url) {
                continue;
            }

            let mut base = slugify(&page.title);
            if base.is_empty() {
                base = "page".to_string();
            }

            let mut slug = base.clone();
            let mut n = 2;
            while taken.contains(&slug) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }

            taken.insert(slug.clone());
            map.insert(page.url.clone(), slug);
        }

        Self { map }
    }

    /// Looks up the slug for a canonical URL
    pub fn get(&self, canonical_url: &str) -> Option<&str> {
        self.map.get(canonical_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
