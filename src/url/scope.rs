use crate::url::{canonicalize, resolve_href};
use crate::UrlError;
use url::Url;

/// File extensions that never lead to a crawlable page
///
/// Links whose path ends in one of these are classified out of scope even
/// when origin and path prefix match.
const NON_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "zip", "tar", "gz", "rar", "csv",
];

/// A crawl scope: the (origin, path prefix) pair bounding which discovered
/// links are eligible for recursion
#[derive(Debug, Clone)]
pub struct Scope {
    origin: url::Origin,
    path_prefix: String,
}

impl Scope {
    /// Creates a scope from a base URL and a path prefix
    pub fn new(base: &Url, path_prefix: &str) -> Result<Self, UrlError> {
        let origin = base.origin();
        if !origin.is_tuple() {
            return Err(UrlError::MissingHost);
        }
        let mut path_prefix = path_prefix.to_string();
        if !path_prefix.starts_with('/') {
            path_prefix.insert(0, '/');
        }
        Ok(Self {
            origin,
            path_prefix,
        })
    }

    /// Parses a base URL string and builds a scope from it
    pub fn from_base(base: &str, path_prefix: &str) -> Result<Self, UrlError> {
        let base = Url::parse(base).map_err(|e| UrlError::Parse(e.to_string()))?;
        Self::new(&base, path_prefix)
    }

    /// Classifies an outbound link found on `current_page`
    ///
    /// Returns the canonical URL (fragment and query stripped) when the link
    /// is in scope for recursion: same origin, path under the scope's prefix,
    /// and not a known non-document file. Returns `None` for everything else,
    /// including hrefs that cannot name a page at all.
    pub fn classify(&self, href: &str, current_page: &Url) -> Option<String> {
        let resolved = resolve_href(href, current_page)?;

        if resolved.origin() != self.origin {
            return None;
        }

        if !path_in_prefix(resolved.path(), &self.path_prefix) {
            return None;
        }

        if has_non_document_extension(resolved.path()) {
            return None;
        }

        Some(canonicalize(&resolved))
    }
}

/// Checks that `path` sits under `prefix` at a path segment boundary
///
/// "/docs" covers "/docs" and "/docs/guide" but not "/docsification".
fn path_in_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

/// Checks whether a path ends in a known non-document file extension
fn has_non_document_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => NON_DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}
