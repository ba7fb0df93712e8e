use crate::UrlError;
use url::Url;

/// Resolves a raw href against the page it appeared on
///
/// Returns `None` for hrefs that can never name a page:
/// - `javascript:`, `mailto:`, `tel:` and `data:` schemes
/// - fragment-only links (same-page anchors)
/// - empty hrefs and hrefs that fail to resolve
/// - anything that resolves to a non-HTTP(S) scheme
pub fn resolve_href(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(resolved) if resolved.scheme() == "http" || resolved.scheme() == "https" => {
            Some(resolved)
        }
        _ => None,
    }
}

/// Canonicalizes a URL to scheme+host+path form
///
/// Strips the fragment and the query string, so two links differing only by
/// fragment or query canonicalize identically. The result is the string key
/// used for the visited set and the anchor map.
///
/// # Examples
///
/// ```
/// use sitebinder::url::canonicalize;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/guide?ref=nav#install").unwrap();
/// assert_eq!(canonicalize(&url), "https://example.com/guide");
/// ```
pub fn canonicalize(url: &Url) -> String {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    canonical.set_query(None);
    canonical.to_string()
}

/// Parses and canonicalizes a URL string in one step
pub fn canonicalize_str(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }
    Ok(canonicalize(&url))
}

/// Returns the last non-empty path segment of a URL
///
/// Used as the title fallback when a page has no extractable title.
/// The root path yields the host name.
pub fn last_path_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
