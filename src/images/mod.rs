//! Image embedding for self-contained output
//!
//! Every `img` in the compiled document is rewritten to a base64 data URI
//! so the output file renders offline. Downloads are cached per run, so an
//! image shared by many pages (a logo, a diagram reused across sections)
//! is fetched once. An image that cannot be fetched keeps its absolute URL.

use crate::html::{rewrite_fragment, TagPlan, Transform};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use scraper::ElementRef;
use std::collections::HashMap;
use tracing::{debug, warn};
use url::Url;

/// Downloads images and rewrites `img` elements to embed them
pub struct ImageInliner<'a> {
    client: &'a Client,
    /// Absolute image URL to finished data URI; failures cache `None`
    cache: HashMap<String, Option<String>>,
}

impl<'a> ImageInliner<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// Rewrites every `img` in the fragment to a data URI
    ///
    /// Relative sources are resolved against `page_url` first. Sources that
    /// are already data URIs pass through; sources that fail to download
    /// are rewritten to their absolute URL so the reader can still follow
    /// them online.
    pub async fn inline_images(&mut self, content: &str, page_url: &Url) -> String {
        for src in collect_sources(content) {
            let Some(absolute) = resolve_src(&src, page_url) else {
                continue;
            };
            if self.cache.contains_key(&absolute) {
                continue;
            }
            let data_uri = self.download(&absolute).await;
            self.cache.insert(absolute, data_uri);
        }

        let mut rewrite = SrcRewrite {
            cache: &self.cache,
            page_url,
        };
        rewrite_fragment(content, &mut rewrite)
    }

    async fn download(&self, url: &str) -> Option<String> {
        debug!(url, "Downloading image");
        let response = match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(url, status = %resp.status(), "Image download failed");
                return None;
            }
            Err(err) => {
                warn!(url, error = %err, "Image download failed");
                return None;
            }
        };

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(url, error = %err, "Image body read failed");
                return None;
            }
        };

        let mime = content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| detect_mime(&bytes).to_string());

        Some(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }
}

/// All resolvable `img` sources in the fragment, unresolved
fn collect_sources(content: &str) -> Vec<String> {
    struct Collect {
        sources: Vec<String>,
    }

    impl Transform for Collect {
        fn plan(&mut self, el: &ElementRef) -> TagPlan {
            if el.value().name() == "img" {
                if let Some(src) = el.value().attr("src") {
                    if !src.starts_with("data:") {
                        self.sources.push(src.to_string());
                    }
                }
            }
            TagPlan::from_element(el)
        }
    }

    let mut collect = Collect {
        sources: Vec::new(),
    };
    rewrite_fragment(content, &mut collect);
    collect.sources
}

fn resolve_src(src: &str, page_url: &Url) -> Option<String> {
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    page_url.join(src).ok().map(|url| url.to_string())
}

struct SrcRewrite<'a> {
    cache: &'a HashMap<String, Option<String>>,
    page_url: &'a Url,
}

impl Transform for SrcRewrite<'_> {
    fn plan(&mut self, el: &ElementRef) -> TagPlan {
        let mut plan = TagPlan::from_element(el);
        if el.value().name() != "img" {
            return plan;
        }
        let Some(src) = el.value().attr("src") else {
            return plan;
        };
        let Some(absolute) = resolve_src(src, self.page_url) else {
            return plan;
        };

        match self.cache.get(&absolute) {
            Some(Some(data_uri)) => plan.set_attr("src", data_uri),
            // Download failed: point at the live image instead
            _ => plan.set_attr("src", &absolute),
        }
        plan
    }
}

/// Sniffs an image MIME type from magic bytes
///
/// Used when the server's Content-Type is missing or not an image type.
fn detect_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xff, 0xd8]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else if bytes.starts_with(b"<svg") || bytes.starts_with(b"<?xml") {
        "image/svg+xml"
    } else {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_detect_mime() {
        assert_eq!(detect_mime(&[0xff, 0xd8, 0xff, 0xe0]), "image/jpeg");
        assert_eq!(detect_mime(PNG_MAGIC), "image/png");
        assert_eq!(detect_mime(b"GIF89a..."), "image/gif");
        assert_eq!(detect_mime(b"RIFF\x00\x00\x00\x00WEBP"), "image/webp");
        assert_eq!(detect_mime(b"<svg xmlns="), "image/svg+xml");
    }

    #[test]
    fn test_collect_sources_skips_data_uris() {
        let html = r#"<img src="data:image/png;base64,AAAA"><img src="/a.png">"#;
        assert_eq!(collect_sources(html), vec!["/a.png"]);
    }

    #[tokio::test]
    async fn test_inline_rewrites_to_data_uri() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/logo.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(PNG_MAGIC.to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let mut inliner = ImageInliner::new(&client);
        let page_url = Url::parse(&format!("{}/docs/a", server.uri())).unwrap();

        // Same image twice: one download, both rewritten
        let html = r#"<img src="/img/logo.png"><img src="/img/logo.png">"#;
        let out = inliner.inline_images(html, &page_url).await;

        let expected = format!("data:image/png;base64,{}", STANDARD.encode(PNG_MAGIC));
        assert_eq!(out.matches(&expected).count(), 2);
    }

    #[tokio::test]
    async fn test_failed_download_keeps_absolute_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/img/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = Client::new();
        let mut inliner = ImageInliner::new(&client);
        let page_url = Url::parse(&format!("{}/docs/a", server.uri())).unwrap();

        let out = inliner
            .inline_images(r#"<img src="/img/missing.png">"#, &page_url)
            .await;

        assert!(out.contains(&format!("{}/img/missing.png", server.uri())));
        assert!(!out.contains("data:"));
    }
}
