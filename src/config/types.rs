use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for sitebinder
///
/// A config file carries `documents` (named multi-section outputs) and/or
/// standalone `sections`, each of which compiles into its own document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub documents: Vec<DocumentConfig>,

    #[serde(default)]
    pub sections: Vec<SectionConfig>,
}

impl Config {
    pub fn has_documents(&self) -> bool {
        !self.documents.is_empty()
    }

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }
}

/// Crawler and processing behavior settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Delay between requests in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Retries after the initial attempt for transient fetch failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to download and embed images as data URIs
    #[serde(default = "default_download_images")]
    pub download_images: bool,

    /// Custom stylesheet; the embedded default is used when absent
    #[serde(default)]
    pub stylesheet_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            download_images: default_download_images(),
            stylesheet_path: None,
        }
    }
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_download_images() -> bool {
    true
}

/// A named output built from multiple sections
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    pub document_name: String,

    /// Output filename; derived from the document name when absent
    #[serde(default)]
    pub output_filename: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,

    pub sections: Vec<SectionConfig>,
}

/// One crawlable site section
#[derive(Debug, Clone, Deserialize)]
pub struct SectionConfig {
    pub section_name: String,

    /// Entry pages crawled in order
    pub pages: Vec<EntryPageConfig>,

    /// Crawl scope origin; defaults to the first entry URL's origin
    #[serde(default)]
    pub base_url: Option<String>,

    /// Crawl scope path prefix; defaults to `/`
    #[serde(default)]
    pub base_path: Option<String>,

    /// Link hops to follow from an entry page; defaults to 1
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Output filename for standalone sections
    #[serde(default)]
    pub output_filename: Option<String>,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// One configured entry page
#[derive(Debug, Clone, Deserialize)]
pub struct EntryPageConfig {
    pub url: String,

    /// Title override; takes precedence over the extracted title
    #[serde(default)]
    pub title: Option<String>,
}

/// Title-block metadata for a document
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Document title; the document or section name is used when absent
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}
