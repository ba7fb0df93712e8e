//! Compile orchestration
//!
//! This module drives a whole run: it turns the configuration into compile
//! jobs (one per configured document, plus one per standalone section),
//! crawls each job's sections, normalizes and assembles the results, and
//! writes one output file per job. Failures are contained at page and
//! section granularity; a job with no usable content yields no file but
//! never aborts the run.

use crate::config::{validate_section, Config, Metadata, SectionConfig};
use crate::crawler::{CrawlEngine, EntryPoint, HttpFetcher};
use crate::document::{build_forest, slugify, AnchorMap, Page};
use crate::html::rewrite::normalize_page;
use crate::images::ImageInliner;
use crate::output::{assemble_document, DocumentMeta, RunSummary, SectionPages};
use crate::url::Scope;
use crate::{BinderError, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Stylesheet embedded in every output unless the config overrides it
pub const DEFAULT_STYLESHEET: &str = include_str!("../assets/default.css");

/// Anchor id of the table of contents, never assigned to a page
const TOC_SLUG: &str = "table-of-contents";

/// Run-level options from the command line
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub output_dir: PathBuf,
    /// When set, only sections with this name are compiled
    pub section_filter: Option<String>,
}

/// One output file to produce
#[derive(Debug, Clone)]
pub struct CompileJob {
    pub name: String,
    pub output_filename: Option<String>,
    pub metadata: Option<Metadata>,
    pub sections: Vec<SectionConfig>,
}

/// Crawled, not yet normalized, pages of one section
struct CrawledSection {
    name: String,
    pages: Vec<Page>,
    skipped: u32,
}

/// Drives the whole compile run
pub struct Compiler {
    config: Config,
    options: CompileOptions,
    fetcher: HttpFetcher,
    stylesheet: String,
}

impl Compiler {
    /// Builds a compiler from a loaded configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The loaded and validated configuration
    /// * `options` - Output directory and section filter
    ///
    /// # Returns
    ///
    /// * `Ok(Compiler)` - Ready to run
    /// * `Err(BinderError)` - Client build or stylesheet read failed
    pub fn new(config: Config, options: CompileOptions) -> Result<Self> {
        let settings = &config.settings;
        let fetcher = HttpFetcher::new(
            Duration::from_millis(settings.request_delay_ms),
            settings.max_retries,
            Duration::from_secs(settings.timeout_secs),
        )?;

        let stylesheet = match &settings.stylesheet_path {
            Some(path) => std::fs::read_to_string(path)?,
            None => DEFAULT_STYLESHEET.to_string(),
        };

        Ok(Self {
            config,
            options,
            fetcher,
            stylesheet,
        })
    }

    /// Compiles every job and returns the run summary
    pub async fn run(&self) -> Result<RunSummary> {
        let jobs = plan_jobs(&self.config, self.options.section_filter.as_deref());
        info!(jobs = jobs.len(), "Starting compile run");

        let mut summary = RunSummary::new();

        for job in &jobs {
            match self.compile_job(job, &mut summary).await {
                Ok(path) => summary.record_document(path),
                Err(BinderError::EmptyDocument(name)) => {
                    warn!(document = %name, "No content compiled, no output written");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(summary)
    }

    async fn compile_job(&self, job: &CompileJob, summary: &mut RunSummary) -> Result<PathBuf> {
        info!(document = %job.name, sections = job.sections.len(), "Compiling document");

        let mut crawled: Vec<CrawledSection> = Vec::new();

        for section in &job.sections {
            if let Err(err) = validate_section(section) {
                warn!(section = %section.section_name, error = %err, "Skipping invalid section");
                summary.record_skipped_section();
                continue;
            }

            let pages = self.crawl_section(section).await?;
            match pages {
                Some(section_pages) if !section_pages.pages.is_empty() => crawled.push(section_pages),
                _ => {
                    warn!(section = %section.section_name, "Section produced no pages");
                    summary.record_skipped_section();
                }
            }
        }

        if crawled.is_empty() {
            return Err(BinderError::EmptyDocument(job.name.clone()));
        }

        // Section anchors and page slugs share one namespace per document
        let section_slugs = assign_section_slugs(&crawled);
        let mut reserved = section_slugs.clone();
        reserved.push(TOC_SLUG.to_string());

        let all_pages: Vec<Page> = crawled
            .iter()
            .flat_map(|s| s.pages.iter().cloned())
            .collect();
        let anchors = AnchorMap::build(&all_pages, &reserved);

        let mut inliner = ImageInliner::new(self.fetcher.client());
        let mut sections_out: Vec<SectionPages> = Vec::new();

        for (section, slug) in crawled.into_iter().zip(section_slugs) {
            let mut pages = section.pages;
            for page in &mut pages {
                let page_url = Url::parse(&page.url)?;
                let section_id = anchors
                    .get(&page.url)
                    .map(str::to_string)
                    .unwrap_or_else(|| slugify(&page.title));

                page.content = normalize_page(&page.content, &page_url, &anchors, &section_id);

                if self.config.settings.download_images {
                    page.content = inliner.inline_images(&page.content, &page_url).await;
                }
            }

            summary.record_section(pages.len() as u32, section.skipped);
            sections_out.push(SectionPages {
                name: section.name,
                slug,
                forest: build_forest(pages),
            });
        }

        let meta = document_meta(&job.name, job.metadata.as_ref());
        let (markup, generated_at) =
            assemble_document(&meta, &sections_out, &anchors, &self.stylesheet);
        info!(document = %job.name, %generated_at, "Assembly complete");

        let filename = job
            .output_filename
            .clone()
            .unwrap_or_else(|| format!("{}.html", slugify(&job.name)));
        let path = self.options.output_dir.join(filename);

        std::fs::create_dir_all(&self.options.output_dir)?;
        std::fs::write(&path, markup)?;
        info!(path = %path.display(), "Document written");

        Ok(path)
    }

    /// Crawls one section; `None` means its scope could not be built
    async fn crawl_section(&self, section: &SectionConfig) -> Result<Option<CrawledSection>> {
        let entries: Vec<EntryPoint> = section
            .pages
            .iter()
            .map(|p| EntryPoint {
                url: p.url.clone(),
                title: p.title.clone(),
            })
            .collect();

        let base_path = section.base_path.as_deref().unwrap_or("/");
        let scope = match &section.base_url {
            Some(base_url) => Scope::from_base(base_url, base_path),
            // Default scope: the origin of the first entry page
            None => {
                let first = Url::parse(&entries[0].url)?;
                Scope::new(&first, base_path)
            }
        };
        let scope = match scope {
            Ok(scope) => scope,
            Err(err) => {
                warn!(section = %section.section_name, error = %err, "Cannot build crawl scope");
                return Ok(None);
            }
        };

        let max_depth = section.max_depth.unwrap_or(1);
        info!(
            section = %section.section_name,
            entries = entries.len(),
            max_depth,
            "Crawling section"
        );

        let mut engine = CrawlEngine::new(&self.fetcher, scope, max_depth);
        let pages = engine.crawl(&entries).await;

        Ok(Some(CrawledSection {
            name: section.section_name.clone(),
            skipped: engine.skipped(),
            pages,
        }))
    }
}

/// Expands the configuration into compile jobs
///
/// Each configured document becomes one job; each standalone section becomes
/// a single-section job. The filter keeps matching standalone sections and,
/// within documents, matching member sections (documents left without any
/// are dropped).
pub fn plan_jobs(config: &Config, section_filter: Option<&str>) -> Vec<CompileJob> {
    let mut jobs = Vec::new();

    for doc in &config.documents {
        let sections: Vec<SectionConfig> = doc
            .sections
            .iter()
            .filter(|s| section_filter.map_or(true, |f| s.section_name == f))
            .cloned()
            .collect();
        if sections.is_empty() {
            continue;
        }
        jobs.push(CompileJob {
            name: doc.document_name.clone(),
            output_filename: doc.output_filename.clone(),
            metadata: doc.metadata.clone(),
            sections,
        });
    }

    for section in &config.sections {
        if section_filter.is_some_and(|f| section.section_name != f) {
            continue;
        }
        jobs.push(CompileJob {
            name: section.section_name.clone(),
            output_filename: section.output_filename.clone(),
            metadata: section.metadata.clone(),
            sections: vec![section.clone()],
        });
    }

    jobs
}

/// Derives distinct anchor ids for a document's sections
fn assign_section_slugs(sections: &[CrawledSection]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    taken.insert(TOC_SLUG.to_string());

    sections
        .iter()
        .map(|section| {
            let base = {
                let slug = slugify(&section.name);
                if slug.is_empty() {
                    "section".to_string()
                } else {
                    slug
                }
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{}-{}", base, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            candidate
        })
        .collect()
}

fn document_meta(name: &str, metadata: Option<&Metadata>) -> DocumentMeta {
    DocumentMeta {
        title: metadata
            .and_then(|m| m.title.clone())
            .unwrap_or_else(|| name.to_string()),
        author: metadata.and_then(|m| m.author.clone()),
        description: metadata.and_then(|m| m.description.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentConfig, EntryPageConfig, Settings};

    fn section(name: &str) -> SectionConfig {
        SectionConfig {
            section_name: name.to_string(),
            pages: vec![EntryPageConfig {
                url: "https://example.com/docs".to_string(),
                title: None,
            }],
            base_url: None,
            base_path: None,
            max_depth: None,
            output_filename: None,
            metadata: None,
        }
    }

    fn config() -> Config {
        Config {
            settings: Settings::default(),
            documents: vec![DocumentConfig {
                document_name: "Handbook".to_string(),
                output_filename: None,
                metadata: None,
                sections: vec![section("Delivery"), section("Design")],
            }],
            sections: vec![section("Standalone")],
        }
    }

    #[test]
    fn test_plan_jobs_without_filter() {
        let jobs = plan_jobs(&config(), None);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "Handbook");
        assert_eq!(jobs[0].sections.len(), 2);
        assert_eq!(jobs[1].name, "Standalone");
    }

    #[test]
    fn test_plan_jobs_filter_matches_document_section() {
        let jobs = plan_jobs(&config(), Some("Design"));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Handbook");
        assert_eq!(jobs[0].sections.len(), 1);
        assert_eq!(jobs[0].sections[0].section_name, "Design");
    }

    #[test]
    fn test_plan_jobs_filter_matches_standalone() {
        let jobs = plan_jobs(&config(), Some("Standalone"));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Standalone");
    }

    #[test]
    fn test_plan_jobs_filter_without_match() {
        let jobs = plan_jobs(&config(), Some("Nope"));
        assert!(jobs.is_empty());
    }

    #[test]
    fn test_section_slugs_distinct() {
        let crawled = vec![
            CrawledSection {
                name: "Standards".to_string(),
                pages: Vec::new(),
                skipped: 0,
            },
            CrawledSection {
                name: "Standards".to_string(),
                pages: Vec::new(),
                skipped: 0,
            },
        ];
        let slugs = assign_section_slugs(&crawled);
        assert_eq!(slugs, vec!["standards", "standards-2"]);
    }

    #[test]
    fn test_section_slug_avoids_toc() {
        let crawled = vec![CrawledSection {
            name: "Table of Contents".to_string(),
            pages: Vec::new(),
            skipped: 0,
        }];
        assert_eq!(assign_section_slugs(&crawled), vec!["table-of-contents-2"]);
    }

    #[test]
    fn test_document_meta_falls_back_to_name() {
        let meta = document_meta("Handbook", None);
        assert_eq!(meta.title, "Handbook");
        assert_eq!(meta.author, None);
    }

    #[test]
    fn test_document_meta_overrides() {
        let metadata = Metadata {
            title: Some("Official Handbook".to_string()),
            author: Some("Docs Team".to_string()),
            description: None,
        };
        let meta = document_meta("Handbook", Some(&metadata));
        assert_eq!(meta.title, "Official Handbook");
        assert_eq!(meta.author.as_deref(), Some("Docs Team"));
    }
}
