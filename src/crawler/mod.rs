//! Crawler module for section fetching and traversal
//!
//! This module contains the crawling logic for one site section, including:
//! - HTTP fetching with politeness delay and retry logic
//! - Main content extraction and chrome stripping
//! - Bounded depth-first traversal of in-scope links

mod engine;
mod extract;
mod fetcher;

pub use engine::{CrawlEngine, EntryPoint};
pub use extract::{extract_page, ExtractedPage};
pub use fetcher::{FetchError, HttpFetcher};
