//! End-of-run summary
//!
//! This module accumulates counts while documents are compiled and prints
//! the final report of what succeeded versus what was skipped.

use std::path::PathBuf;

/// Counters accumulated across one compile run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Sections crawled and included in an output document
    pub sections_processed: u32,

    /// Sections skipped (validation failure or no usable pages)
    pub sections_skipped: u32,

    /// Pages fetched, normalized, and included
    pub pages_compiled: u32,

    /// Pages dropped (fetch failure or no extractable content)
    pub pages_skipped: u32,

    /// Output files written, in completion order
    pub documents_written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one section's crawl outcome into the totals
    pub fn record_section(&mut self, pages_compiled: u32, pages_skipped: u32) {
        self.sections_processed += 1;
        self.pages_compiled += pages_compiled;
        self.pages_skipped += pages_skipped;
    }

    pub fn record_skipped_section(&mut self) {
        self.sections_skipped += 1;
    }

    pub fn record_document(&mut self, path: PathBuf) {
        self.documents_written.push(path);
    }
}

/// Prints the run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Compile Summary ===\n");

    println!("Sections:");
    println!("  Processed: {}", summary.sections_processed);
    println!("  Skipped: {}", summary.sections_skipped);
    println!();

    println!("Pages:");
    println!("  Compiled: {}", summary.pages_compiled);
    println!("  Skipped: {}", summary.pages_skipped);
    println!();

    if summary.documents_written.is_empty() {
        println!("No documents written.");
    } else {
        println!("Documents written:");
        for path in &summary.documents_written {
            println!("  {}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_section_accumulates() {
        let mut summary = RunSummary::new();
        summary.record_section(3, 1);
        summary.record_section(2, 0);
        summary.record_skipped_section();

        assert_eq!(summary.sections_processed, 2);
        assert_eq!(summary.sections_skipped, 1);
        assert_eq!(summary.pages_compiled, 5);
        assert_eq!(summary.pages_skipped, 1);
    }

    #[test]
    fn test_record_document_preserves_order() {
        let mut summary = RunSummary::new();
        summary.record_document(PathBuf::from("out/a.html"));
        summary.record_document(PathBuf::from("out/b.html"));

        assert_eq!(
            summary.documents_written,
            vec![PathBuf::from("out/a.html"), PathBuf::from("out/b.html")]
        );
    }
}
