//! Output module for document assembly and run reporting
//!
//! This module handles:
//! - Assembling normalized sections into one self-contained HTML document
//! - Recording and printing the end-of-run summary

mod assembler;
pub mod stats;

pub use assembler::{assemble_document, DocumentMeta, SectionPages};
pub use stats::{print_summary, RunSummary};
