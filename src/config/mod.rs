//! Configuration module for sitebinder
//!
//! This module handles loading, parsing, and validating JSON configuration
//! files.
//!
//! # Example
//!
//! ```no_run
//! use sitebinder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.json")).unwrap();
//! println!("Documents: {}", config.documents.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DocumentConfig, EntryPageConfig, Metadata, SectionConfig, Settings,
};

// Re-export parser and validation functions
pub use parser::load_config;
pub use validation::{validate, validate_section};
