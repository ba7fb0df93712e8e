//! URL resolution, canonicalization, and crawl-scope classification
//!
//! Everything in this module is pure: no network access, no side effects.

mod canonical;
mod scope;

pub use canonical::{canonicalize, canonicalize_str, last_path_segment, resolve_href};
pub use scope::Scope;
