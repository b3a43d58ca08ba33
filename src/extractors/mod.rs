// src/extractors/mod.rs
pub mod rows;
pub mod section;
pub mod tabula;

// Re-export key extraction types for convenience
pub use rows::{parse_rows, Row};
pub use section::{SectionExtractor, SectionRequest};
pub use tabula::{TabulaConfig, TabulaExtractor};
