//! Document bytes to normalized statement text.

mod extractor;

pub use extractor::{FallbackTrigger, TextExtraction, TextExtractor, TextSource};

use crate::statement::rules::patterns::WHITESPACE;

/// Collapse every whitespace run (spaces, tabs, newlines) to a single space
/// and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}
