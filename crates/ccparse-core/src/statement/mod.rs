//! Statement field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, StatementParser};

use crate::models::statement::StatementRecord;

/// Trait for statement field extractors.
///
/// Parsing never fails: every field independently degrades to its default
/// when no rule matches.
pub trait StatementExtractor {
    /// Parse normalized text into a record plus diagnostics.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse normalized text into a record.
    fn parse_record(&self, text: &str) -> StatementRecord {
        self.parse(text).record
    }
}
