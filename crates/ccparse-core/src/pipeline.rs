//! Document bytes to statement record.

use std::time::Instant;

use tracing::info;

use crate::error::CcparseError;
use crate::models::config::CcparseConfig;
use crate::models::statement::StatementRecord;
use crate::statement::{StatementExtractor, StatementParser};
use crate::text::{normalize_whitespace, FallbackTrigger, TextExtractor, TextSource};

/// Outcome of running the pipeline on one document.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Extracted record; all defaults when nothing was recognized.
    pub record: StatementRecord,
    /// Normalized text the record was parsed from.
    pub text: String,
    /// Stage that produced the text, `None` when text was supplied directly.
    pub source: Option<TextSource>,
    /// Why the text layer was abandoned, if it was.
    pub fallback: Option<FallbackTrigger>,
    /// Fields left at their defaults.
    pub warnings: Vec<String>,
    /// Wall time for extraction and parsing.
    pub processing_time_ms: u64,
}

/// Text extraction followed by field parsing.
pub struct StatementPipeline {
    extractor: TextExtractor,
    parser: StatementParser,
}

impl StatementPipeline {
    pub fn new(extractor: TextExtractor, parser: StatementParser) -> Self {
        Self { extractor, parser }
    }

    /// Build extractor and parser (including the issuer catalog) from configuration.
    pub fn from_config(config: &CcparseConfig) -> Result<Self, CcparseError> {
        let catalog = config.catalog.load()?;
        let extractor = TextExtractor::from_config(config)?;
        Ok(Self::new(extractor, StatementParser::with_catalog(catalog)))
    }

    pub fn extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    pub fn parser(&self) -> &StatementParser {
        &self.parser
    }

    /// Extract text from document bytes and parse it.
    pub fn process(&self, bytes: &[u8]) -> PipelineOutput {
        let start = Instant::now();
        let extraction = self.extractor.extract_detailed(bytes);
        let result = self.parser.parse(&extraction.text);

        info!(
            "Processed {} bytes via {} in {}ms",
            bytes.len(),
            extraction.source,
            start.elapsed().as_millis()
        );

        PipelineOutput {
            record: result.record,
            text: extraction.text,
            source: Some(extraction.source),
            fallback: extraction.fallback,
            warnings: result.warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Parse text that was already extracted elsewhere.
    pub fn process_text(&self, text: &str) -> PipelineOutput {
        let start = Instant::now();
        let text = normalize_whitespace(text);
        let result = self.parser.parse(&text);

        PipelineOutput {
            record: result.record,
            text,
            source: None,
            fallback: None,
            warnings: result.warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for StatementPipeline {
    fn default() -> Self {
        Self::new(TextExtractor::default(), StatementParser::default())
    }
}
