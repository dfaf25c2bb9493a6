//! Rule-based statement parser.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::catalog::IssuerCatalog;
use crate::models::statement::StatementRecord;

use super::rules::{
    amounts::extract_amounts,
    card::{extract_card, VariantCatalog},
    dates::{extract_due_date, extract_statement_period},
    issuer::IssuerExtractor,
    transactions::extract_transactions,
    FieldExtractor,
};
use super::StatementExtractor;

/// Result of statement extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted statement data.
    pub record: StatementRecord,
    /// One entry per field left at its default.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Statement parser applying the ordered per-field rules.
///
/// Patterns derived from the issuer catalog are compiled once here; the
/// parser is immutable afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct StatementParser {
    catalog: IssuerCatalog,
    issuers: IssuerExtractor,
    variants: VariantCatalog,
}

impl StatementParser {
    /// Create a parser with the built-in issuer catalog.
    pub fn new() -> Self {
        Self::with_catalog(IssuerCatalog::default())
    }

    /// Create a parser with a custom issuer catalog.
    pub fn with_catalog(catalog: IssuerCatalog) -> Self {
        let issuers = IssuerExtractor::new(&catalog);
        let variants = VariantCatalog::new(&catalog);
        Self {
            catalog,
            issuers,
            variants,
        }
    }

    /// The catalog this parser resolves issuers and variants against.
    pub fn catalog(&self) -> &IssuerCatalog {
        &self.catalog
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementExtractor for StatementParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        info!("Parsing statement from {} characters of text", text.len());

        let issuer = self.issuers.extract(text).map(|m| m.value);
        let card = extract_card(text, issuer.as_deref(), &self.variants);
        let amounts = extract_amounts(text);

        let record = StatementRecord {
            issuer,
            card_number: card.number,
            card_variant: card.variant,
            statement_period: extract_statement_period(text),
            payment_due_date: extract_due_date(text),
            total_amount_due: amounts.total_due,
            minimum_amount_due: amounts.minimum_due,
            transactions: extract_transactions(text),
        };

        let mut warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();
        if record.transactions.is_empty() {
            warnings.push("Could not extract transactions".to_string());
        }

        debug!(
            "Extracted statement: issuer={:?}, {} transactions, {} warnings",
            record.issuer,
            record.transactions.len(),
            warnings.len()
        );

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
