//! Rule-based field extractors for credit-card statements.
//!
//! Each field has its own module and its own fallback chain; no rule looks at
//! the output of another except card-variant lookup, which needs the issuer.

pub mod amounts;
pub mod card;
pub mod dates;
pub mod issuer;
pub mod patterns;
pub mod transactions;

pub use amounts::{extract_amounts, parse_amount, AmountExtractor, StatementAmounts};
pub use card::{extract_card, CardDetails, CardNumberExtractor, VariantCatalog};
pub use dates::{extract_due_date, extract_statement_period, DueDateExtractor, StatementPeriodExtractor};
pub use issuer::IssuerExtractor;
pub use transactions::{extract_transactions, TransactionExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// An extracted value together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub(crate) fn from_regex_match(value: T, m: regex::Match<'_>) -> Self {
        Self::new(value, m.as_str()).with_position(m.start(), m.end())
    }
}
