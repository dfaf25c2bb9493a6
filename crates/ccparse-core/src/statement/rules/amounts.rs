//! Amount extraction for credit-card statements.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{MINIMUM_AMOUNT_DUE, TOTAL_AMOUNT_DUE};
use super::{ExtractionMatch, FieldExtractor};
use regex::Regex;

/// Labeled amount extractor.
///
/// The captured literal is kept as printed ("12,345.67") so the record
/// preserves the statement's own formatting.
pub struct AmountExtractor {
    pattern: &'static Regex,
}

impl AmountExtractor {
    /// Extractor for "Total Amount Due".
    pub fn total_due() -> Self {
        Self {
            pattern: &*TOTAL_AMOUNT_DUE,
        }
    }

    /// Extractor for "Minimum Amount Due".
    pub fn minimum_due() -> Self {
        Self {
            pattern: &*MINIMUM_AMOUNT_DUE,
        }
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let amount = caps.get(1)?;
                Some(ExtractionMatch::from_regex_match(amount.as_str().to_string(), amount))
            })
            .collect()
    }
}

/// Labeled amounts from a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementAmounts {
    /// Total amount due.
    pub total_due: Option<String>,
    /// Minimum amount due.
    pub minimum_due: Option<String>,
}

/// Extract total and minimum amount due, each independently.
pub fn extract_amounts(text: &str) -> StatementAmounts {
    StatementAmounts {
        total_due: AmountExtractor::total_due().extract(text).map(|m| m.value),
        minimum_due: AmountExtractor::minimum_due().extract(text).map(|m| m.value),
    }
}

/// Parse a statement amount literal ("12,345.67", "1,20,000.00") as a decimal.
///
/// Commas are treated as thousands/lakh separators only.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}
