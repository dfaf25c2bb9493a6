//! Statement period and payment due date extraction.
//!
//! Dates stay as the literal text printed on the statement; issuers mix
//! `01-Jan-2024`, `01 Jan 2024` and `Jan 01, 2024` and nothing downstream
//! needs them as calendar values.

use super::patterns::{DUE_DATE, DUE_DATE_STRICT, STATEMENT_PERIOD};
use super::{ExtractionMatch, FieldExtractor};

/// Extracts `"<start> - <end>"` from a "Statement Period" label.
pub struct StatementPeriodExtractor;

impl StatementPeriodExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatementPeriodExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for StatementPeriodExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        STATEMENT_PERIOD
            .captures_iter(text)
            .filter_map(|caps| {
                let period = format!("{} - {}", caps[1].trim(), caps[2].trim());
                Some(ExtractionMatch::from_regex_match(period, caps.get(0)?))
            })
            .collect()
    }
}

/// Extracts the payment due date.
pub struct DueDateExtractor;

impl DueDateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Narrow the free text after the label to a date when one is present.
    fn tighten(captured: &str) -> String {
        match DUE_DATE_STRICT.find(captured) {
            Some(date) => date.as_str().trim().to_string(),
            None => captured.trim().to_string(),
        }
    }
}

impl Default for DueDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DueDateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DUE_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let value = Self::tighten(&caps[2]);
                if value.is_empty() {
                    return None;
                }
                Some(ExtractionMatch::from_regex_match(value, caps.get(0)?))
            })
            .collect()
    }
}

/// Extract the statement period.
pub fn extract_statement_period(text: &str) -> Option<String> {
    StatementPeriodExtractor::new().extract(text).map(|m| m.value)
}

/// Extract the payment due date.
pub fn extract_due_date(text: &str) -> Option<String> {
    DueDateExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_period_with_to() {
        let text = "Statement Period: 01-Jan-2024 to 31-Jan-2024 Payment Due Date: 20-Feb-2024";
        assert_eq!(
            extract_statement_period(text).as_deref(),
            Some("01-Jan-2024 - 31-Jan-2024")
        );
    }

    #[test]
    fn test_statement_period_with_dash_and_spaces() {
        let text = "statement period 15 March 2024 - 14 April 2024";
        assert_eq!(
            extract_statement_period(text).as_deref(),
            Some("15 March 2024 - 14 April 2024")
        );
    }

    #[test]
    fn test_statement_period_missing() {
        assert!(extract_statement_period("Statement Date: 01-Jan-2024").is_none());
    }

    #[test]
    fn test_due_date_tightened() {
        let text = "Payment Due Date: 20-Feb-2024 Total Amount Due: INR 1,000.00";
        assert_eq!(extract_due_date(text).as_deref(), Some("20-Feb-2024"));
    }

    #[test]
    fn test_due_date_numeric_month() {
        let text = "Due Date 05/03/2024 Minimum Amount Due: 100.00";
        assert_eq!(extract_due_date(text).as_deref(), Some("05/03/2024"));
    }

    #[test]
    fn test_due_date_free_text_fallback() {
        let text = "Payment Due Date: Immediate. Thank you";
        assert_eq!(extract_due_date(text).as_deref(), Some("Immediate"));
    }

    #[test]
    fn test_due_date_missing() {
        assert!(extract_due_date("no dates here").is_none());
    }
}
