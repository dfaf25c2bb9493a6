//! Transaction row extraction.
//!
//! A single compound pattern is scanned across the whole text with the regex
//! engine's leftmost-first, non-overlapping semantics. Descriptions that
//! contain amount-like digit groups can split or truncate a row; rows are
//! reported as found, without deduplication.

use regex::Captures;
use tracing::{debug, trace};

use super::patterns::TRANSACTION;
use super::{ExtractionMatch, FieldExtractor};
use crate::models::statement::{TransactionRecord, TransactionType};

/// Transaction row extractor.
pub struct TransactionExtractor;

impl TransactionExtractor {
    pub fn new() -> Self {
        Self
    }

    fn build_record(caps: &Captures<'_>) -> TransactionRecord {
        let date = caps[1].to_string();
        let description = caps[3].trim().to_string();
        let first = amount_slot(caps.get(4).map(|m| m.as_str()));
        let second = amount_slot(caps.get(5).map(|m| m.as_str()));

        let kind = caps
            .get(2)
            .and_then(|t| TransactionType::from_token(t.as_str()))
            .unwrap_or_else(|| infer_type(first.is_some(), second.is_some()));

        let (debit, credit) = match kind {
            TransactionType::Debit => (first, None),
            TransactionType::Credit => (None, first.or(second)),
            TransactionType::Unknown => (None, None),
        };

        TransactionRecord {
            date,
            kind,
            description,
            debit,
            credit,
        }
    }
}

impl Default for TransactionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TransactionExtractor {
    type Output = ExtractionMatch<TransactionRecord>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TRANSACTION
            .captures_iter(text)
            .filter_map(|caps| {
                let full_match = caps.get(0)?;
                trace!("Transaction row: {}", full_match.as_str());
                Some(ExtractionMatch::from_regex_match(
                    Self::build_record(&caps),
                    full_match,
                ))
            })
            .collect()
    }
}

/// A lone dash in an amount column means the column is empty.
fn amount_slot(raw: Option<&str>) -> Option<String> {
    match raw {
        Some("-") | None => None,
        Some(amount) => Some(amount.to_string()),
    }
}

/// Direction from which amount column is filled.
fn infer_type(first_present: bool, second_present: bool) -> TransactionType {
    match (first_present, second_present) {
        (true, false) => TransactionType::Debit,
        (false, true) => TransactionType::Credit,
        _ => TransactionType::Unknown,
    }
}

/// Extract all transactions in order of appearance.
pub fn extract_transactions(text: &str) -> Vec<TransactionRecord> {
    let records: Vec<TransactionRecord> = TransactionExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect();
    debug!("Found {} transaction rows", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_debit_inferred_from_first_column() {
        let txns = extract_transactions("05-Feb-2024 Grocery Store 1,200.00 -");
        assert_eq!(
            txns,
            vec![TransactionRecord {
                date: "05-Feb-2024".to_string(),
                kind: TransactionType::Debit,
                description: "Grocery Store".to_string(),
                debit: Some("1,200.00".to_string()),
                credit: None,
            }]
        );
    }

    #[test]
    fn test_credit_inferred_from_second_column() {
        let txns = extract_transactions("10/Feb/2024 Payment Received - 5,000.00");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].kind, TransactionType::Credit);
        assert_eq!(txns[0].description, "Payment Received");
        assert_eq!(txns[0].debit, None);
        assert_eq!(txns[0].credit.as_deref(), Some("5,000.00"));
    }

    #[test]
    fn test_both_dashes_is_unknown() {
        let txns = extract_transactions("12-Feb-2024 Reversal - -");
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].kind, TransactionType::Unknown);
        assert_eq!(txns[0].debit, None);
        assert_eq!(txns[0].credit, None);
    }

    #[test]
    fn test_both_amounts_is_unknown() {
        let txns = extract_transactions("12-Feb-2024 Adjustment 10.00 20.00");
        assert_eq!(txns[0].kind, TransactionType::Unknown);
        assert_eq!(txns[0].amount(), None);
    }

    #[test]
    fn test_explicit_type_token() {
        let txns = extract_transactions(
            "01-Mar-2024 CREDIT Cashback 150.00 03-Mar-2024 DR Fuel Station 2,000.00",
        );
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].kind, TransactionType::Credit);
        assert_eq!(txns[0].description, "Cashback");
        assert_eq!(txns[0].credit.as_deref(), Some("150.00"));
        assert_eq!(txns[0].debit, None);
        assert_eq!(txns[1].kind, TransactionType::Debit);
        assert_eq!(txns[1].description, "Fuel Station");
        assert_eq!(txns[1].debit.as_deref(), Some("2,000.00"));
    }

    #[test]
    fn test_explicit_credit_with_empty_first_column() {
        let txns = extract_transactions("01-Mar-2024 CREDIT Refund - 99.00");
        assert_eq!(txns[0].kind, TransactionType::Credit);
        assert_eq!(txns[0].credit.as_deref(), Some("99.00"));
    }

    #[test]
    fn test_order_of_appearance() {
        let text = "Transactions 01-Jan-2024 Coffee & Co 120.00 - \
                    02-Jan-2024 Book-Store 450.50 - \
                    03-Jan-2024 Refund - 120.00";
        let txns = extract_transactions(text);
        let dates: Vec<&str> = txns.iter().map(|t| t.date.as_str()).collect();
        assert_eq!(dates, ["01-Jan-2024", "02-Jan-2024", "03-Jan-2024"]);
        assert_eq!(txns[0].description, "Coffee & Co");
        assert_eq!(txns[1].description, "Book-Store");
        assert_eq!(txns[2].kind, TransactionType::Credit);
    }

    #[test]
    fn test_never_both_debit_and_credit() {
        let text = "01-Jan-2024 DEBIT A 1.00 2.00 02-Jan-2024 CREDIT B 3.00 4.00 \
                    03-Jan-2024 C 5.00 6.00 04-Jan-2024 D - 7.00";
        for txn in extract_transactions(text) {
            assert!(!(txn.debit.is_some() && txn.credit.is_some()), "{:?}", txn);
        }
    }

    #[test]
    fn test_no_transactions() {
        assert!(extract_transactions("Statement Period: 01-Jan-2024 to 31-Jan-2024").is_empty());
    }
}
