//! Common regex patterns for credit-card statement extraction.
//!
//! All patterns run against whitespace-normalized single-line text, so none
//! of them rely on line anchors.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Masked card number printed next to a "Card" label, with an optional variant
    pub static ref CARD_LINE: Regex = Regex::new(
        r"(?i)Card\s+(?:Variant\s*[:\-]?\s*)?([A-Za-z]+)?\s*\(?XXXX[-\s]*XXXX[-\s]*XXXX[-\s]*([0-9]{4})\)?"
    ).unwrap();

    pub static ref MASKED_NUMBER: Regex = Regex::new(
        r"(?i)XXXX[-\s]*XXXX[-\s]*XXXX[-\s]*([0-9]{4})"
    ).unwrap();

    // Statement period: two loose date tokens joined by a dash or "to"
    pub static ref STATEMENT_PERIOD: Regex = Regex::new(
        r"(?i)Statement\s+Period[:\-]?\s*([0-9]{1,2}[-\s]?[A-Za-z]{3,}[-\s]?\d{4})\s*(?:-|to)\s*([0-9]{1,2}[-\s]?[A-Za-z]{3,}[-\s]?\d{4})"
    ).unwrap();

    // Due date label followed by free text
    pub static ref DUE_DATE: Regex = Regex::new(
        r"(?i)(Payment\s+Due\s+Date|Due\s+Date)[:\-]?\s*([A-Za-z0-9 ,/\-]+)"
    ).unwrap();

    // Stricter date inside the due date capture: day, month name or number, year
    pub static ref DUE_DATE_STRICT: Regex = Regex::new(
        r"\d{1,2}\s*[-/]?\s*(?:[A-Za-z]{3,}|\d{1,2})\s*[-/]?\s*\d{4}"
    ).unwrap();

    // Labeled amounts with an optional currency token
    pub static ref TOTAL_AMOUNT_DUE: Regex = Regex::new(
        r"(?i)Total\s+Amount\s+Due[:\-]?\s*(?:(?:INR|Rs\.?|₹)\s*)?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref MINIMUM_AMOUNT_DUE: Regex = Regex::new(
        r"(?i)Minimum\s+Amount\s+Due[:\-]?\s*(?:(?:INR|Rs\.?|₹)\s*)?([\d,]+\.\d{2})"
    ).unwrap();

    // Transaction row: date, optional type token, description, one or two amount slots
    pub static ref TRANSACTION: Regex = Regex::new(
        r"(\d{2}[-/][A-Za-z]{3}[-/]\d{4})\s+(?:(DEBIT|CREDIT|DR|CR)\s+)?([\w\s&\-.]+?)\s+([\d,]+\.\d{2}|-)(?:\s+([\d,]+\.\d{2}|-))?"
    ).unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}
