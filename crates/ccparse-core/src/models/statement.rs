//! Credit-card statement data models.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::statement::rules::amounts::parse_amount;

/// Sentinel written for every field that could not be resolved.
pub const UNKNOWN: &str = "unknown";

/// A complete statement record.
///
/// Unresolved scalar fields are `None` in memory and serialize as `"unknown"`,
/// so every key is always present in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRecord {
    /// Card issuer, one of the catalog names.
    #[serde(with = "unknown_sentinel", default)]
    pub issuer: Option<String>,

    /// Masked card number.
    #[serde(with = "unknown_sentinel", default)]
    pub card_number: Option<MaskedCardNumber>,

    /// Card product tier, e.g. "Regalia".
    #[serde(with = "unknown_sentinel", default)]
    pub card_variant: Option<String>,

    /// `"<start> - <end>"` with both dates exactly as printed.
    #[serde(with = "unknown_sentinel", default)]
    pub statement_period: Option<String>,

    /// Due date exactly as printed.
    #[serde(with = "unknown_sentinel", default)]
    pub payment_due_date: Option<String>,

    /// Total amount due, original formatting kept.
    #[serde(with = "unknown_sentinel", default)]
    pub total_amount_due: Option<String>,

    /// Minimum amount due, original formatting kept.
    #[serde(with = "unknown_sentinel", default)]
    pub minimum_amount_due: Option<String>,

    /// Transactions in order of appearance.
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

impl StatementRecord {
    /// True when no field at all could be resolved.
    pub fn is_empty(&self) -> bool {
        self.issuer.is_none()
            && self.card_number.is_none()
            && self.card_variant.is_none()
            && self.statement_period.is_none()
            && self.payment_due_date.is_none()
            && self.total_amount_due.is_none()
            && self.minimum_amount_due.is_none()
            && self.transactions.is_empty()
    }

    /// Names of scalar fields left at the sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.issuer.is_none() {
            missing.push("issuer");
        }
        if self.card_number.is_none() {
            missing.push("cardNumber");
        }
        if self.card_variant.is_none() {
            missing.push("cardVariant");
        }
        if self.statement_period.is_none() {
            missing.push("statementPeriod");
        }
        if self.payment_due_date.is_none() {
            missing.push("paymentDueDate");
        }
        if self.total_amount_due.is_none() {
            missing.push("totalAmountDue");
        }
        if self.minimum_amount_due.is_none() {
            missing.push("minimumAmountDue");
        }
        missing
    }

    /// Sum of all debit amounts.
    pub fn total_debits(&self) -> Decimal {
        self.transactions
            .iter()
            .filter_map(|t| t.debit.as_deref().and_then(parse_amount))
            .sum()
    }

    /// Sum of all credit amounts.
    pub fn total_credits(&self) -> Decimal {
        self.transactions
            .iter()
            .filter_map(|t| t.credit.as_deref().and_then(parse_amount))
            .sum()
    }
}

/// A single statement line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Date exactly as printed (`dd-Mon-yyyy` or `dd/Mon/yyyy`).
    pub date: String,

    /// Direction of the transaction.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Merchant or narration text.
    pub description: String,

    /// Amount charged; only set for debits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit: Option<String>,

    /// Amount refunded or paid; only set for credits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
}

impl TransactionRecord {
    /// The populated amount literal, whichever slot holds it.
    pub fn amount(&self) -> Option<&str> {
        self.debit.as_deref().or(self.credit.as_deref())
    }

    /// The populated amount as a decimal.
    pub fn amount_value(&self) -> Option<Decimal> {
        self.amount().and_then(parse_amount)
    }
}

/// Transaction direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "DEBIT")]
    Debit,
    #[serde(rename = "CREDIT")]
    Credit,
    #[serde(rename = "unknown")]
    Unknown,
}

impl TransactionType {
    /// Map an explicit type token from the statement.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "DEBIT" | "DR" => Some(Self::Debit),
            "CREDIT" | "CR" => Some(Self::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card number with everything but the last four digits masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaskedCardNumber([u8; 4]);

impl MaskedCardNumber {
    /// Fixed mask printed before the last four digits.
    pub const PREFIX: &'static str = "XXXX-XXXX-XXXX-";

    /// Build from exactly four ASCII digits.
    pub fn from_last_four(digits: &str) -> Option<Self> {
        let bytes = digits.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return None;
        }
        Some(Self([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// The trailing digits.
    pub fn last_four(&self) -> &str {
        // Only ASCII digits are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("0000")
    }
}

impl fmt::Display for MaskedCardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.last_four())
    }
}

impl FromStr for MaskedCardNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(Self::PREFIX)
            .and_then(Self::from_last_four)
            .ok_or_else(|| format!("not a masked card number: {}", s))
    }
}

impl Serialize for MaskedCardNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MaskedCardNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter writing `None` as `"unknown"` and reading it back.
mod unknown_sentinel {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::UNKNOWN;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(UNKNOWN),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some(UNKNOWN) => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
