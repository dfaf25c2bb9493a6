//! Data models and configuration.

pub mod catalog;
pub mod config;
pub mod statement;

pub use catalog::{IssuerCatalog, IssuerEntry};
pub use config::CcparseConfig;
pub use statement::{MaskedCardNumber, StatementRecord, TransactionRecord, TransactionType, UNKNOWN};
