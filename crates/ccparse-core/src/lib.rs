//! Core library for credit-card statement extraction.
//!
//! This crate provides:
//! - PDF processing (text layer and page images)
//! - OCR fallback through tesseract or PaddleOCR ONNX models
//! - Statement field extraction (issuer, card, dates, amounts, transactions)
//! - Statement data models with a stable JSON shape

pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod statement;
pub mod text;

pub use error::{CcparseError, Result};
pub use models::{
    CcparseConfig, IssuerCatalog, IssuerEntry, MaskedCardNumber, StatementRecord,
    TransactionRecord, TransactionType, UNKNOWN,
};
pub use ocr::{PageRecognizer, TesseractRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{EmbeddedImageRenderer, PageRenderer, PdfExtractor, PdfProcessor, PdftoppmRenderer};
pub use pipeline::{PipelineOutput, StatementPipeline};
pub use statement::rules::parse_amount;
pub use statement::{ExtractionResult, StatementExtractor, StatementParser};
pub use text::{normalize_whitespace, FallbackTrigger, TextExtraction, TextExtractor, TextSource};
