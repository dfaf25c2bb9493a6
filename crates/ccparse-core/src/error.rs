//! Error types for the ccparse-core library.
//!
//! None of these escape [`TextExtractor::extract`](crate::text::TextExtractor::extract)
//! or the statement parser; they describe failures of the individual stages
//! so the extractor can decide which fallback to take.

use thiserror::Error;

/// Main error type for the ccparse library.
#[derive(Error, Debug)]
pub enum CcparseError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Configuration or catalog error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to render a page to an image.
    #[error("failed to render page: {0}")]
    Render(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The recognition engine could not be started.
    #[error("failed to launch OCR engine: {0}")]
    Launch(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to configuration files and the issuer catalog.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file contents are not valid JSON for the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog has an entry that cannot be used for matching.
    #[error("invalid catalog: {0}")]
    Catalog(String),
}

/// Result type for the ccparse library.
pub type Result<T> = std::result::Result<T, CcparseError>;
