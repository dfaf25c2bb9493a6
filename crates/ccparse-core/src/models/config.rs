//! Configuration structures for the extraction pipeline.
//!
//! Everything the OCR fallback needs (binary locations, model directory,
//! language) travels in these values; nothing is looked up from the
//! environment at extraction time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::catalog::IssuerCatalog;

/// Main configuration for the ccparse pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CcparseConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Issuer catalog configuration.
    pub catalog: CatalogConfig,
}

/// How pages are turned into images for OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RendererKind {
    /// Embedded scans when every page has one, otherwise `pdftoppm`.
    Auto,
    /// Use the scanned image embedded in each page (no external tools).
    EmbeddedImages,
    /// Rasterize pages with poppler's `pdftoppm`.
    Pdftoppm,
}

/// Which engine recognizes text in rendered pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackendKind {
    /// External `tesseract` binary.
    Tesseract,
    /// PaddleOCR ONNX models through `pure-onnx-ocr`.
    Onnx,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to render for OCR (0 = unlimited).
    pub max_pages: usize,

    /// Page rendering strategy.
    pub renderer: RendererKind,

    /// Location of the `pdftoppm` binary.
    pub pdftoppm_path: PathBuf,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            max_pages: 50,
            renderer: RendererKind::Auto,
            pdftoppm_path: PathBuf::from("pdftoppm"),
        }
    }
}

impl PdfConfig {
    /// `max_pages` as an option, `None` meaning unlimited.
    pub fn page_limit(&self) -> Option<usize> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Fall back to OCR when the text layer is empty.
    pub enabled: bool,

    /// Recognition engine.
    pub backend: OcrBackendKind,

    /// Location of the `tesseract` binary.
    pub tesseract_path: PathBuf,

    /// Tesseract language code(s), e.g. "eng" or "eng+hin".
    pub language: String,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,

    /// Directory with det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` tokens emitted by the ONNX recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: OcrBackendKind::Tesseract,
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_segmentation_mode: 3,
            model_dir: PathBuf::from("models"),
            keep_unk: false,
        }
    }
}

/// Issuer catalog location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog file; the built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

impl CatalogConfig {
    /// Load the configured catalog or fall back to the built-in one.
    pub fn load(&self) -> Result<IssuerCatalog, ConfigError> {
        match &self.path {
            Some(path) => IssuerCatalog::from_file(path),
            None => Ok(IssuerCatalog::default()),
        }
    }
}

impl CcparseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Page limit as an option, `None` meaning unlimited.
    pub fn page_limit(&self) -> Option<usize> {
        self.pdf.page_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CcparseConfig =
            serde_json::from_str(r#"{"ocr": {"backend": "onnx"}}"#).unwrap();
        assert_eq!(config.ocr.backend, OcrBackendKind::Onnx);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.pdf.render_dpi, 300);
        assert_eq!(config.pdf.renderer, RendererKind::Auto);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_page_limit() {
        let mut config = CcparseConfig::default();
        assert_eq!(config.page_limit(), Some(50));
        config.pdf.max_pages = 0;
        assert_eq!(config.page_limit(), None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = CcparseConfig::default();
        config.pdf.renderer = RendererKind::Pdftoppm;
        config.save(&path).unwrap();

        let loaded = CcparseConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pdf.renderer, RendererKind::Pdftoppm);
    }
}
