//! Text-layer extraction with OCR fallback.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::normalize_whitespace;
use crate::error::{CcparseError, PdfError};
use crate::models::config::CcparseConfig;
use crate::ocr::{recognizer_from_config, PageRecognizer};
use crate::pdf::{renderer_from_config, PageRenderer, PdfExtractor, PdfProcessor};

/// Why the text layer was abandoned in favour of OCR.
#[derive(Error, Debug)]
pub enum FallbackTrigger {
    /// The document could not be opened or its text layer could not be read.
    #[error("text layer unavailable: {0}")]
    TextLayerFailed(#[source] PdfError),

    /// The text layer was readable but held only whitespace.
    #[error("text layer is empty")]
    EmptyTextLayer,
}

/// Where the returned text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Embedded PDF text layer.
    TextLayer,
    /// OCR of rendered pages.
    Ocr,
    /// Nothing could be extracted.
    Empty,
}

impl TextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextSource::TextLayer => "text_layer",
            TextSource::Ocr => "ocr",
            TextSource::Empty => "empty",
        }
    }
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized text plus how it was obtained.
#[derive(Debug)]
pub struct TextExtraction {
    /// Whitespace-normalized text; empty on total failure.
    pub text: String,
    /// Which stage produced `text`.
    pub source: TextSource,
    /// Set when the text layer was abandoned.
    pub fallback: Option<FallbackTrigger>,
    /// Pages read by the stage that produced the text.
    pub pages: usize,
}

struct OcrStage {
    renderer: Box<dyn PageRenderer>,
    recognizer: Box<dyn PageRecognizer>,
}

/// Turns document bytes into normalized text.
///
/// The embedded text layer is preferred; when it cannot be read or is
/// blank, pages are rendered and recognized instead. Extraction never
/// fails: total failure yields empty text.
pub struct TextExtractor {
    ocr: Option<OcrStage>,
    page_limit: Option<usize>,
}

impl TextExtractor {
    /// Extractor with an OCR fallback made of the given engines.
    pub fn new(renderer: Box<dyn PageRenderer>, recognizer: Box<dyn PageRecognizer>) -> Self {
        Self {
            ocr: Some(OcrStage {
                renderer,
                recognizer,
            }),
            page_limit: None,
        }
    }

    /// Extractor that only reads the text layer.
    pub fn text_layer_only() -> Self {
        Self {
            ocr: None,
            page_limit: None,
        }
    }

    /// Build the extractor described by configuration.
    pub fn from_config(config: &CcparseConfig) -> Result<Self, CcparseError> {
        let extractor = if config.ocr.enabled {
            let renderer = renderer_from_config(&config.pdf);
            let recognizer = recognizer_from_config(&config.ocr)?;
            Self::new(renderer, recognizer)
        } else {
            Self::text_layer_only()
        };
        Ok(extractor.with_page_limit(config.page_limit()))
    }

    /// Cap the number of pages sent to OCR.
    pub fn with_page_limit(mut self, limit: Option<usize>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Whether an OCR fallback is configured.
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Extract normalized text from document bytes.
    pub fn extract(&self, bytes: &[u8]) -> String {
        self.extract_detailed(bytes).text
    }

    /// Extract normalized text and report which stage produced it.
    pub fn extract_detailed(&self, bytes: &[u8]) -> TextExtraction {
        let trigger = match read_text_layer(bytes) {
            Ok((text, pages)) if !text.trim().is_empty() => {
                info!("Using text layer from {} pages", pages);
                return TextExtraction {
                    text: normalize_whitespace(&text),
                    source: TextSource::TextLayer,
                    fallback: None,
                    pages,
                };
            }
            Ok(_) => FallbackTrigger::EmptyTextLayer,
            Err(e) => FallbackTrigger::TextLayerFailed(e),
        };

        let Some(ocr) = &self.ocr else {
            info!("No usable text layer ({}) and OCR is disabled", trigger);
            return empty(Some(trigger));
        };

        info!("Falling back to OCR: {}", trigger);
        let (text, pages) = self.run_ocr(ocr, bytes);
        let text = normalize_whitespace(&text);
        let source = if text.is_empty() {
            TextSource::Empty
        } else {
            TextSource::Ocr
        };

        TextExtraction {
            text,
            source,
            fallback: Some(trigger),
            pages,
        }
    }

    fn run_ocr(&self, ocr: &OcrStage, bytes: &[u8]) -> (String, usize) {
        let images = match ocr.renderer.render_pages(bytes) {
            Ok(images) => images,
            Err(e) => {
                warn!("Page rendering failed: {}", e);
                return (String::new(), 0);
            }
        };

        let limit = self.page_limit.unwrap_or(usize::MAX);
        let mut text = String::new();
        let mut pages = 0;

        for (index, image) in images.iter().take(limit).enumerate() {
            match ocr.recognizer.recognize(image) {
                Ok(page_text) => {
                    debug!("Page {}: {} characters", index + 1, page_text.len());
                    text.push_str(&page_text);
                }
                Err(e) => warn!("OCR failed on page {}: {}", index + 1, e),
            }
            text.push('\n');
            pages += 1;
        }

        (text, pages)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::text_layer_only()
    }
}

fn empty(fallback: Option<FallbackTrigger>) -> TextExtraction {
    TextExtraction {
        text: String::new(),
        source: TextSource::Empty,
        fallback,
        pages: 0,
    }
}

/// Page texts joined in page order, with the page count.
fn read_text_layer(bytes: &[u8]) -> Result<(String, usize), PdfError> {
    let pdf = PdfExtractor::from_bytes(bytes)?;
    let pages = pdf.extract_page_texts()?;
    Ok((pages.join("\n"), pages.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Renders a fixed number of blank pages.
    struct BlankPages(usize);

    impl PageRenderer for BlankPages {
        fn render_pages(&self, _data: &[u8]) -> crate::pdf::Result<Vec<DynamicImage>> {
            Ok((0..self.0)
                .map(|i| DynamicImage::new_luma8(10 + i as u32, 10))
                .collect())
        }
    }

    struct FailingRenderer;

    impl PageRenderer for FailingRenderer {
        fn render_pages(&self, _data: &[u8]) -> crate::pdf::Result<Vec<DynamicImage>> {
            Err(PdfError::Render("no rasterizer".to_string()))
        }
    }

    /// Reports the page width so page order is observable; fails on width 11.
    struct WidthRecognizer {
        calls: Arc<AtomicUsize>,
    }

    impl PageRecognizer for WidthRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match image.width() {
                11 => Err(OcrError::Recognition("smudged".to_string())),
                w => Ok(format!("page  width\t{}", w)),
            }
        }
    }

    fn ocr_extractor(pages: usize) -> (TextExtractor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let extractor = TextExtractor::new(
            Box::new(BlankPages(pages)),
            Box::new(WidthRecognizer {
                calls: calls.clone(),
            }),
        );
        (extractor, calls)
    }

    #[test]
    fn test_garbage_bytes_fall_back_to_ocr() {
        let (extractor, _) = ocr_extractor(1);
        let result = extractor.extract_detailed(b"not a pdf at all");
        assert_eq!(result.text, "page width 10");
        assert_eq!(result.source, TextSource::Ocr);
        assert!(matches!(
            result.fallback,
            Some(FallbackTrigger::TextLayerFailed(_))
        ));
    }

    #[test]
    fn test_pages_in_order_and_failed_page_skipped() {
        let (extractor, calls) = ocr_extractor(3);
        let result = extractor.extract_detailed(b"");
        assert_eq!(result.text, "page width 10 page width 12");
        assert_eq!(result.pages, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_page_limit_caps_recognition() {
        let (extractor, calls) = ocr_extractor(5);
        let extractor = extractor.with_page_limit(Some(2));
        let result = extractor.extract_detailed(b"");
        assert_eq!(result.pages, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_render_failure_yields_empty() {
        let extractor = TextExtractor::new(
            Box::new(FailingRenderer),
            Box::new(WidthRecognizer {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let result = extractor.extract_detailed(b"garbage");
        assert_eq!(result.text, "");
        assert_eq!(result.source, TextSource::Empty);
        assert!(result.fallback.is_some());
    }

    #[test]
    fn test_text_layer_only_yields_empty_for_garbage() {
        let extractor = TextExtractor::text_layer_only();
        assert!(!extractor.has_ocr());
        assert_eq!(extractor.extract(b"\x00\x01\x02"), "");
        assert_eq!(extractor.extract(&[]), "");
    }

    #[test]
    fn test_from_config_respects_disabled_ocr() {
        let mut config = CcparseConfig::default();
        config.ocr.enabled = false;
        let extractor = TextExtractor::from_config(&config).unwrap();
        assert!(!extractor.has_ocr());
    }

    #[test]
    fn test_extractor_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TextExtractor>();
    }
}
