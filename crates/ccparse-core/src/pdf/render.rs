//! Page rasterization for the OCR fallback.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, info, warn};

use super::{PdfExtractor, PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::{PdfConfig, RendererKind};

/// Turns PDF bytes into one image per page, in page order.
pub trait PageRenderer: Send + Sync {
    /// Render the pages of a document. Pages that cannot be rendered are
    /// omitted rather than failing the whole document.
    fn render_pages(&self, data: &[u8]) -> Result<Vec<DynamicImage>>;
}

/// Build the renderer selected in configuration.
pub fn renderer_from_config(config: &PdfConfig) -> Box<dyn PageRenderer> {
    let pdftoppm = || {
        PdftoppmRenderer::new(
            config.pdftoppm_path.clone(),
            config.render_dpi,
            config.page_limit(),
        )
    };
    match config.renderer {
        RendererKind::Auto => {
            Box::new(EmbeddedImageRenderer::new(config.page_limit()).with_fallback(pdftoppm()))
        }
        RendererKind::EmbeddedImages => Box::new(EmbeddedImageRenderer::new(config.page_limit())),
        RendererKind::Pdftoppm => Box::new(pdftoppm()),
    }
}

/// Uses the largest embedded image of each page as its raster.
///
/// Scanned statements carry one full-page image per page, so no rasterizer
/// is needed for them. When some page has no decodable scan and a fallback
/// rasterizer is set, the whole document is rasterized instead so that no
/// page goes missing.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedImageRenderer {
    max_pages: Option<usize>,
    fallback: Option<PdftoppmRenderer>,
}

impl EmbeddedImageRenderer {
    pub fn new(max_pages: Option<usize>) -> Self {
        Self {
            max_pages,
            fallback: None,
        }
    }

    /// Rasterize with `renderer` when the embedded scans do not cover every page.
    pub fn with_fallback(mut self, renderer: PdftoppmRenderer) -> Self {
        self.fallback = Some(renderer);
        self
    }

    fn rasterize(&self, data: &[u8], scans: Vec<DynamicImage>) -> Result<Vec<DynamicImage>> {
        let Some(fallback) = &self.fallback else {
            return Ok(scans);
        };
        match fallback.render_pages(data) {
            Ok(pages) if !pages.is_empty() => Ok(pages),
            Ok(_) => {
                warn!("Rasterizer produced no pages, keeping {} embedded scans", scans.len());
                Ok(scans)
            }
            Err(e) => {
                warn!("Rasterizer failed, keeping {} embedded scans: {}", scans.len(), e);
                Ok(scans)
            }
        }
    }
}

impl PageRenderer for EmbeddedImageRenderer {
    fn render_pages(&self, data: &[u8]) -> Result<Vec<DynamicImage>> {
        let pdf = match PdfExtractor::from_bytes(data) {
            Ok(pdf) => pdf,
            // pdftoppm copes with some files lopdf rejects.
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    debug!("Embedded scan lookup failed ({}), rasterizing", e);
                    return fallback.render_pages(data);
                }
                None => return Err(e),
            },
        };
        let limit = self
            .max_pages
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(u32::MAX)
            .min(pdf.page_count());

        let mut pages = Vec::new();
        let mut missing = 0;
        for page in 1..=limit {
            match pdf.page_scan(page) {
                Ok(Some(img)) => pages.push(img),
                Ok(None) => {
                    debug!("Page {} has no embedded image", page);
                    missing += 1;
                }
                Err(e) => {
                    warn!("No scan for page {}: {}", page, e);
                    missing += 1;
                }
            }
        }

        if missing > 0 {
            info!("{} of {} pages lack an embedded scan", missing, limit);
            return self.rasterize(data, pages);
        }

        info!("Collected {} page images", pages.len());
        Ok(pages)
    }
}

/// Rasterizes pages with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRenderer {
    binary: PathBuf,
    dpi: u32,
    max_pages: Option<usize>,
}

impl PdftoppmRenderer {
    pub fn new(binary: impl Into<PathBuf>, dpi: u32, max_pages: Option<usize>) -> Self {
        Self {
            binary: binary.into(),
            dpi,
            max_pages,
        }
    }

    fn collect_pngs(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| PdfError::Render(format!("failed to list render output: {}", e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers to a common width.
        paths.sort();
        Ok(paths)
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new("pdftoppm", 300, None)
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_pages(&self, data: &[u8]) -> Result<Vec<DynamicImage>> {
        let temp_dir = tempfile::tempdir()
            .map_err(|e| PdfError::Render(format!("failed to create temp dir: {}", e)))?;
        let input = temp_dir.path().join("statement.pdf");
        std::fs::write(&input, data)
            .map_err(|e| PdfError::Render(format!("failed to write temp PDF: {}", e)))?;
        let prefix = temp_dir.path().join("page");

        let mut cmd = Command::new(&self.binary);
        cmd.arg("-png").arg("-r").arg(self.dpi.to_string());
        if let Some(max) = self.max_pages {
            cmd.arg("-f").arg("1").arg("-l").arg(max.to_string());
        }
        cmd.arg(&input).arg(&prefix);

        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| {
            PdfError::Render(format!(
                "failed to launch {}: {}",
                self.binary.display(),
                e
            ))
        })?;

        if !output.status.success() {
            return Err(PdfError::Render(format!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let mut pages = Vec::new();
        for path in Self::collect_pngs(temp_dir.path())? {
            match image::open(&path) {
                Ok(img) => pages.push(img),
                Err(e) => warn!("Skipping unreadable render {}: {}", path.display(), e),
            }
        }

        info!("Rendered {} pages at {} DPI", pages.len(), self.dpi);
        Ok(pages)
    }
}
