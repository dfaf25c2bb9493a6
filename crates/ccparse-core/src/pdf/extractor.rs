//! PDF text-layer and page-image extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// A loaded PDF document.
pub struct PdfExtractor {
    document: Option<Document>,
    /// Document bytes handed to pdf-extract (decrypted when needed).
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create an empty extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a document from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))
    }

    /// Largest embedded image on a page, which for scanned statements is the
    /// page itself.
    pub fn page_scan(&self, page: u32) -> Result<Option<DynamicImage>> {
        let images = self.extract_images(page)?;
        Ok(images
            .into_iter()
            .max_by_key(|img| u64::from(img.width()) * u64::from(img.height())))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            // Statements are often "protected" with an empty user password.
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        self.document()?;

        // pdf-extract panics on some malformed content streams.
        let data = &self.raw_data;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        match outcome {
            Ok(Ok(pages)) => {
                debug!("Extracted text layer from {} pages", pages.len());
                Ok(pages)
            }
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction(
                "text extraction panicked on malformed content".to_string(),
            )),
        }
    }

    fn extract_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;
        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, Object::Stream(stream))) = doc.dereference(obj_ref) {
                            if let Some(img) = decode_image_xobject(doc, stream) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

/// Resources dictionary of a page, walking up the page tree for inherited ones.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

/// Decode an image XObject into pixels.
///
/// JPEG streams are decoded directly; 8-bit RGB and grayscale streams are
/// rebuilt from their decompressed samples. Other encodings are skipped.
fn decode_image_xobject(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Found image object: {}x{}", width, height);
    if width == 0 || height == 0 {
        return None;
    }

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping unsupported image filter {:?}", filter.map(String::from_utf8_lossy));
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let channels: usize = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => {
            trace!("Unsupported colorspace {}", String::from_utf8_lossy(color_space));
            return None;
        }
    };

    // Dimensions come straight from the file and may be absurd.
    let Some(expected) = sample_len(width, height, channels) else {
        trace!("Image dimensions {}x{} overflow", width, height);
        return None;
    };

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    if data.len() < expected {
        trace!(
            "Image data too short: expected {} bytes, got {}",
            expected,
            data.len()
        );
        return None;
    }

    let samples = data[..expected].to_vec();
    if channels == 3 {
        RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
    }
}

/// Byte length of an 8-bit image, `None` when it does not fit in memory.
fn sample_len(width: u32, height: u32, channels: usize) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(channels)
}
