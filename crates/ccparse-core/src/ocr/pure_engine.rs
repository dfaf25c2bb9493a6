//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;

use super::{join_rows, sort_reading_order, PageRecognizer, TextBox};

/// Vertical band, in pixels, treated as one text row.
const ROW_HEIGHT: f32 = 20.0;

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from `det.onnx`, `latin_rec.onnx` and
    /// `latin_dict.txt` in a directory.
    pub fn from_dir(model_dir: &Path, keep_unk: bool) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unk,
        })
    }

    /// Detect and recognize text boxes, sorted into reading order.
    pub fn detect(&self, image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        debug!("Processing image: {}x{}", width, height);

        let engine = self
            .engine
            .lock()
            .map_err(|_| OcrError::Recognition("OCR engine lock poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;
        drop(engine);

        let mut boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
            })
            .collect();
        sort_reading_order(&mut boxes, ROW_HEIGHT);

        info!(
            "OCR complete: {} text boxes in {}ms",
            boxes.len(),
            start.elapsed().as_millis()
        );
        Ok(boxes)
    }
}

impl PageRecognizer for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let boxes = self.detect(image)?;
        Ok(join_rows(&boxes, ROW_HEIGHT))
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
