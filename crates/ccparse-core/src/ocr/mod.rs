//! Text recognition for rendered statement pages.

#[cfg(feature = "native")]
mod pure_engine;
mod tesseract;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;
pub use tesseract::TesseractRecognizer;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{OcrBackendKind, OcrConfig};

/// Recognizes the text of one page image.
pub trait PageRecognizer: Send + Sync {
    /// Plain text of the page, lines separated by newlines.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Build the recognizer selected in configuration.
pub fn recognizer_from_config(config: &OcrConfig) -> Result<Box<dyn PageRecognizer>, OcrError> {
    match config.backend {
        OcrBackendKind::Tesseract => Ok(Box::new(TesseractRecognizer::new(
            config.tesseract_path.clone(),
            config.language.clone(),
            config.page_segmentation_mode,
        ))),
        #[cfg(feature = "native")]
        OcrBackendKind::Onnx => Ok(Box::new(PureOcrEngine::from_dir(
            &config.model_dir,
            config.keep_unk,
        )?)),
        #[cfg(not(feature = "native"))]
        OcrBackendKind::Onnx => Err(OcrError::ModelLoad(
            "ONNX backend requires the `native` feature".to_string(),
        )),
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes into reading order: rows of `row_height` pixels top to bottom,
/// left to right within a row.
pub fn sort_reading_order(boxes: &mut [TextBox], row_height: f32) {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / row_height) as i32;
        let row_b = (by / row_height) as i32;
        row_a
            .cmp(&row_b)
            .then(ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal))
    });
}

/// Join boxes into page text, one line per visual row.
pub fn join_rows(boxes: &[TextBox], row_height: f32) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_row = None;

    for b in boxes {
        let (_, y, _, _) = b.rect();
        let row = (y / row_height) as i32;
        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(&b.text);
            }
            _ => lines.push(b.text.clone()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
        }
    }

    #[test]
    fn test_text_box_rect() {
        let b = text_box(10.0, 20.0, "x");
        assert_eq!(b.rect(), (10.0, 20.0, 60.0, 30.0));
    }

    #[test]
    fn test_reading_order_and_rows() {
        let mut boxes = vec![
            text_box(200.0, 45.0, "1,200.00"),
            text_box(10.0, 5.0, "HDFC"),
            text_box(10.0, 42.0, "Grocery"),
            text_box(80.0, 8.0, "Bank"),
        ];
        sort_reading_order(&mut boxes, 20.0);
        let order: Vec<&str> = boxes.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(order, ["HDFC", "Bank", "Grocery", "1,200.00"]);
        assert_eq!(join_rows(&boxes, 20.0), "HDFC Bank\nGrocery 1,200.00");
    }

    #[test]
    fn test_tesseract_from_config() {
        let config = OcrConfig::default();
        assert!(recognizer_from_config(&config).is_ok());
    }
}
