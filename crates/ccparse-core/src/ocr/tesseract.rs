//! Recognition through an external `tesseract` binary.

use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::PageRecognizer;
use crate::error::OcrError;

/// Runs `tesseract <image> stdout` on a temporary PNG of the page.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    language: String,
    page_segmentation_mode: u8,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>, psm: u8) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            page_segmentation_mode: psm,
        }
    }

    fn command(&self, image_path: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string());
        cmd
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("tesseract", "eng", 3)
    }
}

impl PageRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{}", width, height)));
        }

        let temp_dir = tempfile::tempdir()
            .map_err(|e| OcrError::Launch(format!("failed to create temp dir: {}", e)))?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save(&image_path)
            .map_err(|e| OcrError::InvalidImage(format!("failed to write page image: {}", e)))?;

        let mut cmd = self.command(&image_path);
        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| {
            OcrError::Launch(format!("{}: {}", self.binary.display(), e))
        })?;

        if !output.status.success() {
            return Err(OcrError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(
            "Tesseract recognized {} characters from {}x{} page in {}ms",
            text.len(),
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let recognizer = TesseractRecognizer::new("/opt/tess/bin/tesseract", "eng+hin", 6);
        let cmd = recognizer.command(std::path::Path::new("/tmp/page.png"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(cmd.get_program(), "/opt/tess/bin/tesseract");
        assert_eq!(args, ["/tmp/page.png", "stdout", "-l", "eng+hin", "--psm", "6"]);
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let recognizer = TesseractRecognizer::new("/nonexistent/tesseract", "eng", 3);
        let image = DynamicImage::new_luma8(8, 8);
        assert!(matches!(
            recognizer.recognize(&image),
            Err(OcrError::Launch(_))
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        let image = DynamicImage::new_luma8(0, 0);
        assert!(matches!(
            TesseractRecognizer::default().recognize(&image),
            Err(OcrError::InvalidImage(_))
        ));
    }
}
