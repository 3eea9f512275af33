pub mod dictionary;
pub mod matcher;

use crate::error::{RecognizeError, ValidatorError};
use async_trait::async_trait;
use image::DynamicImage;
use std::io::Cursor;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub use dictionary::{Dictionary, WordList};
pub use matcher::{AltTextMatch, match_alt_text};

/// Extracts text rendered inside an image
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError>;
}

/// Grayscale PNG bytes for the OCR engine.
///
/// Any decoded color type is accepted, float and 16-bit images included.
pub fn encode_for_ocr(image: &DynamicImage) -> Result<Vec<u8>, RecognizeError> {
    let gray = DynamicImage::ImageLuma8(image.to_luma8());
    let mut png = Cursor::new(Vec::new());
    gray
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| RecognizeError::Image(e.to_string()))?;
    Ok(png.into_inner())
}

/// Recognizer that runs the `tesseract` command line tool.
///
/// The decoded pixels are re-encoded as PNG and piped through
/// `tesseract stdin stdout -l <language>`. The child is killed if the
/// recognition future is dropped.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: String,
    language: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError> {
        let png = encode_for_ocr(image)?;

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ValidatorError::Ocr(format!("failed to start {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&png).await {
                let message = format!("failed to feed {}: {}", self.binary, e);
                return Err(ValidatorError::Ocr(message).into());
            }
        }

        let output = child.wait_with_output().await.map_err(ValidatorError::from)?;
        if !output.status.success() {
            return Err(ValidatorError::Ocr(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
