use image::{GrayImage, ImageFormat};
use leptess::{LepTess, Variable};
use tokio::sync::Mutex;

use crate::config::OcrConfig;
use crate::error::{LeemeError, Result};

/// One line of recognized text.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedLine {
    pub text: String,
    /// Engine confidence in `0..=100`.
    pub confidence: f32,
}

/// A text recognition engine shared by all requests.
///
/// Calls are blocking; callers are expected to run them off the async
/// executor.
pub trait TextRecognizer: Send + Sync {
    fn name(&self) -> &str;

    fn recognize(&self, image: &GrayImage) -> Result<Vec<RecognizedLine>>;
}

/// Tesseract through leptess
///
/// A single `LepTess` handle is created at startup. It needs exclusive
/// access while an image is set and read back, so calls are serialised.
pub struct TesseractRecognizer {
    tesseract: Mutex<LepTess>,
}

impl TesseractRecognizer {
    /// Initialise Tesseract for `config.languages` with the configured page
    /// segmentation mode. Engine mode is left at Tesseract's default (3).
    pub fn new(config: &OcrConfig) -> std::result::Result<Self, String> {
        let mut lt = LepTess::new(config.tessdata_path.as_deref(), &config.languages)
            .map_err(|e| e.to_string())?;

        lt.set_variable(
            Variable::TesseditPagesegMode,
            &config.page_seg_mode.to_string(),
        )
        .map_err(|e| format!("Failed to set page segmentation mode: {e:?}"))?;

        Ok(Self {
            tesseract: Mutex::new(lt),
        })
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<RecognizedLine>> {
        let png = encode_png(image)?;

        let mut lt = self.tesseract.blocking_lock();
        lt.set_image_from_mem(&png)
            .map_err(|e| LeemeError::OcrFailure(format!("Failed to set image: {e}")))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| LeemeError::OcrFailure(format!("Failed to read text: {e}")))?;
        let confidence = lt.mean_text_conf() as f32;

        Ok(split_lines(&text, confidence))
    }
}

fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| LeemeError::Internal(format!("Failed to encode image: {e}")))?;
    Ok(png)
}

/// Page text arrives as one string; keep its non-blank lines in order.
fn split_lines(text: &str, confidence: f32) -> Vec<RecognizedLine> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| RecognizedLine {
            text: line.to_string(),
            confidence,
        })
        .collect()
}
