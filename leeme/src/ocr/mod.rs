//! OCR (Optical Character Recognition) Module
//!
//! Turns uploaded image bytes into text in three stages:
//!
//! - `preprocessing`: decode, upscale, grayscale, blur; in the enhanced
//!   variant also CLAHE (`enhance`), Otsu binarization and deskew (`deskew`)
//! - `provider`/`engine`: recognition through a shared `TextRecognizer`,
//!   Tesseract via leptess by default
//! - `postprocessing`: regex cleanup of the recognized text (enhanced only)
//!
//! `OcrPipeline` strings the stages together for the HTTP layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! let provider = OcrProvider::new(&config.ocr);
//! let pipeline = OcrPipeline::new(&config.ocr, &config.preprocess, provider);
//! let text = pipeline.extract_text(image_bytes).await?;
//! ```

mod deskew;
mod engine;
mod enhance;
mod pipeline;
mod postprocessing;
mod preprocessing;
mod provider;

pub use deskew::{deskew, estimate_skew, rotate_replicate};
pub use engine::{RecognizedLine, TesseractRecognizer, TextRecognizer};
pub use enhance::{apply_clahe, binarize_otsu};
pub use pipeline::OcrPipeline;
pub use postprocessing::clean_text;
pub use preprocessing::preprocess_image;
pub use provider::OcrProvider;
