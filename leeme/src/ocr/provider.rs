use std::sync::Arc;

use image::GrayImage;
use tracing::{info, warn};

use crate::config::OcrConfig;
use crate::error::{LeemeError, Result};

use super::engine::{RecognizedLine, TesseractRecognizer, TextRecognizer};

#[derive(Clone)]
enum OcrBackend {
    Local { engine: Arc<dyn TextRecognizer> },
    Unavailable { reason: String },
}

/// Process-wide handle to the recognition engine
///
/// Built once at startup and cloned into every request; clones share the
/// same engine.
#[derive(Clone)]
pub struct OcrProvider {
    backend: OcrBackend,
}

impl OcrProvider {
    /// Initialise Tesseract from `config`. A missing installation or
    /// language pack does not fail startup; requests get `OcrUnavailable`
    /// instead.
    pub fn new(config: &OcrConfig) -> Self {
        let backend = match TesseractRecognizer::new(config) {
            Ok(engine) => {
                info!(
                    languages = %config.languages,
                    page_seg_mode = config.page_seg_mode,
                    "Tesseract OCR initialized"
                );
                OcrBackend::Local {
                    engine: Arc::new(engine),
                }
            }
            Err(e) => {
                let reason = format!("Tesseract not available: {e}");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Self { backend }
    }

    /// Wrap an already constructed engine.
    pub fn with_recognizer(engine: Arc<dyn TextRecognizer>) -> Self {
        Self {
            backend: OcrBackend::Local { engine },
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: OcrBackend::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, OcrBackend::Unavailable { .. })
    }

    pub fn engine_name(&self) -> &str {
        match &self.backend {
            OcrBackend::Local { engine } => engine.name(),
            OcrBackend::Unavailable { .. } => "unavailable",
        }
    }

    /// Run recognition on the blocking pool.
    pub async fn recognize(&self, image: GrayImage) -> Result<Vec<RecognizedLine>> {
        match &self.backend {
            OcrBackend::Local { engine } => {
                let engine = Arc::clone(engine);

                tokio::task::spawn_blocking(move || engine.recognize(&image))
                    .await
                    .map_err(|e| LeemeError::OcrFailure(format!("OCR task panicked: {e}")))?
            }
            OcrBackend::Unavailable { reason } => Err(LeemeError::OcrUnavailable(reason.clone())),
        }
    }
}
