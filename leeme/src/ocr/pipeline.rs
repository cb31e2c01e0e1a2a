use std::sync::Arc;

use crate::config::{OcrConfig, PipelineVariant, PreprocessConfig};
use crate::error::{LeemeError, Result};

use super::postprocessing::{clean_text, join_lines};
use super::preprocessing::preprocess_image;
use super::provider::OcrProvider;

/// Upload bytes in, text out
///
/// Stages run in a fixed order: preprocess, recognize, then (enhanced
/// variant only) clean up the text. Errors keep the kind of the stage that
/// raised them, so a bad upload surfaces as `InvalidImage` and an engine
/// fault as `OcrFailure`.
#[derive(Clone)]
pub struct OcrPipeline {
    variant: PipelineVariant,
    preprocess: Arc<PreprocessConfig>,
    provider: OcrProvider,
}

impl OcrPipeline {
    pub fn new(ocr: &OcrConfig, preprocess: &PreprocessConfig, provider: OcrProvider) -> Self {
        Self {
            variant: ocr.pipeline,
            preprocess: Arc::new(preprocess.clone()),
            provider,
        }
    }

    pub fn variant(&self) -> PipelineVariant {
        self.variant
    }

    pub async fn extract_text(&self, bytes: Vec<u8>) -> Result<String> {
        let config = Arc::clone(&self.preprocess);
        let image = tokio::task::spawn_blocking(move || preprocess_image(&bytes, &config))
            .await
            .map_err(|e| LeemeError::Internal(format!("Preprocessing task panicked: {e}")))??;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            variant = %self.variant,
            "image preprocessed"
        );

        let lines = self.provider.recognize(image).await?;
        tracing::debug!(lines = lines.len(), "text recognized");

        let text = join_lines(lines.iter().map(|line| line.text.as_str()));

        if self.variant.postprocess() {
            Ok(clean_text(&text))
        } else {
            Ok(text)
        }
    }
}
