use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};

use crate::error::Result;

use super::extractors::read_image_field;
use super::response::OcrResponse;
use super::state::AppState;

/// `POST /ocr`
///
/// Reads the `image` field and runs it through the configured pipeline.
/// Upload problems and undecodable images answer 400, engine failures 500.
pub async fn ocr_upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<OcrResponse> {
    let mut multipart = multipart?;
    let bytes = read_image_field(&mut multipart).await?;

    let text = state.pipeline.extract_text(bytes).await?;
    tracing::info!(
        chars = text.chars().count(),
        variant = %state.pipeline.variant(),
        "text extracted"
    );

    Ok(OcrResponse::success(text))
}
