use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::{LeemeError, Result};

/// Name of the multipart field carrying the picture.
pub const IMAGE_FIELD: &str = "image";

impl From<MultipartRejection> for LeemeError {
    fn from(rejection: MultipartRejection) -> Self {
        LeemeError::InvalidRequest(format!("Expected a multipart/form-data upload: {rejection}"))
    }
}

impl From<MultipartError> for LeemeError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            LeemeError::PayloadTooLarge(err.body_text())
        } else {
            LeemeError::InvalidRequest(format!("Failed to read upload: {}", err.body_text()))
        }
    }
}

/// Pull the bytes of the `image` field out of a multipart body
///
/// Other fields are skipped. The first `image` field wins.
pub async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        tracing::debug!(
            file_name = file_name.as_deref().unwrap_or("-"),
            bytes = bytes.len(),
            "received upload"
        );
        return Ok(bytes.to_vec());
    }

    Err(LeemeError::InvalidRequest(format!(
        "Falta el campo obligatorio '{IMAGE_FIELD}'"
    )))
}
