use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::OcrResponse;

#[derive(Error, Debug)]
pub enum LeemeError {
    #[error("Solicitud no válida: {0}")]
    InvalidRequest(String),

    #[error("Archivo demasiado grande: {0}")]
    PayloadTooLarge(String),

    #[error("Imagen no válida: {0}")]
    InvalidImage(String),

    #[error("Error al extraer texto: {0}")]
    OcrFailure(String),

    #[error("OCR no disponible: {0}")]
    OcrUnavailable(String),

    #[error("Error interno del servidor: {0}")]
    Internal(String),
}

impl LeemeError {
    pub fn status(&self) -> StatusCode {
        match self {
            LeemeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LeemeError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            LeemeError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            LeemeError::OcrFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LeemeError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LeemeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LeemeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }

        let body = Json(OcrResponse::failure(self.to_string()));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LeemeError>;
