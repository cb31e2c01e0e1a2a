//! Wire format of `POST /ocr`.
//!
//! ```json
//! { "ok": true, "text": "Hola mundo" }
//! { "ok": false, "error": "Imagen no válida: Failed to decode image: ..." }
//! ```
//!
//! Failures are produced by [`LeemeError`](crate::error::LeemeError)'s
//! `IntoResponse` impl with the same shape.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OcrResponse {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            text: None,
            error: Some(message.into()),
        }
    }
}

/// Always `200 OK`; error statuses come from `LeemeError`.
impl IntoResponse for OcrResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
