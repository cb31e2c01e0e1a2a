#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};

use leeme::api::{AppState, OcrResponse};
use leeme::config::{Config, PipelineVariant};
use leeme::error::{LeemeError, Result};
use leeme::ocr::{OcrProvider, RecognizedLine, TextRecognizer};

pub const BOUNDARY: &str = "leeme-test-boundary";

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_fixture(name: &str) -> Vec<u8> {
    let path = fixture_path(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("Failed to load fixture '{name}': {e}"))
}

/// Recognizer that always "reads" the same lines.
pub struct ScriptedRecognizer {
    lines: Vec<String>,
}

impl ScriptedRecognizer {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<RecognizedLine>> {
        Ok(self
            .lines
            .iter()
            .map(|text| RecognizedLine {
                text: text.clone(),
                confidence: 95.0,
            })
            .collect())
    }
}

/// Recognizer that fails like a crashed engine.
pub struct BrokenRecognizer;

impl TextRecognizer for BrokenRecognizer {
    fn name(&self) -> &str {
        "broken"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Vec<RecognizedLine>> {
        Err(LeemeError::OcrFailure("engine crashed".to_string()))
    }
}

pub fn state_with(pipeline: PipelineVariant, recognizer: Arc<dyn TextRecognizer>) -> AppState {
    let config = Config::for_pipeline(pipeline);
    AppState::new(config, OcrProvider::with_recognizer(recognizer))
}

pub fn state_with_limit(recognizer: Arc<dyn TextRecognizer>, max_upload_bytes: usize) -> AppState {
    let mut config = Config::for_pipeline(PipelineVariant::Basic);
    config.server.max_upload_bytes = max_upload_bytes;
    AppState::new(config, OcrProvider::with_recognizer(recognizer))
}

/// Small page with dark horizontal strokes, PNG encoded.
pub fn sample_png() -> Vec<u8> {
    let page = RgbImage::from_fn(120, 80, |x, y| {
        if (y % 16) < 3 && (10..110).contains(&x) {
            Rgb([15, 15, 15])
        } else {
            Rgb([245, 245, 245])
        }
    });
    encode(&DynamicImage::ImageRgb8(page), ImageFormat::Png)
}

pub fn gray_jpeg() -> Vec<u8> {
    let gray = GrayImage::from_fn(64, 48, |x, _| Luma([(x * 4) as u8]));
    encode(&DynamicImage::ImageLuma8(gray), ImageFormat::Jpeg)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), format)
        .expect("Failed to encode test image");
    output
}

/// A multipart/form-data body with a single file field.
pub fn multipart_body(field: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"upload.png\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ocr")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, data)))
        .expect("Failed to build request")
}

pub async fn read_response(response: axum::response::Response) -> OcrResponse {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Response should be OcrResponse JSON")
}
