use std::env;
use std::fmt;
use std::str::FromStr;

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Which cleanup pipeline runs in front of (and behind) the OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineVariant {
    /// Resize, grayscale and blur only; raw engine output.
    Basic,
    /// Adds CLAHE, Otsu binarization, deskew and the text cleanup pass.
    Enhanced,
}

impl PipelineVariant {
    pub fn default_scale_percent(self) -> u32 {
        match self {
            PipelineVariant::Basic => 150,
            PipelineVariant::Enhanced => 160,
        }
    }

    /// Tesseract page segmentation mode: 3 is fully automatic, 1 adds
    /// orientation and script detection.
    pub fn default_page_seg_mode(self) -> u32 {
        match self {
            PipelineVariant::Basic => 3,
            PipelineVariant::Enhanced => 1,
        }
    }

    pub fn postprocess(self) -> bool {
        matches!(self, PipelineVariant::Enhanced)
    }
}

impl FromStr for PipelineVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(PipelineVariant::Basic),
            "enhanced" => Ok(PipelineVariant::Enhanced),
            other => Err(format!(
                "unknown pipeline '{other}', expected 'basic' or 'enhanced'"
            )),
        }
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineVariant::Basic => write!(f, "basic"),
            PipelineVariant::Enhanced => write!(f, "enhanced"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub pipeline: PipelineVariant,
    pub languages: String,
    pub tessdata_path: Option<String>,
    pub page_seg_mode: u32,
}

/// Knobs of the image cleanup pipeline.
#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Uploads wider or taller than this are rejected before decoding.
    pub max_image_dimension: u32,
    pub scale_percent: u32,
    /// Gaussian sigma; 0.8 is what a 3x3 kernel implies.
    pub blur_sigma: f32,
    pub enhance: bool,
    pub clahe_clip_limit: f32,
    pub clahe_grid: u32,
    /// Skew angles at or below this magnitude (degrees) are left alone.
    pub deskew_min_angle: f32,
}

impl PreprocessConfig {
    pub fn for_variant(variant: PipelineVariant) -> Self {
        Self {
            max_image_dimension: 4096,
            scale_percent: variant.default_scale_percent(),
            blur_sigma: 0.8,
            enhance: matches!(variant, PipelineVariant::Enhanced),
            clahe_clip_limit: 2.0,
            clahe_grid: 8,
            deskew_min_angle: 0.5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let pipeline = parse_env_or("OCR_PIPELINE", PipelineVariant::Enhanced);
        Self::for_pipeline(pipeline)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Builds the configuration for `pipeline`, taking every other value
    /// from the environment.
    pub fn for_pipeline(pipeline: PipelineVariant) -> Self {
        let base = PreprocessConfig::for_variant(pipeline);
        Self {
            server: ServerConfig {
                host: env::var("LEEME_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("LEEME_PORT", 8000),
                max_upload_bytes: parse_env_or("LEEME_MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            },
            ocr: OcrConfig {
                pipeline,
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "spa".to_string()),
                tessdata_path: env::var("OCR_TESSDATA_PATH").ok(),
                page_seg_mode: parse_env_or(
                    "OCR_PAGE_SEG_MODE",
                    pipeline.default_page_seg_mode(),
                ),
            },
            preprocess: PreprocessConfig {
                max_image_dimension: parse_env_or(
                    "OCR_MAX_IMAGE_DIMENSION",
                    base.max_image_dimension,
                ),
                scale_percent: parse_env_or("OCR_SCALE_PERCENT", base.scale_percent),
                clahe_clip_limit: parse_env_or("OCR_CLAHE_CLIP_LIMIT", base.clahe_clip_limit),
                clahe_grid: parse_env_or("OCR_CLAHE_GRID", base.clahe_grid),
                deskew_min_angle: parse_env_or("OCR_DESKEW_MIN_ANGLE", base.deskew_min_angle),
                ..base
            },
        }
    }
}
