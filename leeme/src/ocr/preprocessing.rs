use crate::config::PreprocessConfig;
use crate::error::{LeemeError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, ImageReader};
use imageproc::filter::gaussian_blur_f32;

use super::deskew::deskew;
use super::enhance::{apply_clahe, binarize_otsu};

/// Preprocess uploaded image bytes for OCR
///
/// Applies the following transformations:
/// 1. Decodes the bytes (format is sniffed, not trusted from the upload),
///    rejecting images larger than `max_image_dimension` on either side
/// 2. Upscales by `scale_percent` with cubic interpolation
/// 3. Converts to grayscale
/// 4. Suppresses noise with a small Gaussian blur
///
/// When `config.enhance` is set it additionally runs CLAHE, Otsu
/// binarization and deskew.
///
/// Scaling is applied unconditionally, so feeding the output back in
/// enlarges it again.
pub fn preprocess_image(bytes: &[u8], config: &PreprocessConfig) -> Result<GrayImage> {
    let img = decode_image(bytes, config.max_image_dimension)?;
    let (width, height) = img.dimensions();
    tracing::debug!(width, height, "decoded upload");

    let img = scale_image(&img, config.scale_percent);
    let gray = to_grayscale(img);
    let gray = gaussian_blur_f32(&gray, config.blur_sigma);

    if !config.enhance {
        return Ok(gray);
    }

    let gray = apply_clahe(&gray, config.clahe_clip_limit, config.clahe_grid);
    let binary = binarize_otsu(&gray);
    let (deskewed, angle) = deskew(&binary, config.deskew_min_angle);
    tracing::debug!(angle, "estimated skew");

    Ok(deskewed)
}

fn decode_image(bytes: &[u8], max_dimension: u32) -> Result<DynamicImage> {
    // Header only; the pixel buffer is not allocated until the size is known.
    let (width, height) = open_reader(bytes)?
        .into_dimensions()
        .map_err(|e| LeemeError::InvalidImage(format!("Failed to read image: {e}")))?;
    check_dimensions(width, height, max_dimension)?;

    let img = open_reader(bytes)?
        .decode()
        .map_err(|e| LeemeError::InvalidImage(format!("Failed to decode image: {e}")))?;

    let (width, height) = img.dimensions();
    check_dimensions(width, height, max_dimension)?;

    Ok(img)
}

fn open_reader(bytes: &[u8]) -> Result<ImageReader<std::io::Cursor<&[u8]>>> {
    ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LeemeError::InvalidImage(format!("Failed to read image: {e}")))
}

fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LeemeError::InvalidImage("Image has no pixels".to_string()));
    }
    if width > max_dimension || height > max_dimension {
        return Err(LeemeError::InvalidImage(format!(
            "Image too large: {width}x{height}, maximum {max_dimension}x{max_dimension}"
        )));
    }
    Ok(())
}

/// Resize by a percentage using Catmull-Rom (cubic) filtering
///
/// Target dimensions are truncated, never below one pixel.
fn scale_image(img: &DynamicImage, scale_percent: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let new_width = scaled_dimension(width, scale_percent);
    let new_height = scaled_dimension(height, scale_percent);

    if new_width == width && new_height == height {
        return img.clone();
    }

    img.resize_exact(new_width, new_height, FilterType::CatmullRom)
}

fn scaled_dimension(dim: u32, scale_percent: u32) -> u32 {
    let scaled = u64::from(dim) * u64::from(scale_percent) / 100;
    scaled.clamp(1, u64::from(u32::MAX)) as u32
}

/// Convert to 8-bit luma, dropping alpha
///
/// Luma input is returned as-is.
fn to_grayscale(img: DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineVariant;
    use image::{ImageFormat, Luma, Rgb, RgbImage};

    fn basic_config() -> PreprocessConfig {
        PreprocessConfig::for_variant(PipelineVariant::Basic)
    }

    fn enhanced_config() -> PreprocessConfig {
        PreprocessConfig::for_variant(PipelineVariant::Enhanced)
    }

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut output = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut output), format)
            .unwrap();
        output
    }

    /// White page with a few dark horizontal strokes standing in for text.
    fn text_like_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let in_line = (y % 20) >= 8 && (y % 20) < 12;
            let in_margin = x < 10 || x >= width - 10;
            if in_line && !in_margin {
                Rgb([20, 20, 20])
            } else {
                Rgb([240, 240, 240])
            }
        })
    }

    #[test]
    fn test_preprocess_valid_png() {
        let bytes = encode(
            &DynamicImage::ImageRgb8(text_like_image(100, 80)),
            ImageFormat::Png,
        );

        let result = preprocess_image(&bytes, &basic_config());
        assert!(
            result.is_ok(),
            "Preprocessing should succeed for valid image: {:?}",
            result.err()
        );

        let processed = result.unwrap();
        assert_eq!(processed.dimensions(), (150, 120));
    }

    #[test]
    fn test_preprocess_jpeg_input() {
        let bytes = encode(&DynamicImage::new_rgb8(64, 64), ImageFormat::Jpeg);
        let processed = preprocess_image(&bytes, &basic_config()).unwrap();
        assert_eq!(processed.dimensions(), (96, 96));
    }

    #[test]
    fn test_preprocess_rgba_input() {
        let bytes = encode(&DynamicImage::new_rgba8(40, 20), ImageFormat::Png);
        let processed = preprocess_image(&bytes, &basic_config()).unwrap();
        assert_eq!(processed.dimensions(), (60, 30));
    }

    #[test]
    fn test_invalid_image_data() {
        let invalid_data = b"definitely not an image".to_vec();
        let result = preprocess_image(&invalid_data, &basic_config());

        match result {
            Err(LeemeError::InvalidImage(_)) => (),
            other => panic!("Expected InvalidImage, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_upload_is_invalid() {
        let result = preprocess_image(&[], &basic_config());
        assert!(matches!(result, Err(LeemeError::InvalidImage(_))));
    }

    #[test]
    fn test_truncated_png_is_invalid() {
        let bytes = encode(&DynamicImage::new_rgb8(50, 50), ImageFormat::Png);
        let truncated = &bytes[..bytes.len() / 2];
        let result = preprocess_image(truncated, &basic_config());
        assert!(matches!(result, Err(LeemeError::InvalidImage(_))));
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        // Long thin strips compress to almost nothing but would still be
        // upscaled past the limit.
        let bytes = encode(&DynamicImage::new_luma8(5000, 1), ImageFormat::Png);
        match preprocess_image(&bytes, &enhanced_config()) {
            Err(LeemeError::InvalidImage(msg)) => assert!(msg.contains("too large"), "{msg}"),
            other => panic!("Expected InvalidImage, got {other:?}"),
        }
    }

    #[test]
    fn test_dimension_limit_is_configurable() {
        let bytes = encode(&DynamicImage::new_rgb8(60, 20), ImageFormat::Png);
        let mut config = basic_config();

        config.max_image_dimension = 60;
        assert!(preprocess_image(&bytes, &config).is_ok());

        config.max_image_dimension = 59;
        assert!(matches!(
            preprocess_image(&bytes, &config),
            Err(LeemeError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_enhanced_output_is_binary() {
        let bytes = encode(
            &DynamicImage::ImageRgb8(text_like_image(120, 100)),
            ImageFormat::Png,
        );
        let processed = preprocess_image(&bytes, &enhanced_config()).unwrap();

        assert_eq!(processed.dimensions(), (192, 160));
        assert!(
            processed.pixels().all(|p| p[0] == 0 || p[0] == 255),
            "Enhanced pipeline should produce a black/white image"
        );
        assert!(processed.pixels().any(|p| p[0] == 0));
        assert!(processed.pixels().any(|p| p[0] == 255));
    }

    #[test]
    fn test_scaled_dimension_truncates() {
        assert_eq!(scaled_dimension(100, 150), 150);
        assert_eq!(scaled_dimension(33, 150), 49);
        assert_eq!(scaled_dimension(1, 50), 1);
        assert_eq!(scaled_dimension(7, 160), 11);
    }

    #[test]
    fn test_scaling_twice_compounds() {
        let img = DynamicImage::new_luma8(100, 40);
        let once = scale_image(&img, 150);
        let twice = scale_image(&once, 150);

        assert_eq!(once.dimensions(), (150, 60));
        assert_eq!(twice.dimensions(), (225, 90));
    }

    #[test]
    fn test_scale_at_100_percent_keeps_dimensions() {
        let img = DynamicImage::new_rgb8(31, 17);
        assert_eq!(scale_image(&img, 100).dimensions(), (31, 17));
    }

    #[test]
    fn test_grayscale_is_identity_on_gray_input() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([(x * 16 + y) as u8]));
        let converted = to_grayscale(DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }

    #[test]
    fn test_grayscale_drops_alpha() {
        let luma_a = DynamicImage::new_luma_a8(10, 10);
        let converted = to_grayscale(luma_a);
        assert_eq!(converted.dimensions(), (10, 10));
    }

    #[test]
    fn test_blur_keeps_flat_image_flat() {
        let flat = GrayImage::from_pixel(20, 20, Luma([128]));
        let blurred = gaussian_blur_f32(&flat, 0.8);
        assert!(blurred.pixels().all(|p| p[0].abs_diff(128) <= 1));
    }
}
