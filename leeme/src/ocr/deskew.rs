//! Skew estimation and correction for binarized pages.
//!
//! The skew angle is read off the minimum-area rectangle enclosing all dark
//! pixels. Only the leftmost and rightmost dark pixel of each row can lie on
//! the convex hull, so those are the only candidates handed to
//! `imageproc::geometry::min_area_rect`.

use image::{GrayImage, Luma};
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;

/// Pixels below this value count as ink.
const DARK_THRESHOLD: u8 = 128;

/// Estimate the skew of the dark content in degrees, in `(-45, 45]`
///
/// Angles follow image coordinates (y grows downwards), so a positive value
/// means text lines descend to the right. Returns `0.0` when there is no ink.
pub fn estimate_skew(image: &GrayImage) -> f32 {
    let candidates = row_extremes(image);
    if candidates.is_empty() {
        return 0.0;
    }

    let rect = min_area_rect(candidates.as_slice());
    normalize_angle(long_side_angle(&rect)) as f32
}

/// Rotate `image` to undo its estimated skew
///
/// Returns the (possibly untouched) image together with the estimated
/// angle. Nothing is rotated when the magnitude of the angle does not
/// exceed `min_angle` degrees.
pub fn deskew(image: &GrayImage, min_angle: f32) -> (GrayImage, f32) {
    let angle = estimate_skew(image);
    if angle.abs() <= min_angle {
        return (image.clone(), angle);
    }

    tracing::debug!(angle, "correcting skew");
    (rotate_replicate(image, angle), angle)
}

/// Rotate about the image center, keeping the original size
///
/// Every output pixel samples the source position `angle_deg` degrees
/// around the center with bilinear interpolation. Source positions outside
/// the image are clamped to the nearest edge pixel, so no blank corners are
/// introduced.
pub fn rotate_replicate(image: &GrayImage, angle_deg: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let theta = (angle_deg as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        let sx = cx + dx * cos - dy * sin;
        let sy = cy + dx * sin + dy * cos;
        Luma([sample_bilinear(image, sx, sy)])
    })
}

fn sample_bilinear(image: &GrayImage, x: f64, y: f64) -> u8 {
    let max_x = (image.width() - 1) as f64;
    let max_y = (image.height() - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor();
    let y0 = y.floor();
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);
    let fx = x - x0;
    let fy = y - y0;

    let at = |px: f64, py: f64| image.get_pixel(px as u32, py as u32)[0] as f64;

    let top = at(x0, y0) * (1.0 - fx) + at(x1, y0) * fx;
    let bottom = at(x0, y1) * (1.0 - fx) + at(x1, y1) * fx;
    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}

fn row_extremes(image: &GrayImage) -> Vec<Point<i32>> {
    let mut points = Vec::new();
    for (y, row) in image.rows().enumerate() {
        let mut first = None;
        let mut last = None;
        for (x, pixel) in row.enumerate() {
            if pixel[0] < DARK_THRESHOLD {
                if first.is_none() {
                    first = Some(x);
                }
                last = Some(x);
            }
        }
        if let (Some(first), Some(last)) = (first, last) {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }
    points
}

/// Orientation of the longer side of `rect`, in degrees.
fn long_side_angle(rect: &[Point<i32>; 4]) -> f64 {
    let edge = |a: Point<i32>, b: Point<i32>| (f64::from(b.x - a.x), f64::from(b.y - a.y));
    let (ax, ay) = edge(rect[0], rect[1]);
    let (bx, by) = edge(rect[1], rect[2]);
    let (dx, dy) = if ax.hypot(ay) >= bx.hypot(by) {
        (ax, ay)
    } else {
        (bx, by)
    };
    dy.atan2(dx).to_degrees()
}

/// A rectangle's orientation is only defined modulo 90 degrees.
fn normalize_angle(degrees: f64) -> f64 {
    let mut angle = degrees % 90.0;
    if angle > 45.0 {
        angle -= 90.0;
    } else if angle <= -45.0 {
        angle += 90.0;
    }
    angle
}
