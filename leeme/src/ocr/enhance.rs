//! Local contrast equalization and binarization.

use image::{GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization
///
/// The image is split into a `grid` x `grid` tile layout (fewer tiles when
/// the image is smaller than the grid). Each tile gets its own equalization
/// table, with histogram bins clipped at `clip_limit` times the mean bin
/// height and the excess spread evenly over all bins. Pixels are mapped by
/// bilinear interpolation between the tables of the four nearest tile
/// centers, which hides tile seams.
///
/// A `clip_limit` of zero or less disables clipping.
pub fn apply_clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tile_w = width.div_ceil(grid.clamp(1, width));
    let tile_h = height.div_ceil(grid.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            luts.push(tile_lut(image, x0, y0, x1, y1, clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    GrayImage::from_fn(width, height, |x, y| {
        let value = image.get_pixel(x, y)[0] as usize;

        let (tx0, tx1, wx) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, wy) = neighbours(y, tile_h, tiles_y);

        let top = lerp(lut_at(tx0, ty0)[value], lut_at(tx1, ty0)[value], wx);
        let bottom = lerp(lut_at(tx0, ty1)[value], lut_at(tx1, ty1)[value], wx);
        let mapped = top * (1.0 - wy) + bottom * wy;

        Luma([mapped.round().clamp(0.0, 255.0) as u8])
    })
}

/// Binarize with a global threshold chosen by Otsu's method
///
/// Pixels brighter than the threshold become 255, the rest 0.
pub fn binarize_otsu(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    tracing::trace!(level, "otsu threshold");
    threshold(image, level, ThresholdType::Binary)
}

fn tile_lut(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y)[0] as usize] += 1;
        }
    }

    let area = (x1 - x0) * (y1 - y0);

    if clip_limit > 0.0 {
        let clip = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > clip {
                excess += *bin - clip;
                *bin = clip;
            }
        }

        let per_bin = excess / BINS as u32;
        let remainder = (excess % BINS as u32) as usize;
        for bin in hist.iter_mut() {
            *bin += per_bin;
        }
        if remainder > 0 {
            let step = (BINS / remainder).max(1);
            for i in 0..remainder {
                hist[(i * step) % BINS] += 1;
            }
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (i, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[i] = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Indices of the two tiles whose centers bracket `pos`, plus the weight of
/// the second one.
fn neighbours(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
    let base = f.floor();
    let weight = f - base;
    let last = tiles as f32 - 1.0;

    let first = base.clamp(0.0, last) as u32;
    let second = (base + 1.0).clamp(0.0, last) as u32;
    (first, second, weight)
}

fn lerp(a: u8, b: u8, t: f32) -> f32 {
    a as f32 * (1.0 - t) + b as f32 * t
}
