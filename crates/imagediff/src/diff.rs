use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::pixel::PixelComparer;
use crate::raster::{Bounds, Raster};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("images not same size: {left_w}x{left_h} vs {right_w}x{right_h}")]
    DimensionMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    #[error("the {0} algorithm has no threshold")]
    ThresholdUnsupported(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Number of pixels judged different.
    pub diff_pixels: u64,
    pub total_pixels: u64,
    /// 0.0 = identical, 1.0 = every pixel different.
    pub score: f64,
    /// Bounds of the first input; `diff_image` pixel `(0, 0)` maps to
    /// `(bounds.min_x, bounds.min_y)`.
    pub bounds: Bounds,
    pub diff_image: RgbaImage,
}

impl DiffResult {
    pub fn is_match(&self) -> bool {
        self.diff_pixels == 0
    }
}

/// Run `comparer` over every pixel of two equally sized images.
///
/// Images are walked row by row from each one's own origin, so their bounds
/// may be offset from each other. Fails before touching any pixel if the
/// sizes differ.
pub fn diff<C>(a: &dyn Raster, b: &dyn Raster, comparer: &C) -> Result<DiffResult, DiffError>
where
    C: PixelComparer + ?Sized,
{
    let bounds = a.bounds();
    let other = b.bounds();
    if !bounds.same_size(&other) {
        return Err(DiffError::DimensionMismatch {
            left_w: bounds.width(),
            left_h: bounds.height(),
            right_w: other.width(),
            right_h: other.height(),
        });
    }

    let (w, h) = (bounds.width(), bounds.height());
    let total_pixels = (w as u64) * (h as u64);
    let mut diff_pixels: u64 = 0;
    let mut diff_image = RgbaImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let outcome = comparer.compare(x, y, a, b);
            if !outcome.same {
                diff_pixels += 1;
            }
            diff_image.put_pixel(x, y, outcome.color);
        }
    }

    let score = if total_pixels > 0 {
        diff_pixels as f64 / total_pixels as f64
    } else {
        0.0
    };
    debug!(width = w, height = h, diff_pixels, "compared images");

    Ok(DiffResult {
        diff_pixels,
        total_pixels,
        score,
        bounds,
        diff_image,
    })
}
