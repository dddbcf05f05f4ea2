//! YIQ colour math shared by every comparison policy.
//!
//! Perceptual distance follows Kotsarenko & Ramos, "Measuring perceived color
//! difference using YIQ NTSC transmission color space in mobile applications".

use image::Rgba;

/// Maximum possible value of [`perceptual_color_difference`].
pub const MAX_YIQ_POSSIBLE_DELTA: f32 = 35215.0;

/// Squared-distance ceiling for a threshold in `0.0..=1.0`.
pub fn max_difference(threshold: f32) -> f32 {
    MAX_YIQ_POSSIBLE_DELTA * threshold * threshold
}

/// Composite a channel over opaque white. `alpha` is in `0.0..=1.0`.
pub fn blend(channel: f32, alpha: f32) -> f32 {
    255.0 + (channel - 255.0) * alpha
}

pub fn rgb_to_y(r: f32, g: f32, b: f32) -> f32 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

pub fn rgb_to_i(r: f32, g: f32, b: f32) -> f32 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

pub fn rgb_to_q(r: f32, g: f32, b: f32) -> f32 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// RGB of `p` blended against white using its own alpha.
fn blended(p: Rgba<u8>) -> (f32, f32, f32) {
    let Rgba([r, g, b, a]) = p;
    let a = a as f32 / 255.0;
    (blend(r as f32, a), blend(g as f32, a), blend(b as f32, a))
}

/// Weighted squared YIQ distance between two pixels. Never square-rooted:
/// callers compare it against [`max_difference`].
pub fn perceptual_color_difference(p1: Rgba<u8>, p2: Rgba<u8>) -> f32 {
    let (r1, g1, b1) = blended(p1);
    let (r2, g2, b2) = blended(p2);

    let y = rgb_to_y(r1, g1, b1) - rgb_to_y(r2, g2, b2);
    let i = rgb_to_i(r1, g1, b1) - rgb_to_i(r2, g2, b2);
    let q = rgb_to_q(r1, g1, b1) - rgb_to_q(r2, g2, b2);

    0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q
}

/// Luma of a single pixel after blending with white.
pub fn gray_pixel(p: Rgba<u8>) -> f32 {
    let (r, g, b) = blended(p);
    rgb_to_y(r, g, b)
}
