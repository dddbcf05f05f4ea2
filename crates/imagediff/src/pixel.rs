use image::Rgba;

use crate::color::{blend, gray_pixel, max_difference, perceptual_color_difference};
use crate::raster::Raster;

/// Highlight painted over pixels judged different, unless configured otherwise.
pub const DEFAULT_DIFF_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Sensitivity of the perceptual policy when none is configured.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Verdict for a single coordinate and the colour to paint there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOutcome {
    pub same: bool,
    pub color: Rgba<u8>,
}

impl PixelOutcome {
    pub fn same(color: Rgba<u8>) -> Self {
        Self { same: true, color }
    }

    pub fn different(color: Rgba<u8>) -> Self {
        Self { same: false, color }
    }
}

/// Configuration shared by every policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSettings {
    /// Pixels of exactly this colour (in either image) never count as different.
    pub ignore_color: Option<Rgba<u8>>,
    pub diff_color: Rgba<u8>,
}

impl Default for PixelSettings {
    fn default() -> Self {
        Self {
            ignore_color: None,
            diff_color: DEFAULT_DIFF_COLOR,
        }
    }
}

impl PixelSettings {
    pub fn is_ignored(&self, p1: Rgba<u8>, p2: Rgba<u8>) -> bool {
        self.ignore_color
            .is_some_and(|ignore| p1 == ignore || p2 == ignore)
    }
}

/// Dimmed grayscale rendering of `p` used as the backdrop for matching pixels.
pub fn background_pixel(p: Rgba<u8>) -> Rgba<u8> {
    let val = blend(gray_pixel(p), 0.1) as u8;
    Rgba([val, val, val, 255])
}

/// Decides whether the pixels at one coordinate of two images are the same.
pub trait PixelComparer {
    fn settings(&self) -> &PixelSettings;

    /// Policy decision for two normalized pixels, ignore colour aside.
    fn is_same(&self, p1: Rgba<u8>, p2: Rgba<u8>) -> bool;

    /// Ignore override first, then the policy.
    fn compare_pixels(&self, p1: Rgba<u8>, p2: Rgba<u8>) -> PixelOutcome {
        let settings = self.settings();
        if settings.is_ignored(p1, p2) || self.is_same(p1, p2) {
            PixelOutcome::same(background_pixel(p1))
        } else {
            PixelOutcome::different(settings.diff_color)
        }
    }

    /// Compare the pixels at offset `(x, y)` from each image's own origin.
    fn compare(&self, x: u32, y: u32, a: &dyn Raster, b: &dyn Raster) -> PixelOutcome {
        self.compare_pixels(a.pixel_at(x, y), b.pixel_at(x, y))
    }
}

/// Same only when all four channels are identical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExactPixelComparer {
    settings: PixelSettings,
}

impl ExactPixelComparer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ignore_color(&mut self, color: Rgba<u8>) {
        self.settings.ignore_color = Some(color);
    }

    pub fn clear_ignore_color(&mut self) {
        self.settings.ignore_color = None;
    }

    pub fn set_diff_color(&mut self, color: Rgba<u8>) {
        self.settings.diff_color = color;
    }
}

impl PixelComparer for ExactPixelComparer {
    fn settings(&self) -> &PixelSettings {
        &self.settings
    }

    fn is_same(&self, p1: Rgba<u8>, p2: Rgba<u8>) -> bool {
        p1 == p2
    }
}

/// Same when the weighted YIQ distance stays within the threshold's ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptualPixelComparer {
    settings: PixelSettings,
    threshold: f32,
    max_difference: f32,
}

impl Default for PerceptualPixelComparer {
    fn default() -> Self {
        Self {
            settings: PixelSettings::default(),
            threshold: DEFAULT_THRESHOLD,
            max_difference: max_difference(DEFAULT_THRESHOLD),
        }
    }
}

impl PerceptualPixelComparer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f32) -> Self {
        let mut comparer = Self::default();
        comparer.set_threshold(threshold);
        comparer
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold;
        self.max_difference = max_difference(threshold);
    }

    pub fn set_ignore_color(&mut self, color: Rgba<u8>) {
        self.settings.ignore_color = Some(color);
    }

    pub fn clear_ignore_color(&mut self) {
        self.settings.ignore_color = None;
    }

    pub fn set_diff_color(&mut self, color: Rgba<u8>) {
        self.settings.diff_color = color;
    }
}

impl PixelComparer for PerceptualPixelComparer {
    fn settings(&self) -> &PixelSettings {
        &self.settings
    }

    fn is_same(&self, p1: Rgba<u8>, p2: Rgba<u8>) -> bool {
        perceptual_color_difference(p1, p2) <= self.max_difference
    }
}
