pub mod codec;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::diff::{DiffError, DiffResult, diff};
use crate::pixel::{
    DEFAULT_DIFF_COLOR, DEFAULT_THRESHOLD, ExactPixelComparer, PerceptualPixelComparer,
    PixelComparer,
};
use crate::raster::Raster;

pub use self::codec::{compare_encoded, decode, encode_png, open};

/// Comparison policy selectable from the CLI, config file or environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Pixels must match channel for channel
    #[value(alias = "simple")]
    #[serde(alias = "simple")]
    Exact,
    /// Pixels must look alike (YIQ distance within threshold)
    #[default]
    #[value(alias = "smart")]
    #[serde(alias = "smart")]
    Perceptual,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Perceptual => "perceptual",
        }
    }
}

/// Fully resolved comparison settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffSettings {
    pub algorithm: Algorithm,
    /// Only consulted by [`Algorithm::Perceptual`].
    pub threshold: f32,
    pub ignore_color: Option<Rgba<u8>>,
    pub diff_color: Rgba<u8>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            threshold: DEFAULT_THRESHOLD,
            ignore_color: None,
            diff_color: DEFAULT_DIFF_COLOR,
        }
    }
}

/// Whole-image comparator, one variant per policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageComparer {
    Exact(ExactPixelComparer),
    Perceptual(PerceptualPixelComparer),
}

impl ImageComparer {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Exact => Self::Exact(ExactPixelComparer::new()),
            Algorithm::Perceptual => Self::Perceptual(PerceptualPixelComparer::new()),
        }
    }

    pub fn from_settings(settings: &DiffSettings) -> Self {
        let mut comparer = Self::new(settings.algorithm);
        if let Self::Perceptual(c) = &mut comparer {
            c.set_threshold(settings.threshold);
        }
        if let Some(color) = settings.ignore_color {
            comparer.set_ignore_color(color);
        }
        comparer.set_diff_color(settings.diff_color);
        comparer
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Exact(_) => Algorithm::Exact,
            Self::Perceptual(_) => Algorithm::Perceptual,
        }
    }

    /// Treat any pixel pair where either side has exactly this colour as same.
    pub fn set_ignore_color(&mut self, color: Rgba<u8>) {
        match self {
            Self::Exact(c) => c.set_ignore_color(color),
            Self::Perceptual(c) => c.set_ignore_color(color),
        }
    }

    pub fn clear_ignore_color(&mut self) {
        match self {
            Self::Exact(c) => c.clear_ignore_color(),
            Self::Perceptual(c) => c.clear_ignore_color(),
        }
    }

    pub fn set_diff_color(&mut self, color: Rgba<u8>) {
        match self {
            Self::Exact(c) => c.set_diff_color(color),
            Self::Perceptual(c) => c.set_diff_color(color),
        }
    }

    pub fn set_threshold(&mut self, threshold: f32) -> Result<(), DiffError> {
        match self {
            Self::Exact(_) => Err(DiffError::ThresholdUnsupported(Algorithm::Exact.name())),
            Self::Perceptual(c) => {
                c.set_threshold(threshold);
                Ok(())
            }
        }
    }

    pub fn pixel_comparer(&self) -> &dyn PixelComparer {
        match self {
            Self::Exact(c) => c,
            Self::Perceptual(c) => c,
        }
    }

    pub fn compare_images(&self, a: &dyn Raster, b: &dyn Raster) -> Result<DiffResult, DiffError> {
        match self {
            Self::Exact(c) => diff(a, b, c),
            Self::Perceptual(c) => diff(a, b, c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Placed;
    use image::RgbaImage;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn one_pixel(p: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, p)
    }

    fn count(comparer: &ImageComparer, p1: Rgba<u8>, p2: Rgba<u8>) -> u64 {
        comparer
            .compare_images(&one_pixel(p1), &one_pixel(p2))
            .unwrap()
            .diff_pixels
    }

    #[test]
    fn exact_scenarios() {
        let c = ImageComparer::new(Algorithm::Exact);
        assert_eq!(count(&c, Rgba([255, 0, 0, 255]), Rgba([244, 1, 0, 255])), 1);
        assert_eq!(count(&c, Rgba([255, 0, 0, 255]), Rgba([255, 0, 0, 255])), 0);
    }

    #[test]
    fn perceptual_scenarios() {
        let c = ImageComparer::new(Algorithm::Perceptual);
        assert_eq!(count(&c, Rgba([255, 0, 0, 255]), Rgba([255, 1, 1, 255])), 0);
        assert_eq!(count(&c, Rgba([255, 0, 0, 255]), Rgba([128, 128, 128, 255])), 1);
        assert_eq!(count(&c, BLACK, BLACK), 0);
    }

    #[test]
    fn size_mismatch_for_both_policies() {
        for algorithm in [Algorithm::Exact, Algorithm::Perceptual] {
            let c = ImageComparer::new(algorithm);
            let err = c
                .compare_images(&RgbaImage::new(1, 1), &RgbaImage::new(2, 2))
                .unwrap_err();
            assert!(matches!(err, DiffError::DimensionMismatch { .. }));
        }
    }

    #[test]
    fn ignore_color_applies_to_both_policies() {
        for algorithm in [Algorithm::Exact, Algorithm::Perceptual] {
            let mut c = ImageComparer::new(algorithm);
            assert_eq!(count(&c, WHITE, BLACK), 1, "{algorithm:?} before ignore");
            c.set_ignore_color(WHITE);
            assert_eq!(count(&c, WHITE, BLACK), 0, "{algorithm:?}");
            assert_eq!(count(&c, BLACK, WHITE), 0, "{algorithm:?}");
            assert_eq!(count(&c, WHITE, WHITE), 0, "{algorithm:?}");
            c.clear_ignore_color();
            assert_eq!(count(&c, WHITE, BLACK), 1, "{algorithm:?} after clear");
        }
    }

    #[test]
    fn translucent_pixels_compare_premultiplied() {
        let exact = ImageComparer::new(Algorithm::Exact);
        assert_eq!(count(&exact, Rgba([10, 0, 0, 1]), Rgba([200, 0, 0, 1])), 0);

        let perceptual = ImageComparer::new(Algorithm::Perceptual);
        assert_eq!(count(&perceptual, Rgba([255, 255, 255, 128]), WHITE), 1);

        let mut ignoring = ImageComparer::new(Algorithm::Exact);
        ignoring.set_ignore_color(Rgba([128, 128, 128, 128]));
        assert_eq!(count(&ignoring, Rgba([255, 255, 255, 128]), BLACK), 0);
    }

    #[test]
    fn threshold_only_for_perceptual() {
        let mut exact = ImageComparer::new(Algorithm::Exact);
        assert_eq!(
            exact.set_threshold(0.5),
            Err(DiffError::ThresholdUnsupported("exact"))
        );

        let mut perceptual = ImageComparer::new(Algorithm::Perceptual);
        let red = Rgba([255, 0, 0, 255]);
        let gray = Rgba([128, 128, 128, 255]);
        assert_eq!(count(&perceptual, red, gray), 1);
        perceptual.set_threshold(1.0).unwrap();
        assert_eq!(count(&perceptual, red, gray), 0);
    }

    #[test]
    fn from_settings_applies_everything() {
        let settings = DiffSettings {
            algorithm: Algorithm::Perceptual,
            threshold: 0.0,
            ignore_color: Some(WHITE),
            diff_color: Rgba([0, 0, 255, 255]),
        };
        let c = ImageComparer::from_settings(&settings);
        assert_eq!(c.algorithm(), Algorithm::Perceptual);
        assert_eq!(count(&c, WHITE, BLACK), 0);
        let r = c
            .compare_images(&one_pixel(Rgba([255, 0, 0, 255])), &one_pixel(Rgba([255, 1, 1, 255])))
            .unwrap();
        assert_eq!(r.diff_pixels, 1);
        assert_eq!(*r.diff_image.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn exact_from_settings_ignores_threshold() {
        let settings = DiffSettings {
            algorithm: Algorithm::Exact,
            threshold: 1.0,
            ..DiffSettings::default()
        };
        let c = ImageComparer::from_settings(&settings);
        assert_eq!(count(&c, WHITE, BLACK), 1);
    }

    #[test]
    fn comparer_and_driver_agree() {
        let mut a = RgbaImage::from_pixel(8, 8, Rgba([90, 90, 90, 255]));
        a.put_pixel(4, 4, WHITE);
        let b = Placed::new(RgbaImage::from_pixel(8, 8, Rgba([91, 90, 90, 255])), 3, 3).unwrap();
        for algorithm in [Algorithm::Exact, Algorithm::Perceptual] {
            let c = ImageComparer::new(algorithm);
            let direct = c.compare_images(&a, &b).unwrap();
            let driven = diff(&a, &b, c.pixel_comparer()).unwrap();
            assert_eq!(direct.diff_pixels, driven.diff_pixels);
            assert_eq!(direct.diff_image, driven.diff_image);
        }
    }

    #[test]
    fn algorithm_names_and_aliases() {
        use clap::ValueEnum;
        assert_eq!(Algorithm::from_str("smart", false), Ok(Algorithm::Perceptual));
        assert_eq!(Algorithm::from_str("simple", false), Ok(Algorithm::Exact));
        assert_eq!(Algorithm::Perceptual.name(), "perceptual");
    }
}
