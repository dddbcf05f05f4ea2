use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader, RgbaImage};

use super::ImageComparer;
use crate::diff::DiffResult;

/// Decode an encoded image, sniffing the format from its bytes.
pub fn decode(bytes: &[u8], label: &str) -> Result<DynamicImage> {
    image::load_from_memory(bytes).with_context(|| format!("Failed to decode {label}"))
}

pub fn open(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("Failed to encode diff image")?;
    Ok(buf)
}

/// Decode two encoded images and compare them.
///
/// Runs synchronously; async callers should use `spawn_blocking`.
pub fn compare_encoded(left: &[u8], right: &[u8], comparer: &ImageComparer) -> Result<DiffResult> {
    let left = decode(left, "first image")?;
    let right = decode(right, "second image")?;
    Ok(comparer.compare_images(&left, &right)?)
}
