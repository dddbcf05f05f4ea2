use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use imagediff::ImageComparer;
use imagediff::compare::codec;
use imagediff::config::ResolvedRunConfig;
use tracing::debug;

use crate::report::terminal;

/// `imagediff compare` — diff two files and write the diff PNG.
///
/// Returns the number of differing pixels.
pub fn compare(config: &ResolvedRunConfig, img1: &Path, img2: &Path, output: &Path) -> Result<u64> {
    let left = codec::open(img1)?;
    let right = codec::open(img2)?;

    let comparer = ImageComparer::from_settings(&config.diff);
    debug!(
        algorithm = comparer.algorithm().name(),
        threshold = config.diff.threshold,
        "comparing"
    );

    let start = Instant::now();
    let result = comparer.compare_images(&left, &right)?;
    let elapsed = start.elapsed();

    let png = codec::encode_png(&result.diff_image)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output, png).with_context(|| format!("Failed to write {}", output.display()))?;

    terminal::print_result(img1, img2, output, &result, elapsed);
    Ok(result.diff_pixels)
}
