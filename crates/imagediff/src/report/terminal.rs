use std::path::Path;
use std::time::Duration;

use imagediff::DiffResult;

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Machine-readable result: `img1,img2,diff_pixels,output`.
pub fn format_result_line(img1: &Path, img2: &Path, diff_pixels: u64, output: &Path) -> String {
    format!(
        "{},{},{diff_pixels},{}",
        img1.display(),
        img2.display(),
        output.display()
    )
}

pub fn format_status_line(result: &DiffResult, elapsed: Duration) -> String {
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(elapsed));
    if result.is_match() {
        format!("  \x1b[32mPASS\x1b[0m  identical{time_suffix}")
    } else {
        format!(
            "  \x1b[31mFAIL\x1b[0m  ({} of {} pixels, {:.4}){time_suffix}",
            result.diff_pixels, result.total_pixels, result.score
        )
    }
}

/// Result line on stdout, coloured status on stderr.
pub fn print_result(
    img1: &Path,
    img2: &Path,
    output: &Path,
    result: &DiffResult,
    elapsed: Duration,
) {
    println!("{}", format_result_line(img1, img2, result.diff_pixels, output));
    eprintln!("{}", format_status_line(result, elapsed));
}
