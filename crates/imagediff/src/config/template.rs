use std::path::Path;

use anyhow::{Context, Result, bail};

use super::CONFIG_FILE;

/// Hand-written template with every key commented out, so `imagediff init`
/// documents the knobs without changing behaviour.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[diff]
# algorithm = "perceptual"          # "perceptual" | "exact"
# threshold = 0.1                   # perceptual only: 0.0 = any colour change counts
# ignore_color = "255,255,255"      # R,G,B[,A]: pixels of this colour never count
# diff_color = "255,0,0,255"        # highlight for differing pixels

# ─────────────────────────────────────────────────────────
# HTTP service (`imagediff serve`) — all fields optional.
# ─────────────────────────────────────────────────────────
[server]
# listen = "0.0.0.0:80"
# max_upload_bytes = 10485760
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_FILE).exists()
}

/// Write the template to `path`, refusing to clobber an existing file
/// unless `force` is set.
pub fn write_template(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))
}
