use std::path::Path;

use anyhow::Result;
use imagediff::config::{self, CONFIG_FILE};

/// `imagediff init` — write a commented config template.
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = path.unwrap_or(Path::new(CONFIG_FILE));
    let existed = path.exists();
    config::write_template(path, force)?;

    let verb = if existed { "Regenerated" } else { "Created" };
    println!("{verb} {}", path.display());
    Ok(())
}
