pub mod color;
pub mod resolve;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::compare::Algorithm;

pub use self::color::{ColorParseError, ColorSpec};
pub use self::resolve::{CliOverrides, EnvLayer, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_template};

pub const CONFIG_FILE: &str = "imagediff.toml";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:80";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn validate_threshold(v: f32) -> Result<f32, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

pub(crate) fn parse_threshold(s: &str) -> Result<f32, String> {
    let v: f32 = s.trim().parse().map_err(|e| format!("{e}"))?;
    validate_threshold(v)
}

/// Comparison settings.
///
/// Every field is `Option`: `None` means "defer to the next layer".
/// Serves both TOML deserialization (`[diff]`) and CLI argument parsing.
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Comparison algorithm
    #[arg(long, value_enum)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,

    /// Perceptual sensitivity (0.0-1.0). 0 tolerates no colour change
    #[arg(long, value_parser = parse_threshold)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,

    /// Treat pixel pairs where either pixel has this colour (R,G,B[,A]) as equal
    #[arg(long, value_name = "R,G,B[,A]")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_color: Option<ColorSpec>,

    /// Colour painted over differing pixels (R,G,B[,A])
    #[arg(long, value_name = "R,G,B[,A]")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_color: Option<ColorSpec>,
}

impl DiffConfig {
    /// Overlay non-None fields from `other` onto self.
    pub fn merge(&mut self, other: &DiffConfig) {
        if other.algorithm.is_some() {
            self.algorithm = other.algorithm;
        }
        if other.threshold.is_some() {
            self.threshold = other.threshold;
        }
        if other.ignore_color.is_some() {
            self.ignore_color = other.ignore_color;
        }
        if other.diff_color.is_some() {
            self.diff_color = other.diff_color;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP service binds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,

    /// Upper bound on a request body, both images included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    fn validate(&self) -> Result<()> {
        if let Some(t) = self.diff.threshold {
            validate_threshold(t).map_err(|e| anyhow::anyhow!("diff.{e}"))?;
        }
        if self.server.max_upload_bytes == Some(0) {
            bail!("server.max_upload_bytes must be > 0");
        }
        Ok(())
    }
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config file.
///
/// An explicit `path` must exist. Without one, `imagediff.toml` in the working
/// directory is read if present and defaults are used otherwise.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p,
        None if config_file_exists() => Path::new(CONFIG_FILE),
        None => return Ok(Config::default()),
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}
