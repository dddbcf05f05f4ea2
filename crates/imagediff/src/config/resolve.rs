use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;

use super::{
    ColorSpec, Config, DEFAULT_LISTEN, DEFAULT_MAX_UPLOAD_BYTES, DiffConfig, load,
    parse_threshold, validate_threshold,
};
use crate::compare::{Algorithm, DiffSettings};

/// Values extracted from the CLI that participate in the merge.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub diff: DiffConfig,
    pub listen: Option<String>,
}

/// Settings taken from `IMAGEDIFF_*` environment variables.
#[derive(Debug, Default, PartialEq)]
pub struct EnvLayer {
    pub diff: DiffConfig,
    pub listen: Option<String>,
}

impl EnvLayer {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the layer from an arbitrary variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let algorithm = get("IMAGEDIFF_ALGORITHM")
            .map(|v| Algorithm::from_str(v.trim(), true).map_err(|e| anyhow!(e)))
            .transpose()
            .context("IMAGEDIFF_ALGORITHM must be `exact` or `perceptual`")?;
        let threshold = get("IMAGEDIFF_THRESHOLD")
            .map(|v| parse_threshold(&v).map_err(|e| anyhow!(e)))
            .transpose()
            .context("IMAGEDIFF_THRESHOLD must be a float between 0.0 and 1.0")?;
        let ignore_color = get("IMAGEDIFF_IGNORE_COLOR")
            .map(|v| v.parse::<ColorSpec>())
            .transpose()
            .context("IMAGEDIFF_IGNORE_COLOR must be R,G,B[,A]")?;
        let diff_color = get("IMAGEDIFF_DIFF_COLOR")
            .map(|v| v.parse::<ColorSpec>())
            .transpose()
            .context("IMAGEDIFF_DIFF_COLOR must be R,G,B[,A]")?;

        Ok(Self {
            diff: DiffConfig {
                algorithm,
                threshold,
                ignore_color,
                diff_color,
            },
            listen: get("IMAGEDIFF_LISTEN"),
        })
    }
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRunConfig {
    pub diff: DiffSettings,
    pub listen: String,
    pub max_upload_bytes: usize,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        let file = load(cli.config.as_deref())?;
        let env = EnvLayer::from_env()?;
        Self::from_layers(file, env, cli)
    }

    pub fn from_layers(file: Config, env: EnvLayer, cli: CliOverrides) -> Result<Self> {
        // File base, then env, then CLI on top.
        let mut diff = file.diff;
        diff.merge(&env.diff);
        diff.merge(&cli.diff);

        let defaults = DiffSettings::default();
        let threshold = diff.threshold.unwrap_or(defaults.threshold);
        validate_threshold(threshold).map_err(|e| anyhow!(e))?;

        let listen = cli
            .listen
            .or(env.listen)
            .or(file.server.listen)
            .unwrap_or_else(|| DEFAULT_LISTEN.to_owned());

        Ok(Self {
            diff: DiffSettings {
                algorithm: diff.algorithm.unwrap_or(defaults.algorithm),
                threshold,
                ignore_color: diff.ignore_color.map(Into::into),
                diff_color: diff.diff_color.map_or(defaults.diff_color, Into::into),
            },
            listen,
            max_upload_bytes: file
                .server
                .max_upload_bytes
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}
