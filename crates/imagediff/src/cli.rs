use std::path::PathBuf;

use clap::{Parser, Subcommand};
use imagediff::config::DiffConfig;

#[derive(Parser)]
#[command(
    name = "imagediff",
    version,
    about = "Pixel-by-pixel image comparison for visual regression testing"
)]
pub struct Cli {
    /// Config file (default: ./imagediff.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two images and write the diff image (PNG)
    Compare {
        /// Image to compare
        #[arg(long)]
        img1: PathBuf,
        /// Other image to compare with
        #[arg(long)]
        img2: PathBuf,
        /// Where to store the diff image
        #[arg(long)]
        output: PathBuf,
        /// Exit with status 1 when any pixel differs
        #[arg(long)]
        fail_on_diff: bool,
        #[command(flatten)]
        diff: DiffConfig,
    },

    /// Serve comparisons over HTTP (multipart upload of two images)
    Serve {
        /// Host and port to listen on (overrides config)
        #[arg(long)]
        listen: Option<String>,
        #[command(flatten)]
        diff: DiffConfig,
    },

    /// Create imagediff.toml with commented-out defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long, short = 'f')]
        force: bool,
    },
}
