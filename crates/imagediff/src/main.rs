mod cli;
mod commands;
mod report;

use clap::Parser;
use imagediff::config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imagediff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(cli.config.as_deref(), force)?;
        }
        cli::Command::Compare {
            img1,
            img2,
            output,
            fail_on_diff,
            diff,
        } => {
            let overrides = CliOverrides {
                config: cli.config,
                diff,
                listen: None,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            let diff_pixels = commands::compare(&config, &img1, &img2, &output)?;
            if fail_on_diff && diff_pixels > 0 {
                std::process::exit(1);
            }
        }
        cli::Command::Serve { listen, diff } => {
            let overrides = CliOverrides {
                config: cli.config,
                diff,
                listen,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            commands::serve(config).await?;
        }
    }

    Ok(())
}
