//! gen-skinned-fan - procedural skinned fan GLB generator
//!
//! Usage:
//!   cargo run -p gen-skinned-fan -- [--config fan.toml] [--output polygon.glb]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use gen_skinned_fan::FanConfig;

#[derive(Parser)]
#[command(name = "gen-skinned-fan")]
#[command(about = "Generate a skinned, animated triangle-fan GLB")]
#[command(version)]
struct Cli {
    /// TOML file with generation parameters (defaults to the sample polygon)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output GLB path (overrides the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Triangle-fan segment count (overrides the config)
    #[arg(short, long)]
    divisions: Option<u32>,

    /// Build and verify the asset without writing it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading config {:?}", path);
            FanConfig::load(path)?
        }
        None => FanConfig::default(),
    };
    if let Some(output) = cli.output {
        config.output = output;
    }
    if let Some(divisions) = cli.divisions {
        config.divisions = divisions;
    }

    if cli.dry_run {
        let asset = gen_skinned_fan::generate(&config).context("Generation failed")?;
        tracing::info!(
            "Dry run: {} bytes, animation duration {}",
            asset.glb.len(),
            asset.summary.duration
        );
        return Ok(());
    }

    let summary = gen_skinned_fan::run(&config)
        .with_context(|| format!("Failed to generate {:?}", config.output))?;
    tracing::info!("Done! Animation duration {}", summary.duration);

    Ok(())
}
