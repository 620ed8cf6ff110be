//! Render a poster job from the command line.
//!
//! Reads a JSON job, composes the poster and either writes a PNG file or
//! prints the base64-encoded PNG to stdout.

mod config;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use poster_canvas::PosterJob;

use crate::config::CliConfig;

#[derive(Debug, Parser)]
#[command(name = "poster", version, about = "Compose a poster from a JSON job")]
struct Args {
    /// Path to the poster job (JSON).
    job: PathBuf,

    /// Write the PNG here instead of printing base64 to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Font used when the job names none (overrides POSTER_FONT).
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    config::load_dotenv();
    let config = CliConfig::load();
    tracing::debug!(?config, "Configuration loaded");

    let raw = std::fs::read_to_string(&args.job)
        .with_context(|| format!("failed to read job file {}", args.job.display()))?;
    let job = PosterJob::from_json(&raw)
        .with_context(|| format!("failed to parse job file {}", args.job.display()))?;

    let base_dir = args.job.parent().unwrap_or_else(|| Path::new("."));
    // Fonts from flags or the environment are relative to the working directory.
    let fallback_font = args
        .font
        .as_deref()
        .or(config.default_font.as_deref())
        .map(std::path::absolute)
        .transpose()
        .context("failed to resolve font path")?;
    let poster = job
        .render(base_dir, fallback_font.as_deref(), config.canvas_options())
        .context("failed to render poster")?;

    match args.output {
        Some(path) => poster
            .save_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", poster.export_base64().context("failed to export poster")?),
    }
    Ok(())
}
