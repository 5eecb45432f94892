// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kantwerk: command-line document detection.
//
// Runs the file form of the pipeline on one photo and prints the normalized
// corners as JSON on stdout. Logs go to stderr, filtered by `RUST_LOG`.

use std::path::PathBuf;

use clap::Parser;
use kantwerk_core::config::DetectorConfig;
use kantwerk_core::error::Result;
use kantwerk_document::DocumentDetector;

#[derive(Debug, Parser)]
#[command(name = "kantwerk")]
#[command(about = "Find the document page in a photo and rectify it")]
#[command(version)]
struct Cli {
    /// Photo to analyse.
    input: PathBuf,

    /// Write the rectified, binarized scan here (format from the extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON detector configuration; missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the quarter-turn clockwise rotation applied before detection.
    #[arg(long)]
    no_rotate: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    tracing::info!(input = %cli.input.display(), "Kantwerk starting");
    let detector = DocumentDetector::new(config);
    let result = detector.detect_file(&cli.input, cli.output.as_deref());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn load_config(cli: &Cli) -> Result<DetectorConfig> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::from_json_file(path)?,
        None => DetectorConfig::default(),
    };
    if cli.no_rotate {
        config.scan_output.rotate_clockwise = false;
    }
    config.validate()?;
    Ok(config)
}
