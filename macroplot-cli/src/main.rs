//! macroplot CLI: chart US unemployment against PCE inflation from FRED data.
//!
//! Running with no arguments fetches both series with the built-in
//! configuration and writes `economic_comparison_plot.svg`.
//!
//! Optional flags:
//! - `--config`: TOML file overriding the built-in configuration
//! - `--output`: chart path
//! - `--csv`: also write the merged table as CSV
//! - `--show`: open the saved chart in the system viewer

use anyhow::{Context, Result};
use clap::Parser;
use macroplot_core::data::FredProvider;
use macroplot_runner::{run_pipeline, PipelineConfig, PipelineError, StdoutProgress};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "macroplot",
    about = "Fetch UNRATE and PCEPI from FRED and plot them on a dual-axis chart"
)]
struct Cli {
    /// TOML config file. Keys not set fall back to the built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chart output path (SVG). Overrides the config file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the merged table as CSV to this path.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Open the chart in the system viewer once it is saved.
    #[arg(long)]
    show: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let provider = FredProvider::with_endpoint(
        &config.endpoint,
        config.request_timeout_secs.map(Duration::from_secs),
    )
    .context("failed to set up FRED client")?;

    match run_pipeline(&config, &provider, &StdoutProgress) {
        Ok(report) => {
            tracing::info!(
                rows = report.merged.len(),
                chart = %report.chart_path.display(),
                "pipeline finished"
            );
            if cli.show {
                show_chart(&report.chart_path);
            }
            Ok(())
        }
        Err(e) => {
            report_failure(&e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.chart.output = output.clone();
    }
    if let Some(csv) = &cli.csv {
        config.csv_output = Some(csv.clone());
    }
    Ok(config)
}

/// Hand the chart to the platform's default viewer. Failure only warns; the
/// chart is already on disk.
fn show_chart(path: &Path) {
    match viewer_command(path).spawn() {
        Ok(_) => tracing::debug!(path = %path.display(), "opened chart viewer"),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not open chart viewer");
            eprintln!("Could not open {}: {e}", path.display());
        }
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

fn report_failure(e: &PipelineError) {
    match e {
        PipelineError::Config(_) => eprintln!("CRITICAL ERROR: {e}"),
        PipelineError::InsufficientSeries { .. } => eprintln!("Pipeline aborted: {e}"),
        _ => eprintln!("Pipeline failed: {e}"),
    }
}
