//! COVID-19 EDA - batch analysis of a COVID-19 time-series CSV
//!
//! Loads the dataset, builds per-country and per-continent summaries, ranks
//! the top countries, fits simple regressions and optionally renders charts
//! and a JSON report.

mod analysis;
mod charts;
mod data;
mod error;
mod report;
mod stats;

use analysis::{AnalysisConfig, CovidAnalysis};
use anyhow::{Context, Result};
use charts::ChartGallery;
use clap::Parser;
use data::DEFAULT_TOP_N;
use report::AnalysisReport;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Exploratory analysis of a COVID-19 time-series CSV",
    long_about = None
)]
struct Cli {
    /// Path to the comma-delimited dataset
    input: PathBuf,

    /// Number of countries kept by each ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Directory for PNG charts; no charts are rendered when omitted
    #[arg(long)]
    charts_dir: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

impl From<Cli> for AnalysisConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.input,
            top_n: cli.top_n,
            charts_dir: cli.charts_dir,
            report_path: cli.report,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AnalysisConfig::from(Cli::parse());

    let analysis = CovidAnalysis::run(&config.input, config.top_n)
        .with_context(|| format!("analysis of {} failed", config.input.display()))?;
    let report = AnalysisReport::from_analysis(&analysis).context("building report")?;

    report::print_summary(&analysis, &report);

    if let Some(path) = &config.report_path {
        report
            .write_json(path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    if let Some(dir) = &config.charts_dir {
        ChartGallery::render_all(&analysis, dir)
            .with_context(|| format!("preparing chart directory {}", dir.display()))?;
    }

    Ok(())
}
