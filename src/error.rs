//! Error types shared by the analysis pipeline.

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
    #[error("Missing required column: {0}")]
    Schema(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Chart rendering failed: {0}")]
    Chart(String),
    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Report write failed: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
