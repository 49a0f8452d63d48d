//! End-to-end analysis: load, normalize, summarize, rank and regress.

use crate::data::schema::{Metric, CONTINENT, FINAL_CASES, FINAL_DEATHS};
use crate::data::{
    Aggregator, ContinentConflict, DataLoader, DataProcessor, Summaries, TopNRanker, DEFAULT_TOP_N,
};
use crate::error::Result;
use crate::stats::{RegressionResult, StatsCalculator};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Runtime options, filled from the command line.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub top_n: usize,
    pub charts_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            top_n: DEFAULT_TOP_N,
            charts_dir: None,
            report_path: None,
        }
    }
}

/// Ranked views of the country summary for one metric.
#[derive(Debug, Clone)]
pub struct Rankings {
    pub global: DataFrame,
    pub by_continent: DataFrame,
}

impl Rankings {
    fn build(countries: &DataFrame, metric: Metric, n: usize) -> Result<Self> {
        let key = metric.summary_column();
        Ok(Self {
            global: TopNRanker::top_n(countries, key, n)?,
            by_continent: TopNRanker::top_n_by_continent(countries, key, n)?,
        })
    }
}

/// Every table the presentation layer consumes.
#[derive(Debug, Clone)]
pub struct CovidAnalysis {
    pub loaded_rows: usize,
    /// Observations after null normalization.
    pub observations: DataFrame,
    pub summaries: Summaries,
    pub top_cases: Rankings,
    pub top_deaths: Rankings,
    /// One row per country at its maximum case count; shared by all regressions.
    pub latest: DataFrame,
    pub regressions: Vec<RegressionResult>,
    pub conflicts: Vec<ContinentConflict>,
}

impl CovidAnalysis {
    /// Load `path` and run the whole pipeline.
    pub fn run(path: &Path, top_n: usize) -> Result<Self> {
        let selected = DataLoader::load_observations(path)?;
        info!(path = %path.display(), rows = selected.height(), "Observations loaded");
        Self::from_observations(&selected, top_n)
    }

    /// Run the pipeline on an already projected observation table.
    pub fn from_observations(selected: &DataFrame, top_n: usize) -> Result<Self> {
        let loaded_rows = selected.height();

        let observations = DataProcessor::normalize_nulls(selected)?;
        info!(
            rows = observations.height(),
            dropped = loaded_rows - observations.height(),
            "Nulls normalized"
        );

        let conflicts = DataProcessor::continent_conflicts(&observations)?;
        for conflict in &conflicts {
            warn!(
                location = %conflict.location,
                continents = ?conflict.continents,
                "Location reported under several continents"
            );
        }

        let summaries = Aggregator::summarize(&observations)?;
        info!(
            countries = summaries.countries.height(),
            continents = summaries.continents.height(),
            "Summaries built"
        );

        let top_cases = Rankings::build(&summaries.countries, Metric::Cases, top_n)?;
        let top_deaths = Rankings::build(&summaries.countries, Metric::Deaths, top_n)?;

        let latest = DataProcessor::latest_per_country(&observations)?;
        info!(countries = latest.height(), "Per-country correlation table built");

        let regressions = StatsCalculator::regress_all(&latest)?;
        for r in &regressions {
            info!(
                analysis = r.analysis.name(),
                n = r.fit.n,
                slope = r.fit.slope,
                p_value = r.fit.p_value,
                "Regression fitted"
            );
        }

        Ok(Self {
            loaded_rows,
            observations,
            summaries,
            top_cases,
            top_deaths,
            latest,
            regressions,
            conflicts,
        })
    }

    pub fn rankings(&self, metric: Metric) -> &Rankings {
        match metric {
            Metric::Cases => &self.top_cases,
            Metric::Deaths => &self.top_deaths,
        }
    }

    /// Continent totals as (continent, final_cases, final_deaths).
    pub fn continent_totals(&self) -> Result<Vec<(String, Option<f64>, Option<f64>)>> {
        let df = &self.summaries.continents;
        let continents = df.column(CONTINENT)?.str()?;
        let cases = df.column(FINAL_CASES)?.f64()?;
        let deaths = df.column(FINAL_DEATHS)?.f64()?;

        Ok(continents
            .into_iter()
            .zip(cases.into_iter())
            .zip(deaths.into_iter())
            .filter_map(|((c, cases), deaths)| c.map(|c| (c.to_string(), cases, deaths)))
            .collect())
    }
}
