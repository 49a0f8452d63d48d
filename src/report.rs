//! Report Module
//! Serializable summary of an analysis run, console output and narrative lines.

use crate::analysis::CovidAnalysis;
use crate::data::schema::{Metric, CONTINENT, FINAL_CASES, FINAL_DEATHS, LOCATION};
use crate::data::ContinentConflict;
use crate::error::Result;
use crate::stats::RegressionResult;
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct ContinentTotal {
    pub continent: String,
    pub final_cases: Option<f64>,
    pub final_deaths: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryTotal {
    pub continent: Option<String>,
    pub location: Option<String>,
    pub final_cases: Option<f64>,
    pub final_deaths: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedTables {
    pub global: Vec<CountryTotal>,
    pub by_continent: Vec<CountryTotal>,
}

/// Everything a reader of the analysis needs, in JSON-friendly form.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub loaded_rows: usize,
    pub normalized_rows: usize,
    pub countries: usize,
    pub correlation_countries: usize,
    pub continents: Vec<ContinentTotal>,
    pub top_cases: RankedTables,
    pub top_deaths: RankedTables,
    pub regressions: Vec<RegressionResult>,
    pub continent_conflicts: Vec<ContinentConflict>,
}

impl AnalysisReport {
    pub fn from_analysis(analysis: &CovidAnalysis) -> Result<Self> {
        let continents = analysis
            .continent_totals()?
            .into_iter()
            .map(|(continent, final_cases, final_deaths)| ContinentTotal {
                continent,
                final_cases,
                final_deaths,
            })
            .collect();

        Ok(Self {
            loaded_rows: analysis.loaded_rows,
            normalized_rows: analysis.observations.height(),
            countries: analysis.summaries.countries.height(),
            correlation_countries: analysis.latest.height(),
            continents,
            top_cases: Self::ranked_tables(analysis, Metric::Cases)?,
            top_deaths: Self::ranked_tables(analysis, Metric::Deaths)?,
            regressions: analysis.regressions.clone(),
            continent_conflicts: analysis.conflicts.clone(),
        })
    }

    fn ranked_tables(analysis: &CovidAnalysis, metric: Metric) -> Result<RankedTables> {
        let rankings = analysis.rankings(metric);
        Ok(RankedTables {
            global: country_rows(&rankings.global)?,
            by_continent: country_rows(&rankings.by_continent)?,
        })
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// One sentence per regression.
    pub fn narrative(&self) -> Vec<String> {
        self.regressions
            .iter()
            .map(|r| {
                let verdict = if r.is_significant {
                    "a statistically significant"
                } else {
                    "no statistically significant"
                };
                format!(
                    "{}: across {} countries, {} shows {} linear relationship with {} \
                     (slope {:.4}, intercept {:.4}, R² {:.3}, p = {:.4}).",
                    r.analysis.name(),
                    r.fit.n,
                    r.x,
                    verdict,
                    r.y,
                    r.fit.slope,
                    r.fit.intercept,
                    r.fit.r_squared,
                    r.fit.p_value
                )
            })
            .collect()
    }
}

/// Rows of a (continent, location, final_cases, final_deaths) table.
fn country_rows(df: &DataFrame) -> Result<Vec<CountryTotal>> {
    let continents = df.column(CONTINENT)?.str()?;
    let locations = df.column(LOCATION)?.str()?;
    let cases = df.column(FINAL_CASES)?.f64()?;
    let deaths = df.column(FINAL_DEATHS)?.f64()?;

    Ok((0..df.height())
        .map(|i| CountryTotal {
            continent: continents.get(i).map(str::to_string),
            location: locations.get(i).map(str::to_string),
            final_cases: cases.get(i),
            final_deaths: deaths.get(i),
        })
        .collect())
}

/// Print the main tables and the narrative to stdout.
pub fn print_summary(analysis: &CovidAnalysis, report: &AnalysisReport) {
    println!("Continent totals\n{}", analysis.summaries.continents);
    println!("Top countries by cases\n{}", analysis.top_cases.global);
    println!("Top countries by deaths\n{}", analysis.top_deaths.global);
    for line in report.narrative() {
        println!("{line}");
    }
    if !report.continent_conflicts.is_empty() {
        println!(
            "{} locations appear under more than one continent",
            report.continent_conflicts.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::*;

    fn selected() -> DataFrame {
        df!(
            CONTINENT => [Some("X"), Some("X"), Some("X"), Some("Y"), None],
            LOCATION => ["A", "B", "C", "D", "World"],
            TOTAL_CASES => [10.0, 30.0, 50.0, 70.0, 160.0],
            TOTAL_DEATHS => [1.0, 2.0, 4.0, 5.0, 12.0],
            TOTAL_CASES_PER_MILLION => [1.0, 3.0, 5.0, 7.0, 16.0],
            TOTAL_DEATHS_PER_MILLION => [0.1, 0.2, 0.4, 0.5, 1.2],
            POPULATION_DENSITY => [Some(10.0), Some(20.0), Some(35.0), Some(40.0), None],
            MEDIAN_AGE => [Some(20.0), Some(25.0), Some(30.0), Some(45.0), None],
        )
        .unwrap()
    }

    #[test]
    fn report_mirrors_analysis_tables() {
        let analysis = CovidAnalysis::from_observations(&selected(), 2).unwrap();
        let report = AnalysisReport::from_analysis(&analysis).unwrap();

        assert_eq!(report.loaded_rows, 5);
        assert_eq!(report.normalized_rows, 4);
        assert_eq!(report.countries, 4);
        assert_eq!(report.correlation_countries, 4);
        assert_eq!(report.continents.len(), 2);
        assert_eq!(report.continents[0].continent, "X");
        assert_eq!(report.continents[0].final_cases, Some(90.0));

        assert_eq!(report.top_cases.global.len(), 2);
        assert_eq!(report.top_cases.global[0].location.as_deref(), Some("D"));
        // X keeps C and B, Y keeps D
        assert_eq!(report.top_cases.by_continent.len(), 3);
        assert_eq!(report.narrative().len(), report.regressions.len());
    }

    #[test]
    fn report_round_trips_through_json_file() {
        let analysis = CovidAnalysis::from_observations(&selected(), 15).unwrap();
        let report = AnalysisReport::from_analysis(&analysis).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["loaded_rows"], 5);
        assert_eq!(value["regressions"].as_array().unwrap().len(), 5);
        assert_eq!(value["regressions"][0]["analysis"], "cases_vs_density");
        assert!(value["regressions"][0]["slope"].is_number());
    }
}
