//! Column names used throughout the analysis.

pub const CONTINENT: &str = "continent";
pub const LOCATION: &str = "location";
pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const TOTAL_CASES_PER_MILLION: &str = "total_cases_per_million";
pub const TOTAL_DEATHS_PER_MILLION: &str = "total_deaths_per_million";
pub const POPULATION_DENSITY: &str = "population_density";
pub const MEDIAN_AGE: &str = "median_age";

pub const FINAL_CASES: &str = "final_cases";
pub const FINAL_DEATHS: &str = "final_deaths";

/// The eight columns kept by the column selector, in output order.
pub const SELECTED_COLUMNS: [&str; 8] = [
    CONTINENT,
    LOCATION,
    TOTAL_CASES,
    TOTAL_DEATHS,
    TOTAL_CASES_PER_MILLION,
    TOTAL_DEATHS_PER_MILLION,
    POPULATION_DENSITY,
    MEDIAN_AGE,
];

/// Text columns among [`SELECTED_COLUMNS`]; everything else is Float64.
pub const TEXT_COLUMNS: [&str; 2] = [CONTINENT, LOCATION];

/// Columns whose missing values are replaced with zero.
pub const ZERO_FILL_COLUMNS: [&str; 4] = [
    TOTAL_CASES,
    TOTAL_DEATHS,
    TOTAL_CASES_PER_MILLION,
    TOTAL_DEATHS_PER_MILLION,
];

/// Summary metric produced by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    /// Observation column the metric is computed from.
    pub fn source_column(self) -> &'static str {
        match self {
            Metric::Cases => TOTAL_CASES,
            Metric::Deaths => TOTAL_DEATHS,
        }
    }

    /// Column name of the metric in summary tables.
    pub fn summary_column(self) -> &'static str {
        match self {
            Metric::Cases => FINAL_CASES,
            Metric::Deaths => FINAL_DEATHS,
        }
    }
}
