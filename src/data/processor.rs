//! Data Processor Module
//! Handles null normalization, the per-country "latest" table and consistency checks.

use crate::data::schema::{
    CONTINENT, LOCATION, SELECTED_COLUMNS, TOTAL_CASES, ZERO_FILL_COLUMNS,
};
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A location observed under more than one continent label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinentConflict {
    pub location: String,
    pub continents: Vec<String>,
}

/// Handles data cleaning and per-country reduction.
pub struct DataProcessor;

impl DataProcessor {
    /// Replace missing values with zero in the four cumulative columns, then
    /// drop rows without a continent.
    ///
    /// `population_density` and `median_age` keep their nulls.
    pub fn normalize_nulls(df: &DataFrame) -> Result<DataFrame> {
        let filled: Vec<Expr> = ZERO_FILL_COLUMNS
            .iter()
            .map(|&name| col(name).fill_null(lit(0.0)))
            .collect();

        let normalized = df
            .clone()
            .lazy()
            .with_columns(filled)
            .filter(col(CONTINENT).is_not_null())
            .collect()?;

        Ok(normalized)
    }

    /// Build one row per country taken at the observation with the largest
    /// `total_cases`.
    ///
    /// The first row reaching the maximum wins. Rows with any null among the
    /// selected columns are dropped, as are rows with zero cases. Countries come
    /// out in ascending location order.
    pub fn latest_per_country(df: &DataFrame) -> Result<DataFrame> {
        let locations = df.column(LOCATION)?.str()?;
        let cases = df.column(TOTAL_CASES)?.f64()?;

        // location -> (row index, total_cases)
        let mut best: BTreeMap<&str, (usize, Option<f64>)> = BTreeMap::new();
        for idx in 0..df.height() {
            let Some(location) = locations.get(idx) else {
                continue;
            };
            let value = cases.get(idx);
            best.entry(location)
                .and_modify(|(best_idx, best_value)| {
                    if Self::exceeds(value, *best_value) {
                        *best_idx = idx;
                        *best_value = value;
                    }
                })
                .or_insert((idx, value));
        }

        let indices: Vec<IdxSize> = best.values().map(|(idx, _)| *idx as IdxSize).collect();
        let picked = df.take(&IdxCa::from_vec("idx".into(), indices))?;

        let complete = SELECTED_COLUMNS
            .iter()
            .map(|&name| col(name).is_not_null())
            .reduce(|acc, e| acc.and(e))
            .unwrap_or_else(|| lit(true));

        let latest = picked
            .lazy()
            .filter(complete)
            .filter(col(TOTAL_CASES).neq(lit(0.0)))
            .collect()?;

        Ok(latest)
    }

    /// Strictly greater, with null treated as smaller than any number.
    fn exceeds(candidate: Option<f64>, current: Option<f64>) -> bool {
        match (candidate, current) {
            (Some(c), Some(b)) => c > b,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Report locations that carry more than one continent label.
    pub fn continent_conflicts(df: &DataFrame) -> Result<Vec<ContinentConflict>> {
        let locations = df.column(LOCATION)?.str()?;
        let continents = df.column(CONTINENT)?.str()?;

        let mut seen: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (location, continent) in locations.into_iter().zip(continents.into_iter()) {
            if let (Some(location), Some(continent)) = (location, continent) {
                seen.entry(location).or_default().insert(continent);
            }
        }

        Ok(seen
            .into_iter()
            .filter(|(_, labels)| labels.len() > 1)
            .map(|(location, labels)| ContinentConflict {
                location: location.to_string(),
                continents: labels.into_iter().map(str::to_string).collect(),
            })
            .collect())
    }
}
