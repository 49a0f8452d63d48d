//! CSV Data Loader Module
//! Handles CSV file loading and projection to the analysis columns using Polars.

use crate::data::schema::{SELECTED_COLUMNS, TEXT_COLUMNS};
use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Loads the observation table and projects it to the eight analysis columns.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    ///
    /// Any read or parse failure is reported as [`AnalysisError::Io`]; malformed
    /// rows are not skipped.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame> {
        // Infer over the whole file so late numeric values never hit a string schema
        LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|source| AnalysisError::Io {
                path: file_path.to_path_buf(),
                source,
            })
    }

    /// Project to [`SELECTED_COLUMNS`], preserving row order and count.
    ///
    /// Numeric columns are cast to Float64, text columns to String. A numeric
    /// cell that does not parse is an error, never a null.
    pub fn select_columns(df: &DataFrame) -> Result<DataFrame> {
        if let Some(missing) = SELECTED_COLUMNS
            .iter()
            .find(|name| df.get_column_index(name).is_none())
        {
            return Err(AnalysisError::Schema(missing.to_string()));
        }

        let exprs: Vec<Expr> = SELECTED_COLUMNS
            .iter()
            .map(|&name| {
                if TEXT_COLUMNS.contains(&name) {
                    col(name).cast(DataType::String)
                } else {
                    col(name).strict_cast(DataType::Float64)
                }
            })
            .collect();

        Ok(df.clone().lazy().select(exprs).collect()?)
    }

    /// Load and project in one step.
    pub fn load_observations(file_path: &Path) -> Result<DataFrame> {
        let raw = Self::load_csv(file_path)?;
        debug!(rows = raw.height(), columns = raw.width(), "CSV loaded");
        Self::select_columns(&raw).map_err(|err| match err {
            AnalysisError::Polars(source) => AnalysisError::Io {
                path: file_path.to_path_buf(),
                source,
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{
        CONTINENT, LOCATION, MEDIAN_AGE, POPULATION_DENSITY, TOTAL_CASES,
        TOTAL_CASES_PER_MILLION, TOTAL_DEATHS, TOTAL_DEATHS_PER_MILLION,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "iso_code,continent,location,date,total_cases,new_cases,total_deaths,\
total_cases_per_million,total_deaths_per_million,population_density,median_age";

    fn write_csv(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}").expect("write header");
        write!(file, "{body}").expect("write body");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn loads_and_projects_eight_columns() {
        let file = write_csv(
            "AFG,Asia,Afghanistan,2020-03-01,1,1,,0.03,,54.42,18.6\n\
             AFG,Asia,Afghanistan,2020-03-02,5,4,1,0.13,0.02,54.42,18.6\n\
             OWID_WRL,,World,2020-03-02,100,10,3,12.5,0.4,,\n",
        );

        let df = DataLoader::load_observations(file.path()).expect("load");

        assert_eq!(df.height(), 3);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, SELECTED_COLUMNS.to_vec());
        assert_eq!(df.column(TOTAL_CASES).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(LOCATION).unwrap().dtype(), &DataType::String);

        let density = df.column(POPULATION_DENSITY).unwrap().f64().unwrap();
        assert_eq!(density.get(0), Some(54.42));
        assert_eq!(density.get(2), None);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let df = df!(
            "continent" => ["Asia"],
            "location" => ["Afghanistan"],
            "total_cases" => [1.0],
        )
        .unwrap();

        let err = DataLoader::select_columns(&df).unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(ref name) if name == "total_deaths"));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.csv");

        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn malformed_row_is_an_io_error() {
        // two fields more than the header
        let file = write_csv(
            "AFG,Asia,Afghanistan,2020-03-01,1,1,0,0.03,0,54.42,18.6\n\
             AFG,Asia,Afghanistan,2020-03-02,5,4,1,0.13,0.02,54.42,18.6,extra,extra\n",
        );

        let err = DataLoader::load_observations(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn short_row_is_padded_with_nulls() {
        let file = write_csv(
            "AFG,Asia,Afghanistan,2020-03-01,1,1,0,0.03,0,54.42,18.6\n\
             AFG,Asia,Afghanistan,2020-03-02,5,4,1,0.13,0.02\n",
        );

        let df = DataLoader::load_observations(file.path()).expect("load");

        assert_eq!(df.height(), 2);
        let cases = df.column(TOTAL_CASES).unwrap().f64().unwrap();
        assert_eq!(cases.get(1), Some(5.0));
        let density = df.column(POPULATION_DENSITY).unwrap().f64().unwrap();
        assert_eq!(density.get(1), None);
        assert_eq!(df.column(MEDIAN_AGE).unwrap().null_count(), 1);
    }

    #[test]
    fn non_numeric_cell_fails_the_load() {
        let file = write_csv(
            "AFG,Asia,Afghanistan,2020-03-01,1,1,0,0.03,0,54.42,18.6\n\
             BEN,Africa,Benin,2020-03-01,abc,1,1,1,1,1,1\n",
        );

        let err = DataLoader::load_observations(file.path()).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn select_rejects_unparseable_numbers_instead_of_nulling_them() {
        let df = df!(
            CONTINENT => ["Asia", "Asia"],
            LOCATION => ["A", "B"],
            TOTAL_CASES => ["12", "abc"],
            TOTAL_DEATHS => [Some(1.0), None],
            TOTAL_CASES_PER_MILLION => [1.0, 1.0],
            TOTAL_DEATHS_PER_MILLION => [1.0, 1.0],
            POPULATION_DENSITY => [1.0, 1.0],
            MEDIAN_AGE => [1.0, 1.0],
        )
        .unwrap();

        assert!(matches!(
            DataLoader::select_columns(&df),
            Err(AnalysisError::Polars(_))
        ));

        // genuinely missing cells stay null for the normalizer
        let clean = df!(
            CONTINENT => ["Asia", "Asia"],
            LOCATION => ["A", "B"],
            TOTAL_CASES => ["12", "7"],
            TOTAL_DEATHS => [Some(1.0), None],
            TOTAL_CASES_PER_MILLION => [1.0, 1.0],
            TOTAL_DEATHS_PER_MILLION => [1.0, 1.0],
            POPULATION_DENSITY => [1.0, 1.0],
            MEDIAN_AGE => [1.0, 1.0],
        )
        .unwrap();
        let selected = DataLoader::select_columns(&clean).unwrap();
        assert_eq!(selected.column(TOTAL_DEATHS).unwrap().null_count(), 1);
        let cases = selected.column(TOTAL_CASES).unwrap().f64().unwrap();
        assert_eq!(cases.get(1), Some(7.0));
    }
}
