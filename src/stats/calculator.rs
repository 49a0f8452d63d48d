//! Statistics Calculator Module
//! Simple linear regression with a Student-t significance test on the slope.

use crate::data::schema::{
    MEDIAN_AGE, POPULATION_DENSITY, TOTAL_CASES, TOTAL_CASES_PER_MILLION, TOTAL_DEATHS,
    TOTAL_DEATHS_PER_MILLION,
};
use crate::error::Result;
use polars::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for the slope test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// The correlation analyses run over the per-country table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Analysis {
    CasesVsDensity,
    DeathsVsDensity,
    DeathsVsCases,
    PerMillion,
    DeathsVsAge,
}

impl Analysis {
    pub const ALL: [Analysis; 5] = [
        Analysis::CasesVsDensity,
        Analysis::DeathsVsDensity,
        Analysis::DeathsVsCases,
        Analysis::PerMillion,
        Analysis::DeathsVsAge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Analysis::CasesVsDensity => "cases_vs_density",
            Analysis::DeathsVsDensity => "deaths_vs_density",
            Analysis::DeathsVsCases => "deaths_vs_cases",
            Analysis::PerMillion => "per_million",
            Analysis::DeathsVsAge => "deaths_vs_age",
        }
    }

    /// (x, y) column names.
    pub fn columns(self) -> (&'static str, &'static str) {
        match self {
            Analysis::CasesVsDensity => (POPULATION_DENSITY, TOTAL_CASES),
            Analysis::DeathsVsDensity => (POPULATION_DENSITY, TOTAL_DEATHS),
            Analysis::DeathsVsCases => (TOTAL_CASES, TOTAL_DEATHS),
            Analysis::PerMillion => (TOTAL_CASES_PER_MILLION, TOTAL_DEATHS_PER_MILLION),
            Analysis::DeathsVsAge => (MEDIAN_AGE, TOTAL_DEATHS_PER_MILLION),
        }
    }
}

/// Least-squares fit of y on x.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LinearFit {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Two-sided p-value for the slope coefficient.
    pub p_value: f64,
}

impl LinearFit {
    pub fn is_significant(&self) -> bool {
        self.p_value <= SIGNIFICANCE_THRESHOLD
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Regression result for one named analysis.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionResult {
    pub analysis: Analysis,
    pub x: String,
    pub y: String,
    #[serde(flatten)]
    pub fit: LinearFit,
    pub is_significant: bool,
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Ordinary least squares of `ys` on `xs`.
    ///
    /// Degenerate input (fewer than three points, constant x) yields NaN
    /// fields rather than an error.
    pub fn linear_regression(xs: &[f64], ys: &[f64]) -> LinearFit {
        let n = xs.len().min(ys.len());
        if n == 0 {
            return LinearFit {
                n,
                slope: f64::NAN,
                intercept: f64::NAN,
                r_squared: f64::NAN,
                p_value: f64::NAN,
            };
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let nf = n as f64;

        let mean_x = xs.iter().sum::<f64>() / nf;
        let mean_y = ys.iter().sum::<f64>() / nf;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        let syy: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        let sxy: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = (sxy * sxy) / (sxx * syy);

        let p_value = Self::slope_p_value(slope, sxx, syy - slope * sxy, n);

        LinearFit {
            n,
            slope,
            intercept,
            r_squared,
            p_value,
        }
    }

    /// Two-sided t-test of slope = 0 with n - 2 degrees of freedom.
    fn slope_p_value(slope: f64, sxx: f64, residual_ss: f64, n: usize) -> f64 {
        if n < 3 {
            return f64::NAN;
        }
        let dof = (n - 2) as f64;
        let std_err = (residual_ss.max(0.0) / dof / sxx).sqrt();
        let t = slope / std_err;

        if t.is_nan() {
            return f64::NAN;
        }
        if t.is_infinite() {
            // exact fit
            return 0.0;
        }

        match StudentsT::new(0.0, 1.0, dof) {
            Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
            Err(_) => f64::NAN,
        }
    }

    /// Paired values of two Float64 columns, skipping rows where either is null.
    pub fn paired_values(df: &DataFrame, x: &str, y: &str) -> Result<(Vec<f64>, Vec<f64>)> {
        let xs = df.column(x)?.f64()?;
        let ys = df.column(y)?.f64()?;

        Ok(xs
            .into_iter()
            .zip(ys.into_iter())
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) => Some((x, y)),
                _ => None,
            })
            .unzip())
    }

    /// Fit one named analysis against the per-country table.
    pub fn regress(df: &DataFrame, analysis: Analysis) -> Result<RegressionResult> {
        let (x, y) = analysis.columns();
        let (xs, ys) = Self::paired_values(df, x, y)?;
        let fit = Self::linear_regression(&xs, &ys);

        Ok(RegressionResult {
            analysis,
            x: x.to_string(),
            y: y.to_string(),
            is_significant: fit.is_significant(),
            fit,
        })
    }

    /// Fit every analysis in [`Analysis::ALL`].
    pub fn regress_all(df: &DataFrame) -> Result<Vec<RegressionResult>> {
        Analysis::ALL
            .iter()
            .map(|&analysis| Self::regress(df, analysis))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_recovered() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();

        let fit = StatsCalculator::linear_regression(&xs, &ys);

        assert_eq!(fit.n, 5);
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-6);
        assert!(fit.is_significant());
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_fit_matches_hand_computation() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];

        let fit = StatsCalculator::linear_regression(&xs, &ys);

        assert!((fit.slope - 0.6).abs() < 1e-12);
        assert!((fit.intercept - 2.2).abs() < 1e-12);
        // t = 1.837 on 3 degrees of freedom
        assert!(fit.p_value > 0.15 && fit.p_value < 0.18, "p = {}", fit.p_value);
        assert!(!fit.is_significant());
    }

    #[test]
    fn degenerate_inputs_yield_nan() {
        let constant_x = StatsCalculator::linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(constant_x.slope.is_nan() || constant_x.slope.is_infinite());
        assert!(constant_x.p_value.is_nan());
        assert!(!constant_x.is_significant());

        let two_points = StatsCalculator::linear_regression(&[1.0, 2.0], &[1.0, 3.0]);
        assert!((two_points.slope - 2.0).abs() < 1e-12);
        assert!(two_points.p_value.is_nan());

        let empty = StatsCalculator::linear_regression(&[], &[]);
        assert_eq!(empty.n, 0);
        assert!(empty.slope.is_nan());
    }

    #[test]
    fn regress_skips_rows_with_missing_values() {
        let df = df!(
            POPULATION_DENSITY => [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)],
            TOTAL_CASES => [Some(10.0), Some(20.0), Some(99.0), Some(30.0), Some(40.0)],
        )
        .unwrap();

        let result = StatsCalculator::regress(&df, Analysis::CasesVsDensity).unwrap();

        assert_eq!(result.fit.n, 4);
        assert_eq!(result.x, POPULATION_DENSITY);
        assert!((result.fit.slope - 10.0).abs() < 1e-9);
        assert!(result.is_significant);
    }

    #[test]
    fn missing_analysis_column_is_an_error() {
        let df = df!(TOTAL_CASES => [1.0, 2.0, 3.0]).unwrap();
        assert!(StatsCalculator::regress(&df, Analysis::DeathsVsCases).is_err());
    }
}
