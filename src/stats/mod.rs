//! Stats module - regression over the per-country table

mod calculator;

pub use calculator::{Analysis, LinearFit, RegressionResult, StatsCalculator};
