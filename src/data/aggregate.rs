//! Per-country and per-continent summary tables.

use crate::data::schema::{Metric, CONTINENT, LOCATION};
use crate::error::Result;
use polars::prelude::*;

/// Country and continent summaries for both metrics.
#[derive(Debug, Clone)]
pub struct Summaries {
    /// `continent, location, final_cases, final_deaths`
    pub countries: DataFrame,
    /// `continent, final_cases, final_deaths`
    pub continents: DataFrame,
}

pub struct Aggregator;

impl Aggregator {
    /// Max of the metric per (continent, location), ordered by key.
    pub fn country_summary(df: &DataFrame, metric: Metric) -> Result<DataFrame> {
        let summary = df
            .clone()
            .lazy()
            .group_by([col(CONTINENT), col(LOCATION)])
            .agg([col(metric.source_column())
                .max()
                .alias(metric.summary_column())])
            .sort_by_exprs(
                [col(CONTINENT), col(LOCATION)],
                SortMultipleOptions::default(),
            )
            .collect()?;
        Ok(summary)
    }

    /// Sum of per-country values per continent, ordered by continent.
    pub fn continent_summary(country_summary: &DataFrame, metric: Metric) -> Result<DataFrame> {
        let summary = country_summary
            .clone()
            .lazy()
            .group_by([col(CONTINENT)])
            .agg([col(metric.summary_column()).sum()])
            .sort_by_exprs([col(CONTINENT)], SortMultipleOptions::default())
            .collect()?;
        Ok(summary)
    }

    /// Full outer join of the cases and deaths tables on the given keys.
    fn outer_join(cases: &DataFrame, deaths: &DataFrame, keys: &[&str]) -> Result<DataFrame> {
        let on: Vec<Expr> = keys.iter().map(|&k| col(k)).collect();
        let joined = cases
            .clone()
            .lazy()
            .join(
                deaths.clone().lazy(),
                on.clone(),
                on.clone(),
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .sort_by_exprs(on, SortMultipleOptions::default())
            .collect()?;
        Ok(joined)
    }

    /// Run both metric pipelines and combine them.
    pub fn summarize(df: &DataFrame) -> Result<Summaries> {
        let cases_by_country = Self::country_summary(df, Metric::Cases)?;
        let deaths_by_country = Self::country_summary(df, Metric::Deaths)?;

        let cases_by_continent = Self::continent_summary(&cases_by_country, Metric::Cases)?;
        let deaths_by_continent = Self::continent_summary(&deaths_by_country, Metric::Deaths)?;

        Ok(Summaries {
            countries: Self::outer_join(
                &cases_by_country,
                &deaths_by_country,
                &[CONTINENT, LOCATION],
            )?,
            continents: Self::outer_join(&cases_by_continent, &deaths_by_continent, &[CONTINENT])?,
        })
    }
}
