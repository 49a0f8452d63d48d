//! Top-N ranking of summary tables, globally and per continent.

use crate::data::schema::CONTINENT;
use crate::error::Result;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Number of rows kept by the ranker unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 15;

pub struct TopNRanker;

impl TopNRanker {
    fn descending_stable() -> SortMultipleOptions {
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_nulls_last(true)
            .with_maintain_order(true)
    }

    /// The `n` rows with the largest `key`; ties keep their input order.
    pub fn top_n(df: &DataFrame, key: &str, n: usize) -> Result<DataFrame> {
        let top = df
            .clone()
            .lazy()
            .sort_by_exprs([col(key)], Self::descending_stable())
            .limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX))
            .collect()?;
        Ok(top)
    }

    /// Apply [`Self::top_n`] within each continent, continents in ascending order.
    pub fn top_n_by_continent(df: &DataFrame, key: &str, n: usize) -> Result<DataFrame> {
        let continents: BTreeSet<&str> = df
            .column(CONTINENT)?
            .str()?
            .into_iter()
            .flatten()
            .collect();

        let mut ranked: Option<DataFrame> = None;
        for continent in continents {
            let facet = df
                .clone()
                .lazy()
                .filter(col(CONTINENT).eq(lit(continent)))
                .collect()?;
            let top = Self::top_n(&facet, key, n)?;
            ranked = Some(match ranked {
                Some(acc) => acc.vstack(&top)?,
                None => top,
            });
        }

        Ok(ranked.unwrap_or_else(|| df.clear()))
    }
}
