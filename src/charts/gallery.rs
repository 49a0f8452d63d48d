//! Renders the full set of charts for one analysis into a directory.

use crate::analysis::CovidAnalysis;
use crate::charts::StaticChartRenderer;
use crate::data::schema::{Metric, LOCATION};
use crate::error::Result;
use crate::stats::StatsCalculator;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct ChartGallery;

impl ChartGallery {
    /// Render every chart, returning the paths written.
    ///
    /// A chart that fails to render is logged and skipped.
    pub fn render_all(analysis: &CovidAnalysis, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        for metric in [Metric::Cases, Metric::Deaths] {
            let path = dir.join(format!("top_{}.png", metric.summary_column()));
            let outcome = Self::top_countries_chart(analysis, metric, &path);
            Self::record(outcome, path, &mut written);
        }

        let path = dir.join("continent_cases_share.png");
        let outcome = Self::continent_pie(analysis, &path);
        Self::record(outcome, path, &mut written);

        for regression in &analysis.regressions {
            let path = dir.join(format!("{}.png", regression.analysis.name()));
            let (x, y) = regression.analysis.columns();
            let outcome =
                StatsCalculator::paired_values(&analysis.latest, x, y).and_then(|(xs, ys)| {
                    StaticChartRenderer::render_scatter(
                        &path,
                        regression.analysis.name(),
                        (x, y),
                        (&xs, &ys),
                        &regression.fit,
                    )
                });
            Self::record(outcome, path, &mut written);
        }

        info!(count = written.len(), dir = %dir.display(), "Charts rendered");
        Ok(written)
    }

    fn record(outcome: Result<()>, path: PathBuf, written: &mut Vec<PathBuf>) {
        match outcome {
            Ok(()) => written.push(path),
            Err(err) => warn!(path = %path.display(), error = %err, "Chart skipped"),
        }
    }

    fn top_countries_chart(analysis: &CovidAnalysis, metric: Metric, path: &Path) -> Result<()> {
        let top = &analysis.rankings(metric).global;
        let labels: Vec<String> = top
            .column(LOCATION)?
            .str()?
            .into_iter()
            .map(|l| l.unwrap_or_default().to_string())
            .collect();
        let values: Vec<f64> = top
            .column(metric.summary_column())?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let title = format!("Top {} countries by {}", labels.len(), metric.summary_column());
        StaticChartRenderer::render_bar_chart(path, &title, &labels, &values)
    }

    fn continent_pie(analysis: &CovidAnalysis, path: &Path) -> Result<()> {
        let (labels, values): (Vec<String>, Vec<f64>) = analysis
            .continent_totals()?
            .into_iter()
            .map(|(continent, cases, _)| (continent, cases.unwrap_or(0.0)))
            .unzip();
        StaticChartRenderer::render_pie_chart(path, "Share of cases by continent", &labels, &values)
    }
}
