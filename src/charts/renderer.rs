//! Static Chart Renderer
//! Generates PNG charts with plotters.
//!
//! Chart kinds:
//! 1. Bar: one bar per labelled value (top-N countries)
//! 2. Pie: share of each label in the total (continent totals)
//! 3. Scatter: observations with the fitted regression line, slope and
//!    p-value in the caption

use crate::error::{AnalysisError, Result};
use crate::stats::LinearFit;
use plotters::element::Pie;
use plotters::prelude::*;
use std::error::Error;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1200, 800);
const FONT: &str = "sans-serif";

// Colors
const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);
const POINT_COLOR: RGBColor = RGBColor(52, 152, 219);
const FIT_COLOR: RGBColor = RGBColor(237, 125, 49);

const PALETTE: [RGBColor; 6] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(52, 152, 219), // Blue
];

type DrawResult = std::result::Result<(), Box<dyn Error>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Bar chart of `values`, one bar per label, in the given order.
    pub fn render_bar_chart(
        path: &Path,
        title: &str,
        labels: &[String],
        values: &[f64],
    ) -> Result<()> {
        Self::draw_bar_chart(path, title, labels, values).map_err(Self::chart_error)
    }

    /// Pie chart of each label's share of the total.
    pub fn render_pie_chart(
        path: &Path,
        title: &str,
        labels: &[String],
        values: &[f64],
    ) -> Result<()> {
        Self::draw_pie_chart(path, title, labels, values).map_err(Self::chart_error)
    }

    /// Scatter plot with the fitted line.
    pub fn render_scatter(
        path: &Path,
        title: &str,
        axis_labels: (&str, &str),
        points: (&[f64], &[f64]),
        fit: &LinearFit,
    ) -> Result<()> {
        Self::draw_scatter(path, title, axis_labels, points, fit).map_err(Self::chart_error)
    }

    fn chart_error(err: Box<dyn Error>) -> AnalysisError {
        AnalysisError::Chart(err.to_string())
    }

    fn draw_bar_chart(path: &Path, title: &str, labels: &[String], values: &[f64]) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let y_max = values.iter().copied().fold(0.0_f64, f64::max);
        let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption(title, (FONT, 28))
            .margin(20)
            .x_label_area_size(160)
            .y_label_area_size(100)
            .build_cartesian_2d((0..labels.len()).into_segmented(), 0.0..y_max)?;

        let formatter = |v: &SegmentValue<usize>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&formatter)
            .x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(6)
                .data(values.iter().enumerate().map(|(i, &v)| (i, v))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_pie_chart(path: &Path, title: &str, labels: &[String], values: &[f64]) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, (FONT, 28))?;

        let (width, height) = root.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;
        let colors: Vec<RGBColor> = (0..values.len())
            .map(|i| PALETTE[i % PALETTE.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, values, &colors, labels);
        pie.label_style((FONT, 18).into_font());
        pie.percentages((FONT, 14).into_font().color(&WHITE));
        root.draw(&pie)?;

        root.present()?;
        Ok(())
    }

    fn draw_scatter(
        path: &Path,
        title: &str,
        (x_label, y_label): (&str, &str),
        (xs, ys): (&[f64], &[f64]),
        fit: &LinearFit,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = Self::padded_range(xs);
        let (y_min, y_max) = Self::padded_range(ys);
        let caption = format!(
            "{title} (slope = {:.4}, p = {:.4}, n = {})",
            fit.slope, fit.p_value, fit.n
        );

        let mut chart = ChartBuilder::on(&root)
            .caption(caption, (FONT, 24))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(100)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc(x_label)
            .y_desc(y_label)
            .draw()?;

        chart.draw_series(
            xs.iter()
                .zip(ys)
                .map(|(&x, &y)| Circle::new((x, y), 3, POINT_COLOR.mix(0.7).filled())),
        )?;

        if fit.slope.is_finite() && fit.intercept.is_finite() {
            chart.draw_series(LineSeries::new(
                [x_min, x_max].map(|x| (x, fit.predict(x))),
                FIT_COLOR.stroke_width(2),
            ))?;
        }

        root.present()?;
        Ok(())
    }

    /// Data range with 5% padding; falls back to 0..1 for empty input.
    fn padded_range(values: &[f64]) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min.is_infinite() {
            return (0.0, 1.0);
        }
        if min == max {
            return (min - 1.0, max + 1.0);
        }
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}
