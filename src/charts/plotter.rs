//! Chart Plotter Module
//! Draws the per-bin bar chart and the log-log size vs installs scatter with plotters.

use crate::stats::BinSummary;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Bar/point colors, one per bin.
pub const PALETTE: [RGBColor; 5] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
];

/// Largest scatter marker radius in pixels; the biggest bin gets this size.
const MAX_RADIUS: f64 = 40.0;
const MIN_RADIUS: f64 = 4.0;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),
    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),
    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
    #[error("Failed to prepare chart output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// A scatter marker for one bin, in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Creates static chart images from bin summaries.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Marker radius for a bin so that marker area tracks app count.
    pub fn marker_radius(count: usize, max_count: usize) -> f64 {
        if max_count == 0 {
            return MIN_RADIUS;
        }
        let scaled = (count as f64 / max_count as f64).sqrt() * MAX_RADIUS;
        scaled.max(MIN_RADIUS)
    }

    /// Scatter markers for bins that can be placed on log axes.
    ///
    /// Bins with a non-positive average size or install count are skipped.
    pub fn scatter_points(summaries: &[BinSummary]) -> Vec<ScatterPoint> {
        let max_count = summaries.iter().map(|s| s.app_count).max().unwrap_or(0);

        summaries
            .iter()
            .filter(|s| s.average_size_mb > 0.0 && s.average_installs > 0.0)
            .map(|s| ScatterPoint {
                label: s.bin.clone(),
                x: s.average_size_mb,
                y: s.average_installs,
                radius: Self::marker_radius(s.app_count, max_count),
            })
            .collect()
    }

    /// Log-scale axis range padded by a factor of two on each side.
    fn log_range(values: impl Iterator<Item = f64>) -> Option<std::ops::Range<f64>> {
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if !min.is_finite() || !max.is_finite() || min <= 0.0 {
            return None;
        }
        Some(min / 2.0..max * 2.0)
    }

    /// Bar chart of average installs per size bin, written as PNG.
    pub fn draw_installs_bar_chart(
        summaries: &[BinSummary],
        output_path: &Path,
        size: (u32, u32),
    ) -> Result<()> {
        if summaries.is_empty() {
            return Err(PlotError::InvalidData("No bins to plot".to_string()));
        }

        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let y_max = summaries
            .iter()
            .map(|s| s.average_installs)
            .fold(0.0, f64::max)
            .max(1.0)
            * 1.1;
        let labels: Vec<&str> = summaries.iter().map(|s| s.bin.as_str()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Average Installs by App Size", ("sans-serif", 36))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(110)
            .build_cartesian_2d((0..summaries.len()).into_segmented(), 0.0..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Size Bin")
            .y_desc("Average Installs")
            .x_labels(labels.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).copied().unwrap_or("").to_string(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(("sans-serif", 18))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        for (i, summary) in summaries.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(color.filled())
                        .margin(30)
                        .data(std::iter::once((i, summary.average_installs))),
                )
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }

        root.present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        Ok(())
    }

    /// Log-log scatter of average size vs average installs, one labeled marker per bin.
    pub fn draw_size_installs_scatter(
        summaries: &[BinSummary],
        output_path: &Path,
        size: (u32, u32),
    ) -> Result<()> {
        let points = Self::scatter_points(summaries);
        let x_range = Self::log_range(points.iter().map(|p| p.x))
            .ok_or_else(|| PlotError::InvalidData("No positive sizes to plot".to_string()))?;
        let y_range = Self::log_range(points.iter().map(|p| p.y))
            .ok_or_else(|| PlotError::InvalidData("No positive installs to plot".to_string()))?;

        let root = BitMapBackend::new(output_path, size).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("App Size vs Installs (per size bin)", ("sans-serif", 36))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(110)
            .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Average Size (MB, log scale)")
            .y_desc("Average Installs (log scale)")
            .x_label_formatter(&|v| format!("{:.1}", v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(("sans-serif", 18))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart
            .draw_series(points.iter().enumerate().map(|(i, p)| {
                let color = PALETTE[i % PALETTE.len()];
                EmptyElement::at((p.x, p.y))
                    + Circle::new((0, 0), p.radius as i32, color.mix(0.6).filled())
                    + Text::new(
                        p.label.clone(),
                        (p.radius as i32 + 4, -8),
                        ("sans-serif", 18).into_font(),
                    )
            }))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        root.present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
        Ok(())
    }
}
