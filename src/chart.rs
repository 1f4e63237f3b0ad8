//! Chart models and their rendering with [`plotters`].
//!
//! The analysis routines build a [`Chart`]; this module knows nothing about
//! the datasets. Output is a PNG (bitmap backend) or an SVG file.

use std::fmt;
use std::fs;
use std::ops::Range;
use std::path::Path;

use chrono::{Datelike, Days, Months, NaiveDate};
use clap::ValueEnum;
use log::debug;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::LinearFit;

pub const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Series colors, in order of use.
pub const PALETTE: [RGBColor; 5] = [BLUE, ORANGE, GREEN, MAGENTA, CYAN];

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("failed to create output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        ChartSize {
            width: 1024,
            height: 768,
        }
    }
}

impl From<ChartSize> for (u32, u32) {
    fn from(size: ChartSize) -> Self {
        (size.width, size.height)
    }
}

#[derive(Clone, Debug)]
pub struct BarSeries {
    pub label: String,
    pub color: RGBColor,
    /// One value per category; `None` leaves a gap.
    pub values: Vec<Option<f64>>,
}

/// Grouped bar chart: one bar per series inside every category.
#[derive(Clone, Debug)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
    pub bar_width: f64,
    pub y_range: Range<f64>,
}

#[derive(Clone, Debug)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub points_label: String,
    /// Re-drawn on top of `points` in red.
    pub highlighted: Vec<(f64, f64)>,
    pub highlighted_label: String,
    pub fit: Option<LinearFit>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

#[derive(Clone, Debug)]
pub struct TimeSeriesChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(NaiveDate, f64)>,
    /// Regression line evaluated per row.
    pub trend: Vec<(NaiveDate, f64)>,
    pub y_range: Range<f64>,
}

#[derive(Clone, Debug)]
pub enum Chart {
    Bar(BarChart),
    Scatter(ScatterChart),
    TimeSeries(TimeSeriesChart),
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::Bar(c) => &c.title,
            Chart::Scatter(c) => &c.title,
            Chart::TimeSeries(c) => &c.title,
        }
    }

    /// Draw onto any plotters drawing area.
    pub fn draw<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        area.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;
        match self {
            Chart::Bar(c) => draw_bar(c, area),
            Chart::Scatter(c) => draw_scatter(c, area),
            Chart::TimeSeries(c) => draw_time_series(c, area),
        }
    }
}

/// Render `chart` to `path`, creating the parent directory if needed.
pub fn render(chart: &Chart, path: &Path, format: OutputFormat, size: ChartSize) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    debug!("rendering '{}' to {}", chart.title(), path.display());

    match format {
        OutputFormat::Png => {
            let area = BitMapBackend::new(path, size.into()).into_drawing_area();
            chart.draw(&area)?;
            area.present()
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }
        OutputFormat::Svg => {
            let area = SVGBackend::new(path, size.into()).into_drawing_area();
            chart.draw(&area)?;
            area.present()
                .map_err(|e| PlotError::Drawing(e.to_string()))?;
        }
    }
    Ok(())
}

/// Horizontal extent of the bar for `series` within `category`. Bars are
/// centred on `category + series * bar_width`.
pub fn bar_span(category: usize, series: usize, bar_width: f64) -> (f64, f64) {
    let centre = category as f64 + series as f64 * bar_width;
    (centre - bar_width / 2.0, centre + bar_width / 2.0)
}

/// Where the tick for `category` sits: under the middle of its bar group.
pub fn group_centre(category: usize, series_count: usize, bar_width: f64) -> f64 {
    category as f64 + series_count.saturating_sub(1) as f64 * bar_width / 2.0
}

/// Tick positions for a bar chart: one per category group.
pub fn group_centres(category_count: usize, series_count: usize, bar_width: f64) -> Vec<f64> {
    (0..category_count)
        .map(|c| group_centre(c, series_count, bar_width))
        .collect()
}

/// Label for an axis position if it falls on a group centre.
pub fn category_at<'a>(
    x: f64,
    categories: &'a [String],
    series_count: usize,
    bar_width: f64,
) -> Option<&'a str> {
    categories
        .iter()
        .enumerate()
        .find(|(i, _)| (group_centre(*i, series_count, bar_width) - x).abs() < 1e-3)
        .map(|(_, label)| label.as_str())
}

/// The part of `fit` lying over `x_extent` that is visible in the plot
/// window, as its two end points.
pub fn visible_segment(
    fit: &LinearFit,
    x_extent: (f64, f64),
    x_range: &Range<f64>,
    y_range: &Range<f64>,
) -> Option<[(f64, f64); 2]> {
    let mut lo = x_extent.0.max(x_range.start);
    let mut hi = x_extent.1.min(x_range.end);

    if fit.slope == 0.0 {
        if !y_range.contains(&fit.intercept) {
            return None;
        }
    } else {
        let a = (y_range.start - fit.intercept) / fit.slope;
        let b = (y_range.end - fit.intercept) / fit.slope;
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }

    if lo > hi {
        return None;
    }
    Some([(lo, fit.predict(lo)), (hi, fit.predict(hi))])
}

/// At most this many labelled ticks on a date axis.
const MAX_DATE_TICKS: usize = 12;

/// Tick dates for a time axis and the `strftime` format to label them with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateAxis {
    pub ticks: Vec<NaiveDate>,
    pub format: &'static str,
}

/// Year boundaries for spans over two years, month starts for shorter
/// ones, and the end points when no month starts fall inside the span.
/// Ticks are thinned to `MAX_DATE_TICKS` so no label repeats.
pub fn date_axis(start: NaiveDate, end: NaiveDate) -> DateAxis {
    let (candidates, format) = if (end - start).num_days() > 730 {
        let years = (start.year()..=end.year())
            .filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            .filter(|d| *d >= start && *d <= end)
            .collect::<Vec<_>>();
        (years, "%Y")
    } else {
        let mut months = Vec::new();
        let mut month = NaiveDate::from_ymd_opt(start.year(), start.month(), 1);
        while let Some(d) = month {
            if d > end {
                break;
            }
            if d >= start {
                months.push(d);
            }
            month = d.checked_add_months(Months::new(1));
        }
        (months, "%b %Y")
    };

    if candidates.is_empty() {
        let mut ticks = vec![start];
        if end != start {
            ticks.push(end);
        }
        return DateAxis {
            ticks,
            format: "%d %b %Y",
        };
    }

    let step = candidates.len().div_ceil(MAX_DATE_TICKS);
    DateAxis {
        ticks: candidates.into_iter().step_by(step).collect(),
        format,
    }
}

/// Pass-through axis that only opts into plotters' default value formatting,
/// so `configure_mesh` accepts a key-pointed `f64` axis.
struct DefaultFormatted<R>(R);

impl<R: Ranged> Ranged for DefaultFormatted<R> {
    type FormatOption = plotters::coord::ranged1d::DefaultFormatting;
    type ValueType = R::ValueType;

    fn map(&self, value: &Self::ValueType, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: plotters::coord::ranged1d::KeyPointHint>(
        &self,
        hint: Hint,
    ) -> Vec<Self::ValueType> {
        self.0.key_points(hint)
    }

    fn range(&self) -> Range<Self::ValueType> {
        self.0.range()
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

fn draw_bar<DB: DrawingBackend>(chart: &BarChart, area: &DrawingArea<DB, Shift>) -> Result<()> {
    if chart.categories.is_empty() || chart.series.is_empty() {
        return Err(PlotError::InvalidData("bar chart has no bars".to_string()));
    }
    let series_count = chart.series.len();
    let last = chart.categories.len() - 1;
    let x_range = bar_span(0, 0, chart.bar_width).0 - 0.2
        ..bar_span(last, series_count - 1, chart.bar_width).1 + 0.2;

    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(
            DefaultFormatted(x_range.with_key_points(group_centres(
                chart.categories.len(),
                series_count,
                chart.bar_width,
            ))),
            chart.y_range.clone(),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let label_for = |x: &f64| {
        category_at(*x, &chart.categories, series_count, chart.bar_width)
            .unwrap_or_default()
            .to_string()
    };
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&label_for)
        .y_desc(chart.y_label.as_str())
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for (s, series) in chart.series.iter().enumerate() {
        let color = series.color;
        let bars = series.values.iter().enumerate().filter_map(|(c, value)| {
            value.map(|v| {
                let (left, right) = bar_span(c, s, chart.bar_width);
                Rectangle::new([(left, 0.0), (right, v)], color.filled())
            })
        });
        ctx.draw_series(bars)
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    chart: &ScatterChart,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(chart.x_range.clone(), chart.y_range.clone())
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let inside = |(x, y): &&(f64, f64)| chart.x_range.contains(x) && chart.y_range.contains(y);
    let hidden = chart.points.iter().filter(|p| !inside(p)).count();
    if hidden > 0 {
        debug!("{} points fall outside the plot window", hidden);
    }

    ctx.draw_series(
        chart.points
            .iter()
            .filter(inside)
            .map(|&p| Circle::new(p, 4, BLUE.filled())),
    )
    .map_err(|e| PlotError::Drawing(e.to_string()))?
    .label(chart.points_label.as_str())
    .legend(|(x, y)| Circle::new((x + 7, y), 4, BLUE.filled()));

    ctx.draw_series(
        chart.highlighted
            .iter()
            .filter(inside)
            .map(|&p| Circle::new(p, 4, RED.filled())),
    )
    .map_err(|e| PlotError::Drawing(e.to_string()))?
    .label(chart.highlighted_label.as_str())
    .legend(|(x, y)| Circle::new((x + 7, y), 4, RED.filled()));

    if let Some(fit) = &chart.fit {
        let xs = chart.points.iter().map(|(x, _)| *x);
        let extent = (
            xs.clone().fold(f64::INFINITY, f64::min),
            xs.fold(f64::NEG_INFINITY, f64::max),
        );
        if let Some(segment) = visible_segment(fit, extent, &chart.x_range, &chart.y_range) {
            ctx.draw_series(LineSeries::new(segment, ORANGE.stroke_width(2)))
                .map_err(|e| PlotError::Drawing(e.to_string()))?
                .label("Regression Line")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], ORANGE.stroke_width(2)));
        }
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

fn draw_time_series<DB: DrawingBackend>(
    chart: &TimeSeriesChart,
    area: &DrawingArea<DB, Shift>,
) -> Result<()> {
    let (first, last) = match (chart.points.first(), chart.points.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => return Err(PlotError::InvalidData("time series is empty".to_string())),
    };
    let start = first.min(last);
    let mut end = first.max(last);
    if start == end {
        end = end.checked_add_days(Days::new(1)).unwrap_or(end);
    }
    let axis = date_axis(start, end);

    let mut ctx = ChartBuilder::on(area)
        .caption(&chart.title, ("sans-serif", 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (start..end).with_key_points(axis.ticks.clone()),
            chart.y_range.clone(),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&|d: &NaiveDate| d.format(axis.format).to_string())
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    ctx.draw_series(LineSeries::new(chart.points.iter().copied(), &BLUE))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    if !chart.trend.is_empty() {
        ctx.draw_series(LineSeries::new(chart.trend.iter().copied(), ORANGE.stroke_width(2)))
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label("Regression Line")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], ORANGE.stroke_width(2)));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}
