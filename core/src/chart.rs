//! SVG chart rendering.
//!
//! Three charts accompany every run: the retention curve over all levels,
//! the same curve capped to the early game, and the per-level drop bars.
//! Each chart is annotated with the version label and selected date.
//! Rendering goes through plotters' SVG backend into an in-memory string.

use crate::{
    config::MetrixConfig,
    dates::{format_date, ReportHeader},
    error::{MetrixError, MetrixResult},
    retention::{RetentionRow, RetentionTable},
};
use plotters::{coord::Shift, prelude::*};
use serde::{Deserialize, Serialize};

const SIZE: (u32, u32) = (800, 480);
const FONT: &str = "sans-serif";

pub const RETENTION_ALL_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
pub const RETENTION_EARLY_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
pub const DROP_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
/// Fill for drop bars at or above `drop_highlight_pct`.
pub const DROP_HIGHLIGHT_COLOR: RGBColor = RGBColor(0xd6, 0x27, 0x28);

type DrawResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    /// File stem used when the chart is exported.
    pub name:  String,
    pub title: String,
    pub svg:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSet {
    pub retention_all:   Chart,
    pub retention_early: Chart,
    pub drop_rate:       Chart,
}

impl ChartSet {
    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        [&self.retention_all, &self.retention_early, &self.drop_rate].into_iter()
    }
}

pub fn render_charts(
    retention: &RetentionTable,
    header: &ReportHeader,
    config: &MetrixConfig,
) -> MetrixResult<ChartSet> {
    let annotation = format!(
        "Version {} · {}",
        header.version_label,
        format_date(header.date_selected, &config.date_format)
    );
    let cap = config.early_chart_level_cap;
    let early_title = format!("Retention Chart (Levels 1-{cap})");

    Ok(ChartSet {
        retention_all: Chart {
            name:  "retention_all".into(),
            title: "Retention Chart (All Levels)".into(),
            svg:   retention_curve_svg(
                "Retention Chart (All Levels)",
                &retention.rows,
                &annotation,
                RETENTION_ALL_COLOR,
            )?,
        },
        retention_early: Chart {
            name:  "retention_early".into(),
            svg:   retention_curve_svg(
                &early_title,
                &retention.up_to_level(cap),
                &annotation,
                RETENTION_EARLY_COLOR,
            )?,
            title: early_title,
        },
        drop_rate: Chart {
            name:  "drop_rate".into(),
            title: "Drop Rate by Level".into(),
            svg:   drop_rate_svg(&retention.rows, &annotation, config.drop_highlight_pct)?,
        },
    })
}

/// Level vs retention %, drawn as a line with point markers.
pub fn retention_curve_svg(
    title: &str,
    rows: &[RetentionRow],
    annotation: &str,
    color: RGBColor,
) -> MetrixResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        draw_retention_curve(&root, title, rows, annotation, color).map_err(chart_error)?;
    }
    Ok(svg)
}

/// Level vs drop %, one bar per level. Bars at or above the threshold are
/// drawn in [`DROP_HIGHLIGHT_COLOR`].
pub fn drop_rate_svg(rows: &[RetentionRow], annotation: &str, threshold: f64) -> MetrixResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, SIZE).into_drawing_area();
        draw_drop_bars(&root, rows, annotation, threshold).map_err(chart_error)?;
    }
    Ok(svg)
}

fn draw_retention_curve(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    rows: &[RetentionRow],
    annotation: &str,
    color: RGBColor,
) -> DrawResult {
    root.fill(&WHITE)?;

    let min_level = rows.iter().map(|r| r.level).min().unwrap_or(0) as f64;
    let max_level = rows.iter().map(|r| r.level).max().unwrap_or(0) as f64;
    let (x_lo, x_hi) = widen(min_level, max_level);
    let max_pct = rows.iter().map(|r| r.retention_pct).fold(100.0_f64, f64::max);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(x_lo..x_hi, 0f64..max_pct * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Level")
        .y_desc("Retention %")
        .draw()?;

    let points: Vec<(f64, f64)> = rows.iter().map(|r| (r.level as f64, r.retention_pct)).collect();
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))?;

    if rows.is_empty() {
        no_data(root)?;
    }
    annotate(root, annotation)?;
    root.present()?;
    Ok(())
}

fn draw_drop_bars(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    rows: &[RetentionRow],
    annotation: &str,
    threshold: f64,
) -> DrawResult {
    root.fill(&WHITE)?;

    let lo = rows.iter().map(|r| r.drop_pct).fold(0.0_f64, f64::min);
    let hi = rows.iter().map(|r| r.drop_pct).fold(threshold, f64::max);
    let (y_lo, y_hi) = widen(lo, hi * 1.05);
    // Bars sit on index slots so sparse levels stay readable.
    let slots = rows.len().max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .caption("Drop Rate by Level", (FONT, 22))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(-0.5f64..slots - 0.5, y_lo..y_hi)?;

    let level_label = |x: &f64| {
        let slot = x.round();
        if (x - slot).abs() > 1e-6 || slot < 0.0 {
            return String::new();
        }
        rows.get(slot as usize).map(|r| r.level.to_string()).unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len().clamp(1, 20))
        .x_label_formatter(&level_label)
        .x_desc("Level")
        .y_desc("Drop %")
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let fill = if r.drop_pct >= threshold { DROP_HIGHLIGHT_COLOR } else { DROP_COLOR };
        let x = i as f64;
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, r.drop_pct)], fill.filled())
    }))?;

    if rows.is_empty() {
        no_data(root)?;
    }
    annotate(root, annotation)?;
    root.present()?;
    Ok(())
}

fn annotate(root: &DrawingArea<SVGBackend<'_>, Shift>, annotation: &str) -> DrawResult {
    let style = (FONT, 13.0).into_font().color(&RGBColor(0x55, 0x55, 0x55));
    root.draw_text(annotation, &style, (16, SIZE.1 as i32 - 18))?;
    Ok(())
}

fn no_data(root: &DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult {
    let style = (FONT, 16.0).into_font().color(&RGBColor(0x88, 0x88, 0x88));
    root.draw_text("No data", &style, (SIZE.0 as i32 / 2 - 28, SIZE.1 as i32 / 2))?;
    Ok(())
}

/// Degenerate ranges get one unit of room either side.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 1.0, lo + 1.0)
    }
}

fn chart_error(e: Box<dyn std::error::Error>) -> MetrixError {
    MetrixError::Chart(e.to_string())
}
