//! Dual-axis line chart rendered to SVG.
//!
//! The first series goes on the left axis, whose floor is pinned at zero and
//! which carries dashed horizontal gridlines. The second series goes on an
//! independently scaled right axis. Both share a date x-axis labelled by year.

use crate::config::{ChartConfig, ConfigError, LineStyle, SeriesStyle};
use chrono::{Datelike, Duration, NaiveDate};
use macroplot_core::data::MergedTable;
use macroplot_core::SeriesId;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

const GRID_COLOR: RGBColor = RGBColor(170, 170, 170);
const GRIDLINE_TARGET: usize = 6;
const MAX_YEAR_LABELS: usize = 20;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("merged table is empty; nothing to plot")]
    EmptyTable,

    #[error("dual-axis chart needs exactly 2 series, got {0}")]
    SeriesCount(usize),

    #[error("merged table has no column for {0}")]
    MissingColumn(SeriesId),

    #[error("values of {0} are too large to fit on a chart axis")]
    Range(SeriesId),

    #[error(transparent)]
    Style(#[from] ConfigError),

    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// Render `table` as a dual-axis chart and write it to `chart.output`.
///
/// An existing file at the output path is overwritten.
pub fn render_chart(
    table: &MergedTable,
    styles: &[SeriesStyle],
    chart: &ChartConfig,
) -> Result<(), ChartError> {
    let [primary, secondary] = styles else {
        return Err(ChartError::SeriesCount(styles.len()));
    };
    if table.is_empty() {
        return Err(ChartError::EmptyTable);
    }

    let primary_points = table.points(primary.id);
    let secondary_points = table.points(secondary.id);
    if primary_points.is_empty() {
        return Err(ChartError::MissingColumn(primary.id));
    }
    if secondary_points.is_empty() {
        return Err(ChartError::MissingColumn(secondary.id));
    }

    let (first, last) = table.date_range().ok_or(ChartError::EmptyTable)?;
    let x_range = date_range(first, last);
    let (_, primary_hi) = table
        .value_range(primary.id)
        .ok_or(ChartError::MissingColumn(primary.id))?;
    let (secondary_lo, secondary_hi) = table
        .value_range(secondary.id)
        .ok_or(ChartError::MissingColumn(secondary.id))?;
    let primary_y = zero_floor_range(primary_hi).ok_or(ChartError::Range(primary.id))?;
    let secondary_y =
        padded_range(secondary_lo, secondary_hi).ok_or(ChartError::Range(secondary.id))?;

    ensure_parent_dir(&chart.output)?;

    let root = SVGBackend::new(&chart.output, (chart.width, chart.height)).into_drawing_area();
    draw(
        &root,
        chart,
        (primary, primary_points),
        (secondary, secondary_points),
        x_range,
        primary_y,
        secondary_y,
    )?;
    root.present().map_err(draw_err)?;

    tracing::debug!(
        path = %chart.output.display(),
        rows = table.len(),
        "chart written"
    );
    Ok(())
}

type Points = Vec<(NaiveDate, f64)>;

fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    chart: &ChartConfig,
    (primary, primary_points): (&SeriesStyle, Points),
    (secondary, secondary_points): (&SeriesStyle, Points),
    x_range: Range<NaiveDate>,
    primary_y: Range<f64>,
    secondary_y: Range<f64>,
) -> Result<(), ChartError> {
    let primary_color = rgb(primary)?;
    let secondary_color = rgb(secondary)?;

    root.fill(&WHITE).map_err(draw_err)?;

    let mut ctx = ChartBuilder::on(root)
        .caption(
            &chart.title,
            ("sans-serif", 22).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .right_y_label_area_size(70)
        .build_cartesian_2d(
            x_range.clone().with_key_points(year_ticks(&x_range)),
            primary_y.clone(),
        )
        .map_err(draw_err)?
        .set_secondary_coord(x_range.clone(), secondary_y);

    ctx.configure_mesh()
        .disable_mesh()
        .x_labels(MAX_YEAR_LABELS)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y").to_string())
        .x_desc(chart.x_label.as_str())
        .y_desc(primary.axis_label.as_str())
        .y_label_style(("sans-serif", 14).into_font().color(&primary_color))
        .axis_desc_style(("sans-serif", 15).into_font().style(FontStyle::Bold))
        .draw()
        .map_err(draw_err)?;

    ctx.configure_secondary_axes()
        .y_desc(secondary.axis_label.as_str())
        .label_style(("sans-serif", 14).into_font().color(&secondary_color))
        .axis_desc_style(("sans-serif", 15).into_font().style(FontStyle::Bold))
        .draw()
        .map_err(draw_err)?;

    for level in gridline_levels(primary_y.end, GRIDLINE_TARGET) {
        ctx.draw_series(DashedLineSeries::new(
            vec![(x_range.start, level), (x_range.end, level)],
            5,
            5,
            GRID_COLOR.mix(0.6).stroke_width(1),
        ))
        .map_err(draw_err)?;
    }

    let primary_style = primary_color.stroke_width(2);
    let primary_anno = match primary.line {
        LineStyle::Solid => ctx
            .draw_series(LineSeries::new(primary_points, primary_style))
            .map_err(draw_err)?,
        LineStyle::Dashed => ctx
            .draw_series(DashedLineSeries::new(primary_points, 8, 5, primary_style))
            .map_err(draw_err)?,
    };
    primary_anno
        .label(primary.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], primary_color.stroke_width(2))
        });

    let secondary_style = secondary_color.stroke_width(2);
    let secondary_anno = match secondary.line {
        LineStyle::Solid => ctx
            .draw_secondary_series(LineSeries::new(secondary_points, secondary_style))
            .map_err(draw_err)?,
        LineStyle::Dashed => ctx
            .draw_secondary_series(DashedLineSeries::new(secondary_points, 8, 5, secondary_style))
            .map_err(draw_err)?,
    };
    secondary_anno
        .label(secondary.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], secondary_color.stroke_width(2))
        });

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

fn rgb(style: &SeriesStyle) -> Result<RGBColor, ChartError> {
    let (r, g, b) = style.rgb()?;
    Ok(RGBColor(r, g, b))
}

fn ensure_parent_dir(path: &Path) -> Result<(), ChartError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|source| ChartError::CreateDir {
                path: parent.display().to_string(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// X range covering `first..=last`; a single date is widened to one day.
fn date_range(first: NaiveDate, last: NaiveDate) -> Range<NaiveDate> {
    if last > first {
        first..last
    } else {
        first..first + Duration::days(1)
    }
}

/// One tick per January 1st inside `range`, thinned to at most
/// `MAX_YEAR_LABELS`. A range that crosses no year boundary gets a single
/// tick at its start.
fn year_ticks(range: &Range<NaiveDate>) -> Vec<NaiveDate> {
    let years: Vec<NaiveDate> = (range.start.year()..=range.end.year())
        .filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .filter(|d| range.start <= *d && *d <= range.end)
        .collect();
    if years.is_empty() {
        return vec![range.start];
    }
    let stride = years.len().div_ceil(MAX_YEAR_LABELS);
    years.into_iter().step_by(stride).collect()
}

/// Y range from zero up to just above `hi`, or `None` if that overflows.
fn zero_floor_range(hi: f64) -> Option<Range<f64>> {
    if hi <= 0.0 {
        return Some(0.0..1.0);
    }
    let top = hi * 1.1;
    top.is_finite().then_some(0.0..top)
}

/// `lo..hi` with 5% headroom on both sides, or `None` if the bounds overflow.
fn padded_range(lo: f64, hi: f64) -> Option<Range<f64>> {
    let span = hi - lo;
    if !span.is_finite() {
        return None;
    }
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    let range = (lo - pad)..(hi + pad);
    (range.start.is_finite() && range.end.is_finite()).then_some(range)
}

/// Round tick spacing (1, 2, or 5 times a power of ten) near `span / target`.
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Gridline positions strictly above zero and below `top`, at most
/// `2 * target` of them.
fn gridline_levels(top: f64, target: usize) -> Vec<f64> {
    if !top.is_finite() || top <= 0.0 {
        return Vec::new();
    }
    let step = nice_step(top, target);
    (1..)
        .map(|i| i as f64 * step)
        .take_while(|level| *level < top)
        .take(target.max(1) * 2)
        .collect()
}
