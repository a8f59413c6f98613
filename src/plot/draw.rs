//! Plotters drawing routines for the three chart shapes.
//!
//! Every routine draws into a PNG at `path` and presents it. When `text` is
//! off (no font registered) captions, tick labels and legends are skipped and
//! only the data marks are drawn.

use std::path::Path;

use chrono::Days;
use plotters::coord::Shift;
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::ChartError;
use crate::plot::fonts::FAMILY;
use crate::report::{CategoryValue, DailyTotals};

/// Categorical colours (matplotlib "tab10").
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Pixel size and text availability for one image.
#[derive(Debug, Clone, Copy)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub text: bool,
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Clicks and impressions per day.
pub fn line_chart(path: &Path, title: &str, daily: &[DailyTotals], canvas: Canvas) -> Result<(), ChartError> {
    let first = daily
        .first()
        .map(|d| d.date)
        .ok_or_else(|| ChartError::NothingToPlot("no dated rows".to_string()))?;

    // x = days since the first date, so gaps in the data stay visible.
    let xs: Vec<f64> = daily.iter().map(|d| (d.date - first).num_days() as f64).collect();
    let x_max = xs.last().copied().unwrap_or(0.0);
    let y_max = daily.iter().map(|d| d.clicks.max(d.impressions)).max().unwrap_or(0) as f64;
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let clicks: Vec<(f64, f64)> = xs.iter().zip(daily).map(|(&x, d)| (x, d.clicks as f64)).collect();
    let impressions: Vec<(f64, f64)> = xs
        .iter()
        .zip(daily)
        .map(|(&x, d)| (x, d.impressions as f64))
        .collect();

    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if canvas.text {
        builder
            .caption(title, (FAMILY, 28).into_font())
            .x_label_area_size(60)
            .y_label_area_size(80);
    }
    let mut chart = builder
        .build_cartesian_2d(-0.5..x_max + 0.5, 0.0..y_top)
        .map_err(draw_err)?;

    if canvas.text {
        let date_label = |x: &f64| -> String {
            if *x < 0.0 || (x - x.round()).abs() > 1e-6 {
                return String::new();
            }
            first
                .checked_add_days(Days::new(x.round() as u64))
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Count")
            .x_labels(daily.len().clamp(2, 12))
            .x_label_formatter(&date_label)
            .y_label_formatter(&|y: &f64| format!("{y:.0}"))
            .label_style((FAMILY, 14).into_font())
            .draw()
            .map_err(draw_err)?;
    }

    let clicks_color = palette(0);
    let impressions_color = palette(1);

    let series = chart
        .draw_series(LineSeries::new(clicks.iter().copied(), clicks_color.stroke_width(2)))
        .map_err(draw_err)?;
    if canvas.text {
        series
            .label("Clicks")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], clicks_color.stroke_width(2)));
    }
    chart
        .draw_series(clicks.iter().map(|&p| Circle::new(p, 4, clicks_color.filled())))
        .map_err(draw_err)?;

    let series = chart
        .draw_series(LineSeries::new(
            impressions.iter().copied(),
            impressions_color.stroke_width(2),
        ))
        .map_err(draw_err)?;
    if canvas.text {
        series.label("Impressions").legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], impressions_color.stroke_width(2))
        });
    }
    chart
        .draw_series(
            impressions
                .iter()
                .map(|&p| Cross::new(p, 5, impressions_color.stroke_width(2))),
        )
        .map_err(draw_err)?;

    if canvas.text {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FAMILY, 14).into_font())
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Share of a positive measure per category. Non-positive values are dropped;
/// with nothing positive left an empty placeholder pie is drawn.
pub fn pie_chart(
    path: &Path,
    title: &str,
    values: &[CategoryValue],
    fmt_value: fn(f64) -> String,
    canvas: Canvas,
) -> Result<(), ChartError> {
    let slices: Vec<&CategoryValue> = values
        .iter()
        .filter(|v| v.value.is_finite() && v.value > 0.0)
        .collect();
    let total: f64 = slices.iter().map(|v| v.value).sum();

    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    if slices.is_empty() || total <= 0.0 {
        return empty_pie(&root, title, canvas);
    }

    let pie_area = if canvas.text {
        let area = root.titled(title, (FAMILY, 28).into_font()).map_err(draw_err)?;
        let (width, _) = area.dim_in_pixel();
        let (pie_area, legend_area) = area.split_horizontally((width * 3 / 5) as i32);
        draw_legend(&legend_area, &slices, fmt_value)?;
        pie_area
    } else {
        root.clone()
    };

    let (w, h) = pie_area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.4;

    // Start at 12 o'clock and go counter-clockwise.
    let mut start = 90.0_f64;
    for (i, slice) in slices.iter().enumerate() {
        let sweep = 360.0 * slice.value / total;
        pie_area
            .draw(&Polygon::new(wedge(center, radius, start, sweep), palette(i).filled()))
            .map_err(draw_err)?;

        if canvas.text {
            let mid = (start + sweep / 2.0).to_radians();
            let at = (
                center.0 + (radius * 0.65 * mid.cos()).round() as i32,
                center.1 - (radius * 0.65 * mid.sin()).round() as i32,
            );
            let style = (FAMILY, 16)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center));
            pie_area
                .draw(&Text::new(format!("{:.1}%", 100.0 * slice.value / total), at, style))
                .map_err(draw_err)?;
        }
        start += sweep;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn empty_pie(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    canvas: Canvas,
) -> Result<(), ChartError> {
    let area = if canvas.text {
        root.titled(title, (FAMILY, 28).into_font()).map_err(draw_err)?
    } else {
        root.clone()
    };
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (f64::from(w.min(h)) * 0.4) as i32;

    area.draw(&Circle::new(center, radius, palette(7).stroke_width(2)))
        .map_err(draw_err)?;
    if canvas.text {
        let style = (FAMILY, 20)
            .into_font()
            .color(&palette(7))
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new("No positive values", center, style))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    slices: &[&CategoryValue],
    fmt_value: fn(f64) -> String,
) -> Result<(), ChartError> {
    for (i, slice) in slices.iter().enumerate() {
        let y = 40 + 30 * i as i32;
        area.draw(&Rectangle::new([(10, y), (28, y + 18)], palette(i).filled()))
            .map_err(draw_err)?;
        area.draw(&Text::new(
            format!("{} ({})", slice.label, fmt_value(slice.value)),
            (36, y),
            (FAMILY, 16).into_font(),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

/// Polygon approximating a pie wedge, in pixel coordinates (y grows downward).
fn wedge(center: (i32, i32), radius: f64, start_deg: f64, sweep_deg: f64) -> Vec<(i32, i32)> {
    let steps = (sweep_deg.ceil() as usize).max(1);
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for s in 0..=steps {
        let angle = (start_deg + sweep_deg * s as f64 / steps as f64).to_radians();
        points.push((
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 - (radius * angle.sin()).round() as i32,
        ));
    }
    points
}

/// One bar per category, in the given order.
pub fn bar_chart(
    path: &Path,
    title: &str,
    y_desc: &str,
    values: &[CategoryValue],
    fmt_value: fn(f64) -> String,
    canvas: Canvas,
) -> Result<(), ChartError> {
    if values.is_empty() {
        return Err(ChartError::NothingToPlot(format!("no categories for '{title}'")));
    }
    let y_max = values
        .iter()
        .map(|v| v.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let root = BitMapBackend::new(path, (canvas.width, canvas.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if canvas.text {
        builder
            .caption(title, (FAMILY, 28).into_font())
            .x_label_area_size(70)
            .y_label_area_size(80);
    }
    let mut chart = builder
        .build_cartesian_2d((0..values.len()).into_segmented(), 0.0..y_top)
        .map_err(draw_err)?;

    if canvas.text {
        let category_label = |x: &SegmentValue<usize>| -> String {
            match x {
                SegmentValue::CenterOf(i) => values.get(*i).map(|v| v.label.clone()).unwrap_or_default(),
                _ => String::new(),
            }
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc("Ad Group")
            .y_desc(y_desc)
            .x_labels(values.len())
            .x_label_formatter(&category_label)
            .y_label_formatter(&|y: &f64| fmt_value(*y))
            .x_label_style((FAMILY, 12).into_font())
            .y_label_style((FAMILY, 14).into_font())
            .draw()
            .map_err(draw_err)?;
    }

    let bar_color = palette(0);
    chart
        .draw_series(values.iter().enumerate().map(|(i, v)| {
            let top = if v.value.is_finite() { v.value.max(0.0) } else { 0.0 };
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), top)],
                bar_color.filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bar
        }))
        .map_err(draw_err)?;

    if canvas.text {
        let style = (FAMILY, 13)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(values.iter().enumerate().map(|(i, v)| {
                Text::new(
                    fmt_value(v.value),
                    (SegmentValue::CenterOf(i), v.value.max(0.0)),
                    style.clone(),
                )
            }))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}
