//! Draws a chart document as an SVG string with plotters.

use chrono::{DateTime, Duration, FixedOffset};
use plotters::prelude::*;
use std::ops::Range;

use crate::document::{ChartDocument, ChartKind};
use crate::error::{ChartError, render_err};

const SERIES: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const MARKER_SIZE: i32 = 3;

/// Where each sample landed on the canvas, in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPoint {
    pub x: i32,
    pub y: i32,
}

pub struct RenderedSvg {
    pub svg: String,
    /// One entry per sample, same order as the document.
    pub points: Vec<PlacedPoint>,
}

pub fn draw(doc: &ChartDocument, size: (u32, u32)) -> Result<RenderedSvg, ChartError> {
    let series: Vec<(DateTime<FixedOffset>, f64)> = doc
        .samples
        .iter()
        .map(|s| (s.timestamp, s.response_time))
        .collect();
    let (x_range, y_range) = axis_ranges(&series);

    let mut svg = String::new();
    let points;
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&doc.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(RangedDateTime::from(x_range), y_range)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc(doc.x_label.as_str())
            .y_desc(doc.y_label.as_str())
            .x_labels(8)
            .x_label_formatter(&|t: &DateTime<FixedOffset>| t.format("%m-%d %H:%M:%S").to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.3}"))
            .draw()
            .map_err(render_err)?;

        if doc.kind == ChartKind::Line {
            chart
                .draw_series(LineSeries::new(series.iter().copied(), SERIES.stroke_width(2)))
                .map_err(render_err)?;
        }
        chart
            .draw_series(
                series
                    .iter()
                    .map(|&p| Circle::new(p, MARKER_SIZE, SERIES.filled())),
            )
            .map_err(render_err)?;

        points = series
            .iter()
            .map(|p| {
                let (x, y) = chart.backend_coord(p);
                PlacedPoint { x, y }
            })
            .collect();

        root.present().map_err(render_err)?;
    }

    Ok(RenderedSvg { svg, points })
}

/// Axis ranges with a little headroom. Degenerate spans (one sample, or all
/// samples at the same instant) are widened so the axis stays drawable.
fn axis_ranges(
    series: &[(DateTime<FixedOffset>, f64)],
) -> (Range<DateTime<FixedOffset>>, Range<f64>) {
    let Some(&(first, _)) = series.first() else {
        let now = chrono::Utc::now().fixed_offset();
        return (now - Duration::minutes(1)..now + Duration::minutes(1), 0.0..1.0);
    };

    let (mut t_min, mut t_max) = (first, first);
    let (mut v_min, mut v_max) = (0.0_f64, 0.0_f64);
    for &(t, v) in series {
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        v_min = v_min.min(v);
        v_max = v_max.max(v);
    }

    let pad = Duration::milliseconds(((t_max - t_min).num_milliseconds() / 50).max(1_000));
    let v_max = if v_max > 0.0 { v_max * 1.1 } else { 1.0 };
    let v_min = v_min * 1.1;

    (t_min - pad..t_max + pad, v_min..v_max)
}
