//! Pie chart and legend drawing.
//!
//! Angles are in degrees, clockwise from the positive x axis (SVG's y axis
//! points down). Slices accumulate from 0° and the cumulative angle never
//! exceeds 360°.

use std::f64::consts::PI;
use std::fmt;

use super::canvas::SvgCanvas;
use super::layout::Layout;
use super::palette::{self, NEUTRAL};

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub percentage: f64,
    pub color: &'static str,
}

impl Slice {
    /// Build slices from `(label, percentage)` pairs, coloring by position.
    pub fn from_shares<'a>(shares: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<Slice> {
        shares
            .into_iter()
            .enumerate()
            .map(|(i, (label, percentage))| Slice {
                label: label.to_string(),
                percentage,
                color: palette::color(i),
            })
            .collect()
    }
}

/// Angular extent of one drawn slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceArc {
    /// Position of the slice in the input list
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl SliceArc {
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

/// Slices with no positive share are skipped; once the cumulative angle hits
/// 360° the remaining slices are dropped.
pub fn slice_arcs(slices: &[Slice]) -> Vec<SliceArc> {
    let mut arcs = Vec::with_capacity(slices.len());
    let mut end = 0.0_f64;

    for (index, slice) in slices.iter().enumerate() {
        if !(slice.percentage > 0.0) {
            continue;
        }
        let start = end;
        end = (start + slice.percentage * 360.0 / 100.0).min(360.0);
        if end <= start {
            break;
        }
        arcs.push(SliceArc { index, start, end });
    }

    arcs
}

fn to_radians(degrees: f64) -> f64 {
    PI * degrees / 180.0
}

fn point_on_circle(cx: i64, cy: i64, radius: i64, degrees: f64) -> (i64, i64) {
    let theta = to_radians(degrees);
    (
        cx + (radius as f64 * theta.cos()) as i64,
        cy + (radius as f64 * theta.sin()) as i64,
    )
}

/// Draw a pie centered on `center`. With nothing to draw, a single neutral
/// disc stands in for the chart.
pub fn pie_chart(
    canvas: &mut SvgCanvas,
    center: (i64, i64),
    radius: i64,
    slices: &[Slice],
) -> fmt::Result {
    let (cx, cy) = center;
    let arcs = slice_arcs(slices);

    if arcs.is_empty() {
        return canvas.circle(cx, cy, radius, &format!("fill:#{}", NEUTRAL));
    }

    let mut labels = Vec::with_capacity(arcs.len());
    for arc in &arcs {
        let slice = &slices[arc.index];
        let style = format!("fill:#{}", slice.color);
        let (x1, y1) = point_on_circle(cx, cy, radius, arc.start);

        if arc.sweep() >= 360.0 {
            canvas.circle(cx, cy, radius, &style)?;
        } else {
            let (x2, y2) = point_on_circle(cx, cy, radius, arc.end);
            let large_arc = if arc.sweep() > 180.0 { 1 } else { 0 };
            let d = format!(
                "M{},{} L{},{} A{},{} 0 {},1 {},{} z",
                cx, cy, x1, y1, radius, radius, large_arc, x2, y2
            );
            canvas.path(&d, &style)?;
        }

        labels.push((x1, y1, slice.percentage));
    }

    // Labels after every sector so no slice paints over them
    for (x, y, percentage) in labels {
        canvas.text(
            x,
            y,
            &format!("{:.2}%", percentage),
            Some("fill:white;font-size:20pt;stroke:black;stroke-width:1px"),
        )?;
    }

    Ok(())
}

/// One row of swatch + label per slice, five entries wide.
pub fn legend(
    canvas: &mut SvgCanvas,
    origin: (i64, i64),
    width: i64,
    layout: &Layout,
    slices: &[Slice],
) -> fmt::Result {
    let (x, y) = origin;
    let swatch_radius = (layout.legend_height - layout.legend_padding * 2) / 2;
    let entry_width = (width - layout.legend_padding * 2) / 5;

    canvas.group_style("font-size:10pt;fill:black")?;
    canvas.rect(x, y, width, layout.legend_height, "fill:white")?;

    let cy = y + swatch_radius + layout.legend_padding;
    for (i, slice) in slices.iter().enumerate() {
        let cx = x + swatch_radius + layout.legend_padding + i as i64 * entry_width;
        canvas.circle(cx, cy, swatch_radius, &format!("fill:#{}", slice.color))?;
        canvas.text(cx + swatch_radius + layout.legend_padding, cy, &slice.label, None)?;
    }

    canvas.group_end()
}
