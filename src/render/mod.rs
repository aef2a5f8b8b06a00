//! Renderer: frozen `Stats` in, SVG document out.
//!
//! Pure and deterministic: the output depends only on the stats and the
//! layout, so two renders of the same snapshot are byte-identical.

pub mod canvas;
pub mod layout;
pub mod palette;
pub mod pie;

pub use canvas::SvgCanvas;
pub use layout::{Cell, Layout};
pub use pie::{legend, pie_chart, slice_arcs, Slice, SliceArc};

use crate::error::RenderError;
use crate::stats::Stats;

pub const CONTENT_TYPE: &str = "image/svg+xml";

/// What a grid cell hosts, in reading order (left to right, top to bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    KeyStatus,
    SpaceUsage,
    /// Reserved for future metrics, drawn as a filled box
    Placeholder,
}

impl Panel {
    pub fn at(index: i64) -> Self {
        match index {
            0 => Panel::KeyStatus,
            1 => Panel::SpaceUsage,
            _ => Panel::Placeholder,
        }
    }
}

pub fn render(stats: &Stats, layout: &Layout) -> Result<String, RenderError> {
    layout.validate()?;

    let mut canvas = SvgCanvas::new();
    canvas.start(layout.width, layout.height)?;
    canvas.title("RDB statistics")?;
    canvas.rect(0, 0, layout.width, layout.height, "fill:none;stroke:black;stroke-width:3")?;

    banner(&mut canvas, stats, layout)?;

    for row in 0..layout.rows {
        for column in 0..layout.columns {
            let cell = layout.cell(column, row);
            match Panel::at(row * layout.columns + column) {
                Panel::KeyStatus => {
                    pie_panel(&mut canvas, layout, &cell, "keys status", &key_status_slices(stats))?
                }
                Panel::SpaceUsage => {
                    pie_panel(&mut canvas, layout, &cell, "space usage", &space_usage_slices(stats))?
                }
                Panel::Placeholder => {
                    canvas.rect(cell.x, cell.y, cell.width, cell.height, "fill:blue")?
                }
            }
        }
    }

    canvas.end()?;
    Ok(canvas.finish())
}

pub fn key_status_slices(stats: &Stats) -> Vec<Slice> {
    Slice::from_shares([
        ("expired", stats.keys.expired_proportion()),
        ("expiring", stats.keys.expiring_proportion()),
        ("normal", stats.keys.normal_proportion()),
    ])
}

pub fn space_usage_slices(stats: &Stats) -> Vec<Slice> {
    let usage = stats.space_usage();
    Slice::from_shares([
        ("strings", usage.strings),
        ("lists", usage.lists),
        ("sets", usage.sets),
        ("hashes", usage.hashes),
        ("zsets", usage.sorted_sets),
    ])
}

/// Two rows of `"<Label>: <count>"` counters spanning the canvas width.
fn banner(canvas: &mut SvgCanvas, stats: &Stats, layout: &Layout) -> Result<(), RenderError> {
    canvas.rect(
        layout.margin,
        layout.margin,
        layout.width - layout.margin * 2,
        layout.banner_height,
        "fill:black",
    )?;
    canvas.group_style(&format!(
        "font-family:Calibri,sans-serif;font-size:{}pt;fill:white",
        layout.font_size
    ))?;

    let x = layout.margin + layout.text_padding;
    let column = layout.banner_column_width();

    let first_row = [
        format!("Databases: {}", stats.database.count),
        format!("Keys: {}", stats.keys.count),
        format!("Strings: {}", stats.strings.count),
    ];
    let y = layout.margin + layout.text_padding + layout.font_size;
    for (i, label) in first_row.iter().enumerate() {
        canvas.text(x + column * i as i64, y, label, None)?;
    }

    let second_row = [
        format!("Lists: {}", stats.lists.count),
        format!("Sets: {}", stats.sets.count),
        format!("Hashes: {}", stats.hashes.count),
        format!("Sorted Sets: {}", stats.sorted_sets.count),
    ];
    let y = y + layout.banner_row_height + layout.text_padding;
    for (i, label) in second_row.iter().enumerate() {
        canvas.text(x + column * i as i64, y, label, None)?;
    }

    canvas.group_end()?;
    Ok(())
}

fn pie_panel(
    canvas: &mut SvgCanvas,
    layout: &Layout,
    cell: &Cell,
    title: &str,
    slices: &[Slice],
) -> Result<(), RenderError> {
    canvas.rect(cell.x, cell.y, cell.width, cell.height, "fill:black")?;
    canvas.text(
        cell.x + cell.width / 2,
        cell.y + layout.panel_padding + layout.font_size,
        title,
        Some("fill:white;text-anchor:middle;font-family:Calibri,sans-serif"),
    )?;

    pie_chart(canvas, layout.pie_center(cell), layout.pie_radius(), slices)?;
    legend(canvas, layout.legend_origin(cell), layout.legend_width(), layout, slices)?;
    Ok(())
}
