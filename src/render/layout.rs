//! Canvas geometry: banner on top, panel grid below.

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: i64,
    pub height: i64,
    /// Top and left margin of the content
    pub margin: i64,

    pub banner_height: i64,
    pub banner_row_height: i64,
    pub text_padding: i64,
    pub font_size: i64,

    pub columns: i64,
    pub rows: i64,
    pub row_margin: i64,
    pub column_spacing: i64,

    pub panel_padding: i64,
    pub title_height: i64,
    pub legend_height: i64,
    pub legend_padding: i64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            margin: 30,
            banner_height: 100,
            banner_row_height: 50,
            text_padding: 10,
            font_size: 16,
            columns: 3,
            rows: 2,
            row_margin: 10,
            column_spacing: 30,
            panel_padding: 10,
            title_height: 50,
            legend_height: 40,
            legend_padding: 5,
        }
    }
}

/// Screen rectangle of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Layout {
    pub fn banner_column_width(&self) -> i64 {
        (self.width - self.margin * 2 - self.text_padding * 2) / 4
    }

    pub fn column_width(&self) -> i64 {
        if self.columns <= 0 {
            return 0;
        }
        (self.width - self.margin * 2 - self.column_spacing * (self.columns - 1)) / self.columns
    }

    pub fn column_height(&self) -> i64 {
        if self.rows <= 0 {
            return 0;
        }
        (self.height - self.margin * 2 - self.banner_height - self.row_margin * self.rows) / self.rows
    }

    pub fn cell(&self, column: i64, row: i64) -> Cell {
        let width = self.column_width();
        let height = self.column_height();
        Cell {
            x: self.margin + column * (width + self.column_spacing),
            y: self.margin + self.banner_height + self.row_margin + row * (height + self.row_margin),
            width,
            height,
        }
    }

    /// Radius of a pie that fits between a cell's title and its legend.
    pub fn pie_radius(&self) -> i64 {
        let (avail_w, avail_h) = self.pie_area();
        avail_w.min(avail_h) / 2
    }

    /// Center of the pie inside `cell`.
    pub fn pie_center(&self, cell: &Cell) -> (i64, i64) {
        let (_, avail_h) = self.pie_area();
        let top = cell.y + self.panel_padding + self.title_height;
        (cell.x + cell.width / 2, top + avail_h / 2)
    }

    pub fn legend_origin(&self, cell: &Cell) -> (i64, i64) {
        (
            cell.x + self.panel_padding,
            cell.y + cell.height - self.legend_height - self.panel_padding,
        )
    }

    pub fn legend_width(&self) -> i64 {
        self.column_width() - self.panel_padding * 2
    }

    fn pie_area(&self) -> (i64, i64) {
        let avail_w = self.column_width() - self.panel_padding * 2;
        let avail_h = self.column_height()
            - self.panel_padding * 3
            - self.title_height
            - self.legend_height;
        (avail_w, avail_h)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.columns < 1 || self.rows < 1 {
            return Err(RenderError::Layout(format!(
                "grid must have at least one column and one row (got {}x{})",
                self.columns, self.rows
            )));
        }
        if self.banner_column_width() <= 0 {
            return Err(RenderError::Layout(format!(
                "canvas width {} leaves no room for the banner",
                self.width
            )));
        }
        if self.column_width() <= 0 || self.column_height() <= 0 {
            return Err(RenderError::Layout(format!(
                "{}x{} canvas is too small for a {}x{} grid",
                self.width, self.height, self.columns, self.rows
            )));
        }
        if self.pie_radius() <= 0 || self.legend_width() <= 0 {
            return Err(RenderError::Layout(format!(
                "cells of {}x{} leave no room for a pie chart",
                self.column_width(),
                self.column_height()
            )));
        }
        Ok(())
    }
}
