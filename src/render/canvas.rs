//! Minimal SVG writer. Integer coordinates, one element per line.

use std::fmt::{self, Write};

pub struct SvgCanvas {
    out: String,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(8 * 1024),
        }
    }

    pub fn start(&mut self, width: i64, height: i64) -> fmt::Result {
        writeln!(self.out, r#"<?xml version="1.0"?>"#)?;
        writeln!(
            self.out,
            r#"<svg width="{}" height="{}" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
            width, height
        )
    }

    pub fn title(&mut self, title: &str) -> fmt::Result {
        writeln!(self.out, "<title>{}</title>", Escaped(title))
    }

    pub fn rect(&mut self, x: i64, y: i64, width: i64, height: i64, style: &str) -> fmt::Result {
        writeln!(
            self.out,
            r#"<rect x="{}" y="{}" width="{}" height="{}" style="{}" />"#,
            x, y, width, height, Escaped(style)
        )
    }

    pub fn circle(&mut self, cx: i64, cy: i64, r: i64, style: &str) -> fmt::Result {
        writeln!(
            self.out,
            r#"<circle cx="{}" cy="{}" r="{}" style="{}" />"#,
            cx, cy, r, Escaped(style)
        )
    }

    pub fn path(&mut self, d: &str, style: &str) -> fmt::Result {
        writeln!(self.out, r#"<path d="{}" style="{}" />"#, d, Escaped(style))
    }

    pub fn text(&mut self, x: i64, y: i64, text: &str, style: Option<&str>) -> fmt::Result {
        match style {
            Some(style) => writeln!(
                self.out,
                r#"<text x="{}" y="{}" style="{}">{}</text>"#,
                x, y, Escaped(style), Escaped(text)
            ),
            None => writeln!(self.out, r#"<text x="{}" y="{}">{}</text>"#, x, y, Escaped(text)),
        }
    }

    /// Open a `<g>` whose style applies to every child until `group_end`.
    pub fn group_style(&mut self, style: &str) -> fmt::Result {
        writeln!(self.out, r#"<g style="{}">"#, Escaped(style))
    }

    pub fn group_end(&mut self) -> fmt::Result {
        writeln!(self.out, "</g>")
    }

    pub fn end(&mut self) -> fmt::Result {
        writeln!(self.out, "</svg>")
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// XML escaping for text nodes and attribute values.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                _ => f.write_char(c)?,
            }
        }
        Ok(())
    }
}
