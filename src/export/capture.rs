//! Rasterising the content pane.
//!
//! A [`PaneSnapshot`] is the full rendered document (not just the visible
//! rows) with colours resolved against the active palette. [`SvgCapture`]
//! lays it out as SVG text and rasterises it with resvg.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use resvg::usvg::fontdb;
use unicode_width::UnicodeWidthStr;

use super::ExportError;
use crate::document::{Document, InlineSpan, LineType, RenderedLine};
use crate::theme::{Palette, Rgb};

/// A styled run of text within one snapshot line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRun {
    pub text: String,
    pub color: Rgb,
    pub bold: bool,
    pub italic: bool,
}

/// The content pane frozen for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSnapshot {
    pub lines: Vec<Vec<SnapshotRun>>,
    pub background: Rgb,
}

impl PaneSnapshot {
    pub fn from_document(document: &Document, palette: &Palette) -> Self {
        let lines = document
            .lines()
            .iter()
            .map(|line| snapshot_line(line, palette))
            .collect();
        Self {
            lines,
            background: palette.background,
        }
    }

    /// Widest line, in terminal columns.
    pub fn columns(&self) -> usize {
        self.lines
            .iter()
            .map(|runs| runs.iter().map(|run| run.text.width()).sum::<usize>())
            .max()
            .unwrap_or(0)
    }
}

fn snapshot_line(line: &RenderedLine, palette: &Palette) -> Vec<SnapshotRun> {
    let (base, bold) = match line.line_type() {
        LineType::Heading(_) => (palette.heading, true),
        LineType::CodeBlock => (palette.code, false),
        LineType::BlockQuote => (palette.quote, false),
        LineType::HorizontalRule => (palette.border, false),
        _ => (palette.foreground, false),
    };
    match line.spans() {
        Some(spans) => spans
            .iter()
            .map(|span| span_run(span, base, bold, palette))
            .collect(),
        None if line.content().is_empty() => Vec::new(),
        None => vec![SnapshotRun {
            text: line.content().to_string(),
            color: base,
            bold,
            italic: false,
        }],
    }
}

fn span_run(span: &InlineSpan, base: Rgb, bold: bool, palette: &Palette) -> SnapshotRun {
    let style = span.style();
    let color = match (style.fg, style.link, style.code) {
        (Some(fg), _, _) => Rgb(fg.r, fg.g, fg.b),
        (None, true, _) => palette.link,
        (None, false, true) => palette.code,
        (None, false, false) => base,
    };
    SnapshotRun {
        text: span.text().to_string(),
        color,
        bold: bold || style.strong,
        italic: style.emphasis,
    }
}

/// Turns a snapshot into a bitmap.
pub trait RegionCapture: Send + Sync {
    /// Capture the whole snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be rasterised.
    fn capture(&self, snapshot: &PaneSnapshot) -> Result<RgbaImage, ExportError>;
}

/// Monospace SVG layout rasterised with resvg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgCapture {
    pub font_size: f32,
    pub cell_width: f32,
    pub line_height: f32,
    pub padding: f32,
    /// Device pixels per layout pixel
    pub scale: f32,
    /// Canvas area limit; long documents are captured at a lower scale.
    pub max_pixels: u64,
}

impl Default for SvgCapture {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            cell_width: 8.4,
            line_height: 20.0,
            padding: 24.0,
            scale: 2.0,
            max_pixels: 24_000_000,
        }
    }
}

impl SvgCapture {
    /// Scale used for a layout of `width` x `height`, lowered from `scale`
    /// when the canvas would exceed `max_pixels`.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn effective_scale(&self, width: f32, height: f32) -> f32 {
        let area = f64::from(width) * f64::from(height);
        if area <= 0.0 {
            return self.scale;
        }
        let limit = (self.max_pixels as f64 / area).sqrt() as f32;
        self.scale.min(limit)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn to_svg(&self, snapshot: &PaneSnapshot) -> String {
        let rows = snapshot.lines.len().max(1);
        let width = self.padding.mul_add(2.0, snapshot.columns().max(1) as f32 * self.cell_width);
        let height = self.padding.mul_add(2.0, rows as f32 * self.line_height);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            snapshot.background.hex()
        );
        let _ = write!(
            svg,
            r#"<g font-family="DejaVu Sans Mono, Menlo, Consolas, monospace" font-size="{}" xml:space="preserve">"#,
            self.font_size
        );
        for (row, runs) in snapshot.lines.iter().enumerate() {
            if runs.is_empty() {
                continue;
            }
            let baseline = (row as f32).mul_add(self.line_height, self.padding) + self.font_size;
            let mut column = 0usize;
            for run in runs {
                let x = (column as f32).mul_add(self.cell_width, self.padding);
                column += run.text.width();
                if run.text.trim().is_empty() {
                    continue;
                }
                let _ = write!(svg, r#"<text x="{x}" y="{baseline}" fill="{}""#, run.color.hex());
                if run.bold {
                    svg.push_str(r#" font-weight="bold""#);
                }
                if run.italic {
                    svg.push_str(r#" font-style="italic""#);
                }
                let _ = write!(svg, ">{}</text>", escape_xml(&run.text));
            }
        }
        svg.push_str("</g></svg>");
        svg
    }
}

impl RegionCapture for SvgCapture {
    fn capture(&self, snapshot: &PaneSnapshot) -> Result<RgbaImage, ExportError> {
        let svg = self.to_svg(snapshot);
        let options = resvg::usvg::Options {
            fontdb: font_database(),
            ..Default::default()
        };
        let tree = resvg::usvg::Tree::from_str(&svg, &options)
            .map_err(|err| ExportError::Capture(err.to_string()))?;
        let size = tree.size();
        let scale = self.effective_scale(size.width(), size.height());

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let width = (size.width() * scale).floor().max(1.0) as u32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let height = (size.height() * scale).floor().max(1.0) as u32;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Capture(format!("cannot allocate a {width}x{height} canvas"))
        })?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        tracing::debug!(width, height, scale, "captured content pane");

        RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| ExportError::Capture("pixmap size mismatch".to_string()))
    }
}

/// System fonts, loaded once per process.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
