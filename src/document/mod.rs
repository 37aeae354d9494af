//! Markdown document layout.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Laying it out as styled terminal lines for a given width
//! - Tracking tables and their horizontal scroll regions

mod parser;
mod types;

pub use parser::{parse, parse_with_layout};
pub use types::{
    CodeBlockRef, Document, HeadingRef, InlineColor, InlineSpan, InlineStyle, LineType,
    RenderedLine, TableRef,
};

/// Turns fetched markup into a laid-out document.
pub trait MarkupRenderer {
    fn render(&self, source: &str, width: u16) -> Document;
}

/// GitHub-flavoured markdown via comrak.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkupRenderer for MarkdownRenderer {
    fn render(&self, source: &str, width: u16) -> Document {
        parse_with_layout(source, width)
    }
}

/// Render `source` and put every table in a scroll region.
pub fn render_enhanced(renderer: &dyn MarkupRenderer, source: &str, width: u16) -> Document {
    let mut document = renderer.render(source, width);
    let wrapped = document.wrap_tables();
    if wrapped > 0 {
        tracing::debug!(wrapped, "wrapped tables in scroll regions");
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE_TABLE: &str = "| Name | Description |\n|---|---|\n| alpha | a description far wider than the pane it is shown in |\n";

    #[test]
    fn test_render_enhanced_wraps_every_table() {
        let source = format!("{WIDE_TABLE}\ntext\n\n{WIDE_TABLE}");
        let doc = render_enhanced(&MarkdownRenderer, &source, 40);
        assert_eq!(doc.tables().len(), 2);
        assert!(doc.tables().iter().all(|t| t.scroll_wrapped));
    }

    #[test]
    fn test_enhancing_twice_wraps_nothing_new() {
        let mut doc = render_enhanced(&MarkdownRenderer, WIDE_TABLE, 40);
        assert_eq!(doc.wrap_tables(), 0);
        assert_eq!(doc.tables().len(), 1);
    }

    #[test]
    fn test_document_without_tables_is_untouched() {
        let doc = render_enhanced(&MarkdownRenderer, "# Title\n\nBody", 40);
        assert!(doc.tables().is_empty());
        assert_eq!(doc.widest_scroll_region(), 0);
    }
}
