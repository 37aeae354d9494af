//! Core document types.

use std::ops::Range;

/// Result of parsing markdown, ready to be assembled into a `Document`.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Rendered lines for display
    pub lines: Vec<RenderedLine>,
    /// Heading references
    pub headings: Vec<HeadingRef>,
    /// Code blocks awaiting syntax highlighting
    pub code_blocks: Vec<CodeBlockRef>,
    /// Tables, in document order
    pub tables: Vec<TableRef>,
}

/// A rendered markdown document laid out for a given width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Original source text
    source: String,
    /// Width the lines were laid out for
    width: u16,
    lines: Vec<RenderedLine>,
    headings: Vec<HeadingRef>,
    code_blocks: Vec<CodeBlockRef>,
    tables: Vec<TableRef>,
}

impl Document {
    /// Create an empty document.
    pub const fn empty() -> Self {
        Self {
            source: String::new(),
            width: 0,
            lines: Vec::new(),
            headings: Vec::new(),
            code_blocks: Vec::new(),
            tables: Vec::new(),
        }
    }

    /// Create a new document from parsed results.
    pub(crate) fn from_parsed(source: String, width: u16, result: ParsedDocument) -> Self {
        Self {
            source,
            width,
            lines: result.lines,
            headings: result.headings,
            code_blocks: result.code_blocks,
            tables: result.tables,
        }
    }

    /// Get the total number of rendered lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    pub fn code_blocks(&self) -> &[CodeBlockRef] {
        &self.code_blocks
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get visible lines for rendering.
    ///
    /// Returns lines from `offset` to `offset + count`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// Get a specific rendered line by index.
    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// The table whose scroll region contains `line`, if any.
    pub fn scroll_region_at(&self, line: usize) -> Option<&TableRef> {
        self.tables
            .iter()
            .find(|table| table.scroll_wrapped && table.line_range.contains(&line))
    }

    /// Widest scrollable table, in columns.
    pub fn widest_scroll_region(&self) -> usize {
        self.tables
            .iter()
            .filter(|table| table.scroll_wrapped)
            .map(|table| table.width)
            .max()
            .unwrap_or(0)
    }

    /// Put every table that is not already in a scroll region into one.
    ///
    /// Returns how many tables were newly wrapped; a second call returns 0.
    pub fn wrap_tables(&mut self) -> usize {
        let mut wrapped = 0;
        for table in &mut self.tables {
            if table.scroll_wrapped {
                continue;
            }
            table.scroll_wrapped = true;
            wrapped += 1;
        }
        wrapped
    }

    /// Replace the body lines of code block `index` with highlighted spans.
    ///
    /// `highlighted` holds one span list per raw source line of the block.
    pub fn apply_code_highlight(&mut self, index: usize, highlighted: Vec<Vec<InlineSpan>>) {
        let Some(block) = self.code_blocks.get(index) else {
            return;
        };
        for (line_idx, spans) in block.line_range.clone().zip(highlighted) {
            let Some(line) = self.lines.get_mut(line_idx) else {
                break;
            };
            let trimmed = truncate_spans_to_chars(&spans, block.content_width);
            let trimmed_len = spans_char_len(&trimmed);
            let padding = " ".repeat(block.content_width.saturating_sub(trimmed_len) + 1);

            let mut line_spans = Vec::with_capacity(trimmed.len() + 2);
            line_spans.push(InlineSpan::new("│ ".to_string(), InlineStyle::default()));
            line_spans.extend(trimmed);
            line_spans.push(InlineSpan::new(
                format!("{padding}│"),
                InlineStyle::default(),
            ));
            *line = RenderedLine::with_spans(spans_to_string(&line_spans), LineType::CodeBlock, line_spans);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

/// A fenced or indented code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockRef {
    /// Rendered lines holding the block body (frame lines excluded)
    pub line_range: Range<usize>,
    pub language: Option<String>,
    pub raw_lines: Vec<String>,
    pub content_width: usize,
}

/// A table and its scroll region state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub line_range: Range<usize>,
    /// Natural width of the widest row, in columns
    pub width: usize,
    /// Whether the table sits in a horizontal scroll region
    pub scroll_wrapped: bool,
}

/// A single rendered line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The text content of the line
    content: String,
    /// The type of line (for styling)
    line_type: LineType,
    /// Optional inline-styled spans for rendering
    spans: Vec<InlineSpan>,
}

impl RenderedLine {
    /// Create a new rendered line.
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
        }
    }

    /// Create a new rendered line with inline spans.
    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans,
        }
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the line type.
    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub fg: Option<InlineColor>,
}

/// RGB color for inline styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A styled inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Code block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row or border
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Empty line
    Empty,
}

/// Reference to a heading in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    /// Heading level (1-6)
    pub level: u8,
    /// Heading text (plain, no formatting)
    pub text: String,
    /// Line number in rendered document
    pub line: usize,
}

pub(crate) fn spans_to_string(spans: &[InlineSpan]) -> String {
    let mut content = String::new();
    for span in spans {
        content.push_str(span.text());
    }
    content
}

fn spans_char_len(spans: &[InlineSpan]) -> usize {
    spans.iter().map(|s| s.text().chars().count()).sum()
}

pub(crate) fn truncate_spans_to_chars(spans: &[InlineSpan], max_len: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_len;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken: String = span.text().chars().take(remaining).collect();
        let count = taken.chars().count();
        if count > 0 {
            out.push(InlineSpan::new(taken, span.style()));
            remaining -= count;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_lines(lines: Vec<RenderedLine>) -> Document {
        Document::from_parsed(
            "source".to_string(),
            80,
            ParsedDocument {
                lines,
                ..ParsedDocument::default()
            },
        )
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert_eq!(doc.line_count(), 0);
        assert!(doc.headings().is_empty());
    }

    #[test]
    fn test_visible_lines() {
        let lines = (1..=5)
            .map(|i| RenderedLine::new(format!("Line {i}"), LineType::Paragraph))
            .collect();
        let doc = doc_with_lines(lines);

        let visible = doc.visible_lines(1, 2);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content(), "Line 2");
        assert_eq!(visible[1].content(), "Line 3");
    }

    #[test]
    fn test_visible_lines_beyond_end() {
        let lines = vec![
            RenderedLine::new("Line 1".to_string(), LineType::Paragraph),
            RenderedLine::new("Line 2".to_string(), LineType::Paragraph),
        ];
        let doc = doc_with_lines(lines);
        assert_eq!(doc.visible_lines(0, 10).len(), 2);
    }

    #[test]
    fn test_wrap_tables_is_idempotent() {
        let mut doc = Document::from_parsed(
            String::new(),
            80,
            ParsedDocument {
                lines: vec![RenderedLine::new("| a |".to_string(), LineType::Table); 3],
                tables: vec![
                    TableRef {
                        line_range: 0..2,
                        width: 120,
                        scroll_wrapped: false,
                    },
                    TableRef {
                        line_range: 2..3,
                        width: 10,
                        scroll_wrapped: true,
                    },
                ],
                ..ParsedDocument::default()
            },
        );
        assert_eq!(doc.wrap_tables(), 1);
        assert_eq!(doc.wrap_tables(), 0);
        assert!(doc.tables().iter().all(|t| t.scroll_wrapped));
        assert_eq!(doc.scroll_region_at(1).map(|t| t.width), Some(120));
        assert_eq!(doc.widest_scroll_region(), 120);
    }

    #[test]
    fn test_truncate_spans_respects_limit() {
        let spans = vec![
            InlineSpan::new("abc".to_string(), InlineStyle::default()),
            InlineSpan::new("def".to_string(), InlineStyle::default()),
        ];
        let out = truncate_spans_to_chars(&spans, 4);
        assert_eq!(spans_to_string(&out), "abcd");
    }
}
