//! Markdown layout with comrak.
//!
//! The AST is walked once and flattened into terminal lines. Paragraphs,
//! lists and quotes wrap to the layout width; tables keep their natural
//! width so they can be scrolled horizontally.

use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{
    CodeBlockRef, Document, HeadingRef, InlineSpan, InlineStyle, LineType, ParsedDocument,
    RenderedLine, TableRef, spans_to_string, truncate_spans_to_chars,
};

/// Columns reserved on the right of a code block body.
const CODE_RIGHT_PADDING: usize = 1;

/// Lay out markdown for an 80 column pane.
pub fn parse(source: &str) -> Document {
    parse_with_layout(source, 80)
}

/// Lay out markdown for a pane `width` columns wide.
pub fn parse_with_layout(source: &str, width: u16) -> Document {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;

    let arena = Arena::new();
    let root = parse_document(&arena, source, &options);

    let mut builder = LineBuilder::new(usize::from(width.max(1)));
    builder.visit(root, 0, None);
    tracing::trace!(
        lines = builder.out.lines.len(),
        tables = builder.out.tables.len(),
        "laid out document"
    );
    Document::from_parsed(source.to_string(), width, builder.out)
}

struct LineBuilder {
    wrap_width: usize,
    out: ParsedDocument,
}

impl LineBuilder {
    fn new(wrap_width: usize) -> Self {
        Self {
            wrap_width,
            out: ParsedDocument::default(),
        }
    }

    fn push(&mut self, content: String, line_type: LineType) {
        self.out.lines.push(RenderedLine::new(content, line_type));
    }

    fn blank(&mut self) {
        self.push(String::new(), LineType::Empty);
    }

    fn push_wrapped(
        &mut self,
        spans: &[InlineSpan],
        prefix_first: &str,
        prefix_next: &str,
        line_type: LineType,
    ) {
        for line_spans in wrap_spans(spans, self.wrap_width, prefix_first, prefix_next) {
            let content = spans_to_string(&line_spans);
            self.out
                .lines
                .push(RenderedLine::with_spans(content, line_type, line_spans));
        }
    }

    fn visit<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, list_marker: Option<&str>) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => self.heading(node, heading.level),
            NodeValue::Paragraph => {
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, "", "", LineType::Paragraph);
                self.blank();
            }
            NodeValue::CodeBlock(block) => {
                let language = block
                    .info
                    .split_whitespace()
                    .next()
                    .map(ToString::to_string);
                self.code_block(language, &block.literal);
            }
            NodeValue::List(list) => {
                let markers = list_markers(list.list_type, list.start, list.delimiter, node.children().count());
                for (child, marker) in node.children().zip(markers) {
                    self.visit(child, depth + 1, Some(&marker));
                }
                if depth == 0 {
                    self.blank();
                }
            }
            NodeValue::Item(_) => self.list_item(node, depth, list_marker.unwrap_or("• ")),
            NodeValue::TaskItem(symbol) => {
                let marker = if symbol.is_some() { "✓ " } else { "□ " };
                self.list_item(node, depth, marker);
            }
            NodeValue::BlockQuote => {
                self.blockquote(node, 1);
                self.blank();
            }
            NodeValue::ThematicBreak => {
                self.push("─".repeat(self.wrap_width.min(40)), LineType::HorizontalRule);
                self.blank();
            }
            NodeValue::Table(_) => {
                self.table(node);
                self.blank();
            }
            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let continuation = " ".repeat(label.width());
                let spans = collect_inline_spans(node);
                self.push_wrapped(&spans, &label, &continuation, LineType::Paragraph);
                self.blank();
            }
            NodeValue::HtmlBlock(html) => {
                for raw in html.literal.lines() {
                    self.push(raw.to_string(), LineType::Paragraph);
                }
                self.blank();
            }
            _ => {
                for child in node.children() {
                    self.visit(child, depth, list_marker);
                }
            }
        }
    }

    fn heading<'a>(&mut self, node: &'a AstNode<'a>, level: u8) {
        let text = extract_text(node);
        ensure_trailing_empty_lines(&mut self.out.lines, 1);
        self.out.headings.push(HeadingRef {
            level,
            text: text.clone(),
            line: self.out.lines.len(),
        });
        let prefix = "#".repeat(usize::from(level));
        self.push(format!("{prefix} {text}"), LineType::Heading(level));
        self.blank();
    }

    fn code_block(&mut self, language: Option<String>, literal: &str) {
        let raw_lines: Vec<String> = literal.lines().map(ToString::to_string).collect();
        let content_width = raw_lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            .min(self.wrap_width.saturating_sub(4).max(1));

        let title = format!(" {} ", language.as_deref().unwrap_or("code"));
        let inner_width = content_width + 1 + CODE_RIGHT_PADDING;
        let title: String = title.chars().take(inner_width).collect();
        let rule = "─".repeat(inner_width.saturating_sub(title.chars().count()));
        self.push(format!("┌{title}{rule}┐"), LineType::CodeBlock);

        let body_start = self.out.lines.len();
        let code_style = InlineStyle {
            code: true,
            ..InlineStyle::default()
        };
        for raw in &raw_lines {
            let body = truncate_spans_to_chars(&[InlineSpan::new(raw.clone(), code_style)], content_width);
            let used: usize = body.iter().map(|span| span.text().chars().count()).sum();
            let mut spans = vec![InlineSpan::new("│ ".to_string(), InlineStyle::default())];
            spans.extend(body);
            spans.push(InlineSpan::new(
                format!("{}│", " ".repeat(content_width - used + CODE_RIGHT_PADDING)),
                InlineStyle::default(),
            ));
            self.out.lines.push(RenderedLine::with_spans(
                spans_to_string(&spans),
                LineType::CodeBlock,
                spans,
            ));
        }
        self.out.code_blocks.push(CodeBlockRef {
            line_range: body_start..self.out.lines.len(),
            language,
            raw_lines,
            content_width,
        });

        self.push(format!("└{}┘", "─".repeat(inner_width)), LineType::CodeBlock);
        self.blank();
    }

    fn list_item<'a>(&mut self, node: &'a AstNode<'a>, depth: usize, marker: &str) {
        let indent = "  ".repeat(depth.saturating_sub(1));
        let prefix_first = format!("{indent}{marker}");
        let prefix_next = format!("{indent}{}", " ".repeat(marker.width()));
        let mut first = true;

        for child in node.children() {
            let is_text = matches!(child.data.borrow().value, NodeValue::Paragraph);
            if is_text {
                let spans = collect_inline_spans(child);
                let prefix = if first { &prefix_first } else { &prefix_next };
                self.push_wrapped(&spans, prefix, &prefix_next, LineType::ListItem(depth));
                first = false;
            } else {
                self.visit(child, depth, None);
            }
        }

        if first {
            let spans = collect_inline_spans(node);
            self.push_wrapped(&spans, &prefix_first, &prefix_next, LineType::ListItem(depth));
        }
    }

    fn blockquote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = format!("  {}", "│ ".repeat(quote_depth));
        for child in node.children() {
            match &child.data.borrow().value {
                NodeValue::BlockQuote => self.blockquote(child, quote_depth + 1),
                NodeValue::Paragraph => {
                    let spans = collect_inline_spans(child);
                    self.push_wrapped(&spans, &prefix, &prefix, LineType::BlockQuote);
                }
                _ => {
                    for raw in extract_text(child).lines() {
                        let spans = [InlineSpan::new(raw.to_string(), InlineStyle::default())];
                        self.push_wrapped(&spans, &prefix, &prefix, LineType::BlockQuote);
                    }
                }
            }
        }
    }

    /// Tables keep their natural width; the pane scrolls them instead.
    fn table<'a>(&mut self, node: &'a AstNode<'a>) {
        let (alignments, mut rows, has_header) = collect_table_rows(node);
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        for row in &mut rows {
            row.resize(columns, String::new());
        }

        let mut widths = vec![1_usize; columns];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }

        let start = self.out.lines.len();
        self.push(table_border(&widths, '┌', '┬', '┐'), LineType::Table);
        for (idx, row) in rows.iter().enumerate() {
            self.push(table_row(row, &widths, &alignments), LineType::Table);
            if has_header && idx == 0 {
                self.push(table_border(&widths, '├', '┼', '┤'), LineType::Table);
            }
        }
        self.push(table_border(&widths, '└', '┴', '┘'), LineType::Table);

        let width = 1 + widths.iter().map(|w| w + 3).sum::<usize>();
        self.out.tables.push(TableRef {
            line_range: start..self.out.lines.len(),
            width,
            scroll_wrapped: false,
        });
    }
}

fn ensure_trailing_empty_lines(lines: &mut Vec<RenderedLine>, count: usize) {
    if lines.is_empty() {
        return;
    }
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| *line.line_type() == LineType::Empty)
        .count();
    for _ in existing..count {
        lines.push(RenderedLine::new(String::new(), LineType::Empty));
    }
}

fn list_markers(list_type: ListType, start: usize, delimiter: ListDelimType, len: usize) -> Vec<String> {
    match list_type {
        ListType::Bullet => vec!["• ".to_string(); len],
        ListType::Ordered => {
            let delimiter = match delimiter {
                ListDelimType::Paren => ')',
                ListDelimType::Period => '.',
            };
            let digits = (start + len.saturating_sub(1)).to_string().len();
            (start..start + len)
                .map(|number| format!("{number:>digits$}{delimiter} "))
                .collect()
        }
    }
}

fn collect_table_rows<'a>(table: &'a AstNode<'a>) -> (Vec<TableAlignment>, Vec<Vec<String>>, bool) {
    let alignments = match &table.data.borrow().value {
        NodeValue::Table(meta) => meta.alignments.clone(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    let mut has_header = false;
    for row in table.children() {
        let NodeValue::TableRow(header) = row.data.borrow().value else {
            continue;
        };
        has_header |= header;
        let cells = row
            .children()
            .filter(|cell| matches!(cell.data.borrow().value, NodeValue::TableCell))
            .map(|cell| extract_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        rows.push(cells);
    }
    (alignments, rows, has_header)
}

fn table_border(widths: &[usize], left: char, middle: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&middle.to_string()))
}

fn table_row(cells: &[String], widths: &[usize], alignments: &[TableAlignment]) -> String {
    let mut out = String::from("│");
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let padding = width.saturating_sub(cell.width());
        let (left, right) = match alignments.get(idx).copied().unwrap_or(TableAlignment::None) {
            TableAlignment::Right => (padding, 0),
            TableAlignment::Center => (padding / 2, padding - padding / 2),
            TableAlignment::Left | TableAlignment::None => (0, padding),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left));
        out.push_str(cell);
        out.push_str(&" ".repeat(right));
        out.push_str(" │");
    }
    out
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => {
            text.push('`');
            text.push_str(&code.literal);
            text.push('`');
        }
        NodeValue::FootnoteReference(reference) => {
            text.push_str(&format!("[^{}]", reference.name));
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let nested = match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) | NodeValue::TaskItem(_) => return,
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
            return;
        }
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
            return;
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let shown = if alt.is_empty() { image.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[Image: {shown}]"), style));
            return;
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
            return;
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
            return;
        }
        NodeValue::Emph => InlineStyle { emphasis: true, ..style },
        NodeValue::Strong => InlineStyle { strong: true, ..style },
        NodeValue::Strikethrough => InlineStyle {
            strikethrough: true,
            ..style
        },
        NodeValue::Link(_) => InlineStyle { link: true, ..style },
        _ => style,
    };
    for child in node.children() {
        collect_inline_spans_recursive(child, nested, spans);
    }
}

/// Greedy word wrap. Leading whitespace is dropped on continuation lines.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let start_line = |prefix: &str| -> (Vec<InlineSpan>, usize) {
        if prefix.is_empty() {
            (Vec::new(), 0)
        } else {
            (
                vec![InlineSpan::new(prefix.to_string(), InlineStyle::default())],
                prefix.width(),
            )
        }
    };

    let mut lines = Vec::new();
    let (mut current, mut current_len) = start_line(prefix_first);
    let mut has_word = false;

    for token in spans.iter().flat_map(split_inline_tokens) {
        let token_len: usize = token.text().chars().map(|ch| ch.width().unwrap_or(0)).sum();
        let token_is_ws = token.text().chars().all(char::is_whitespace);

        if has_word && current_len + token_len > width {
            lines.push(std::mem::take(&mut current));
            (current, current_len) = start_line(prefix_next);
            has_word = false;
        }
        if token_is_ws && !has_word {
            continue;
        }
        current_len += token_len;
        current.push(token);
        has_word = true;
    }

    lines.push(current);
    lines
}

fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_ws: Option<bool> = None;

    for ch in span.text().chars() {
        let is_ws = ch.is_whitespace();
        if in_ws.is_some_and(|state| state != is_ws) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        in_ws = Some(is_ws);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines_of(doc: &Document, line_type: LineType) -> Vec<&str> {
        doc.lines()
            .iter()
            .filter(|l| *l.line_type() == line_type)
            .map(RenderedLine::content)
            .collect()
    }

    #[test]
    fn test_parse_empty_document() {
        assert_eq!(parse("").line_count(), 0);
    }

    #[test]
    fn test_parse_simple_paragraph() {
        let doc = parse("Hello world");
        assert!(doc.lines().iter().any(|l| l.content() == "Hello world"));
    }

    #[test]
    fn test_parse_multiple_headings() {
        let doc = parse("# One\n\n## Two\n\n### Three");
        let levels: Vec<u8> = doc.headings().iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(doc.headings()[0].text, "One");
        assert_eq!(doc.headings()[0].line, 0);
    }

    #[test]
    fn test_heading_is_separated_from_previous_block() {
        let doc = parse("Paragraph\n\n## Heading");
        let heading_line = doc.headings()[0].line;
        assert_eq!(*doc.lines()[heading_line - 1].line_type(), LineType::Empty);
    }

    #[test]
    fn test_code_block_records_raw_lines() {
        let doc = parse("```rust\nfn main() {}\nlet x = 1;\n```");
        let block = &doc.code_blocks()[0];
        assert_eq!(block.language.as_deref(), Some("rust"));
        assert_eq!(block.raw_lines, vec!["fn main() {}", "let x = 1;"]);
        assert_eq!(block.line_range.len(), 2);
        assert!(doc.lines()[block.line_range.start].content().contains("fn main"));
        assert!(lines_of(&doc, LineType::CodeBlock)[0].starts_with("┌ rust "));
    }

    #[test]
    fn test_ordered_list_markers_are_aligned() {
        let source: String = (1..=10).map(|n| format!("{n}. item\n")).collect();
        let doc = parse(&source);
        let items = lines_of(&doc, LineType::ListItem(1));
        assert_eq!(items[0], " 1. item");
        assert_eq!(items[9], "10. item");
    }

    #[test]
    fn test_task_list_markers() {
        let doc = parse("- [x] Done\n- [ ] Todo");
        let items = lines_of(&doc, LineType::ListItem(1));
        assert_eq!(items, vec!["✓ Done", "□ Todo"]);
    }

    #[test]
    fn test_blockquote_wraps_with_prefix() {
        let md = "> This is a long block quote line that should wrap and keep the quote prefix.";
        let doc = parse_with_layout(md, 30);
        let quotes = lines_of(&doc, LineType::BlockQuote);
        assert!(quotes.len() > 1);
        for line in quotes {
            assert!(line.starts_with("  │ "));
            assert!(line.width() <= 30);
        }
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let doc = parse_with_layout("alpha beta gamma delta epsilon zeta eta theta", 16);
        for line in lines_of(&doc, LineType::Paragraph) {
            assert!(line.width() <= 16, "too wide: {line}");
        }
    }

    #[test]
    fn test_table_keeps_natural_width() {
        let md = "| Very long heading | Value |\n|---|---:|\n| some really long content | 12345 |";
        let doc = parse_with_layout(md, 24);
        let rows = lines_of(&doc, LineType::Table);
        assert!(rows[0].starts_with('┌'));
        assert!(rows.iter().any(|l| l.contains("some really long content")));
        assert!(rows.last().unwrap().starts_with('└'));

        let table = &doc.tables()[0];
        assert!(!table.scroll_wrapped);
        assert_eq!(table.width, rows[0].width());
        assert!(table.width > 24);
    }

    #[test]
    fn test_table_alignment() {
        let doc = parse("| A | B |\n|:-:|--:|\n| x | 12345 |");
        let rows = lines_of(&doc, LineType::Table);
        assert_eq!(rows[1], "│ A │     B │");
        assert_eq!(rows[3], "│ x │ 12345 │");
    }

    #[test]
    fn test_inline_styles() {
        let doc = parse("**bold** and *em* and `code` and [link](https://example.com)");
        let spans = doc.lines()[0].spans().unwrap();
        assert!(spans.iter().any(|s| s.text() == "bold" && s.style().strong));
        assert!(spans.iter().any(|s| s.text() == "em" && s.style().emphasis));
        assert!(spans.iter().any(|s| s.text() == "code" && s.style().code));
        assert!(spans.iter().any(|s| s.text() == "link" && s.style().link));
    }

    #[test]
    fn test_image_placeholder() {
        let doc = parse("![Alt text](image.png)");
        assert_eq!(doc.lines()[0].content(), "[Image: Alt text]");
    }
}
