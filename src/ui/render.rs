use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{Model, PaneContent, load_error_message};
use crate::document::{Document, RenderedLine};
use crate::export::MenuFocus;
use crate::theme::Palette;

use super::screen::{DOWNLOAD_LABEL, HeaderButtons, ScreenLayout};
use super::{overlays, status, style};

/// Header button geometry for the current pager and theme labels.
pub fn header_buttons(model: &Model, header: Rect) -> HeaderButtons {
    let pager = model.navigator.pager(&model.catalog);
    HeaderButtons::compute(
        header,
        &pager.previous.label,
        &pager.next.label,
        model.theme.toggle_label(),
    )
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let palette = model.palette();
    frame.render_widget(Block::default().style(style::base_style(palette)), area);

    let layout = model.layout();
    let buttons = header_buttons(model, layout.header);
    render_header(model, frame, &buttons, layout.header);
    render_sidebar(model, frame, &layout);
    if let Some(divider) = layout.divider {
        render_divider(model, frame, divider);
    }
    render_content(model, frame, layout.content);

    if model.active_toast().is_some() {
        status::render_toast_bar(model, frame, layout.status);
    } else {
        status::render_status_bar(model, frame, layout.status);
    }

    if model.export.menu().is_open() {
        overlays::render_download_menu(model, frame, buttons.download, area);
    }
    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
    if let Some(message) = model.alert.as_deref() {
        overlays::render_alert(message, palette, frame, area);
    }
}

fn render_header(model: &Model, frame: &mut Frame, buttons: &HeaderButtons, area: Rect) {
    let palette = model.palette();
    let title = Paragraph::new(" notedeck").style(
        style::base_style(palette)
            .fg(style::color(palette.heading))
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(title, area);

    let pager = model.navigator.pager(&model.catalog);
    let menu = model.export.menu();
    let download_focused = menu.is_open() || menu.focus() == MenuFocus::Trigger;
    let items = [
        (buttons.previous, pager.previous.label.as_str(), pager.previous.is_enabled(), false),
        (buttons.next, pager.next.label.as_str(), pager.next.is_enabled(), false),
        (buttons.theme, model.theme.toggle_label(), true, false),
        (buttons.download, DOWNLOAD_LABEL, true, download_focused),
    ];
    for (rect, label, enabled, focused) in items {
        if rect.width == 0 {
            continue;
        }
        let button = Paragraph::new(format!(" {label} "))
            .style(style::button_style(palette, enabled, focused));
        frame.render_widget(button, rect);
    }
}

fn render_sidebar(model: &Model, frame: &mut Frame, layout: &ScreenLayout) {
    let palette = model.palette();
    let block = Block::default()
        .title(" Documents ")
        .borders(Borders::ALL)
        .style(style::base_style(palette))
        .border_style(if model.sidebar_focused {
            style::accent_style(palette)
        } else {
            style::border_style(palette)
        });
    let inner = block.inner(layout.sidebar);
    frame.render_widget(block, layout.sidebar);
    if inner.height == 0 {
        return;
    }

    let filter = if model.sidebar.editing {
        Line::styled(
            format!("/ {}▏", model.sidebar.query),
            style::accent_style(palette),
        )
    } else if model.sidebar.query.is_empty() {
        Line::styled("/ filter", style::muted_style(palette))
    } else {
        Line::styled(format!("/ {}", model.sidebar.query), style::base_style(palette))
    };
    frame.render_widget(Paragraph::new(filter), Rect { height: 1, ..inner });

    let list = layout.sidebar_list();
    let visible = model.visible_entries();
    if visible.is_empty() {
        let empty = Paragraph::new(Line::styled("No matches", style::muted_style(palette)));
        frame.render_widget(empty, list);
        return;
    }

    let rows: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(model.sidebar.scroll)
        .take(usize::from(list.height))
        .filter_map(|(row, &position)| {
            let doc = model.catalog.get(position)?;
            let active = model.active_entry == Some(position);
            let marker = if active { "▶ " } else { "  " };
            let mut line_style = if active {
                style::accent_style(palette).add_modifier(Modifier::BOLD)
            } else {
                style::base_style(palette)
            };
            if model.sidebar_focused && row == model.sidebar.cursor {
                line_style = line_style.bg(style::color(palette.selection));
            }
            Some(Line::styled(format!("{marker}{}", doc.label()), line_style))
        })
        .collect();
    frame.render_widget(Paragraph::new(rows), list);
}

fn render_divider(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = model.palette();
    let divider_style = if model.resizer.is_dragging() {
        style::accent_style(palette).add_modifier(Modifier::BOLD)
    } else {
        style::border_style(palette)
    };
    let glyph = if model.resizer.is_dragging() { "┃" } else { "│" };
    let lines: Vec<Line> = (0..area.height)
        .map(|_| Line::styled(glyph, divider_style))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_content(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = model.palette();
    let label = model
        .active_entry
        .and_then(|position| model.catalog.get(position))
        .map_or("", |doc| doc.label());
    let mut title = vec![Span::raw(format!(" {label} "))];
    if model.pipeline.is_busy() {
        title.push(Span::styled("[loading] ", style::muted_style(palette)));
    }
    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .style(style::base_style(palette))
        .border_style(if model.sidebar_focused {
            style::border_style(palette)
        } else {
            style::accent_style(palette)
        });

    let lines = match &model.pane {
        PaneContent::Empty => Vec::new(),
        PaneContent::LoadError { identifier } => vec![Line::styled(
            load_error_message(identifier),
            style::base_style(palette).fg(style::color(palette.accent)),
        )],
        PaneContent::Document(doc) => document_lines(model, doc, palette),
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn document_lines(model: &Model, doc: &Document, palette: &Palette) -> Vec<Line<'static>> {
    let range = model.viewport.visible_range();
    let column = model.viewport.column();
    range
        .filter_map(|index| {
            let line = doc.line_at(index)?;
            let spans = styled_spans(line, palette);
            let spans = if column > 0 && doc.scroll_region_at(index).is_some() {
                skip_columns(spans, column)
            } else {
                spans
            };
            Some(Line::from(spans))
        })
        .collect()
}

fn styled_spans(line: &RenderedLine, palette: &Palette) -> Vec<Span<'static>> {
    let base = style::style_for_line_type(line.line_type(), palette);
    match line.spans() {
        Some(spans) => spans
            .iter()
            .map(|span| {
                Span::styled(
                    span.text().to_string(),
                    style::style_for_inline(base, span.style(), palette),
                )
            })
            .collect(),
        None => vec![Span::styled(line.content().to_string(), base)],
    }
}

/// Drop the first `skip` display columns of a line.
fn skip_columns(spans: Vec<Span<'static>>, mut skip: usize) -> Vec<Span<'static>> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        if skip == 0 {
            out.push(span);
            continue;
        }
        let width = span.content.width();
        if width <= skip {
            skip -= width;
            continue;
        }
        let mut skipped = 0;
        let rest: String = span
            .content
            .chars()
            .skip_while(|ch| {
                if skipped >= skip {
                    return false;
                }
                skipped += ch.width().unwrap_or(0);
                true
            })
            .collect();
        skip = 0;
        out.push(Span::styled(rest, span.style));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_columns_crosses_span_boundaries() {
        let spans = vec![Span::raw("│ ab "), Span::raw("│ cdef │")];
        let out = skip_columns(spans, 7);
        let text: String = out.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "cdef │");
    }

    #[test]
    fn test_skip_zero_keeps_line() {
        let spans = vec![Span::raw("abc")];
        assert_eq!(skip_columns(spans.clone(), 0), spans);
    }
}
