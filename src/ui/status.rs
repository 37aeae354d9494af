use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::theme::Rgb;

use super::style;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = model.palette();
    let doc = model.current_document();
    let position = format!("{}/{}", doc.position() + 1, model.catalog.len());
    let line_info = format!(
        "Line {}/{}",
        (model.viewport.offset() + 1).min(model.viewport.total_lines().max(1)),
        model.viewport.total_lines()
    );
    let table_hint = if model.viewport.column() > 0 {
        format!("  col +{}", model.viewport.column())
    } else {
        String::new()
    };
    let export_hint = model
        .export
        .in_flight()
        .map_or(String::new(), |format| {
            format!("  [{} {}]", crate::export::PREPARING_LABEL, format.extension())
        });
    let filter_hint = if model.sidebar.query.is_empty() {
        String::new()
    } else {
        format!("  filter: {}", model.sidebar.query)
    };

    let status = format!(
        " {}  [{position}]  {line_info} [{}%]{table_hint}{filter_hint}{export_hint}  ?:help",
        doc.label(),
        model.viewport.scroll_percent(),
    );
    let bar = Paragraph::new(status).style(
        Style::default()
            .bg(style::color(palette.selection))
            .fg(style::color(palette.foreground)),
    );
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let palette = model.palette();
    let (prefix, bg, fg) = match level {
        ToastLevel::Info => ("[info]", palette.selection, palette.foreground),
        ToastLevel::Warning => ("[warn]", Rgb(0xe3, 0xb3, 0x41), Rgb(0, 0, 0)),
        ToastLevel::Error => ("[error]", Rgb(0xcf, 0x22, 0x2e), Rgb(0xff, 0xff, 0xff)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}"))
        .style(Style::default().bg(style::color(bg)).fg(style::color(fg)));
    frame.render_widget(toast, area);
}
