use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap};

use crate::app::Model;
use crate::export::MenuFocus;
use crate::theme::Palette;

use super::{screen, style};

pub fn render_download_menu(model: &Model, frame: &mut Frame, trigger: Rect, area: Rect) {
    let palette = model.palette();
    let popup = screen::dropdown_rect(trigger, area);
    let focus = model.export.menu().focus();

    let lines: Vec<Line> = model
        .export
        .controls()
        .iter()
        .enumerate()
        .map(|(idx, control)| {
            let mut item_style = if control.is_disabled() {
                style::muted_style(palette)
            } else {
                style::base_style(palette)
            };
            if focus == MenuFocus::Item(idx) {
                item_style = item_style.add_modifier(Modifier::REVERSED);
            }
            Line::styled(format!(" {}", control.label()), item_style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .style(style::base_style(palette))
        .border_style(style::accent_style(palette));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_alert(message: &str, palette: &Palette, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(8).clamp(20, 60);
    let popup = centered_popup_rect(width, 7, area);
    let lines = vec![
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::styled("Enter to dismiss", style::muted_style(palette)),
    ];
    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(style::base_style(palette))
        .border_style(style::accent_style(palette));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true }),
        popup,
    );
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = model.palette();
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let section_style = style::accent_style(palette).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::styled("Documents", section_style));
    lines.push(Line::raw("  [ / ]               Previous / next document"));
    lines.push(Line::raw("  /                   Filter the list"));
    lines.push(Line::raw("  Tab                 Switch sidebar / content"));
    lines.push(Line::raw("  Enter               Open entry under cursor"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Reading", section_style));
    lines.push(Line::raw("  j/k or Up/Down      Scroll"));
    lines.push(Line::raw("  Space / b           Page down / up"));
    lines.push(Line::raw("  Ctrl-d / Ctrl-u     Half page"));
    lines.push(Line::raw("  g / G               Top / bottom"));
    lines.push(Line::raw("  h/l or Left/Right   Scroll wide tables"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("View", section_style));
    lines.push(Line::raw("  t                   Toggle light / dark"));
    lines.push(Line::raw("  d                   Download menu"));
    lines.push(Line::raw("  Drag divider        Resize sidebar"));
    lines.push(Line::raw("  q / Ctrl-c          Quit"));
    lines.push(Line::raw(""));

    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(format!(
        "  Exports: {}",
        model.export.directory().display()
    )));

    let block = Block::default()
        .title(" Help ")
        .title_bottom(Line::styled(" any key closes ", style::muted_style(palette)))
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(style::base_style(palette))
        .border_style(style::accent_style(palette));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
