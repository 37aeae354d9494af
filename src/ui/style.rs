//! Terminal styles derived from the active [`Palette`].
//!
//! Palette colours are RGB. Terminals without truecolor get the nearest
//! xterm-256 cube entry instead.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineColor, InlineStyle, LineType};
use crate::theme::{Palette, Rgb};

/// Convert a palette colour for this terminal.
pub fn color(rgb: Rgb) -> Color {
    if supports_truecolor() {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    } else {
        Color::Indexed(rgb_to_xterm_256(rgb.0, rgb.1, rgb.2))
    }
}

/// Page background and body text.
pub fn base_style(palette: &Palette) -> Style {
    Style::default()
        .fg(color(palette.foreground))
        .bg(color(palette.background))
}

pub fn muted_style(palette: &Palette) -> Style {
    base_style(palette).fg(color(palette.muted))
}

pub fn border_style(palette: &Palette) -> Style {
    base_style(palette).fg(color(palette.border))
}

/// Focused borders, the dragged divider and the active sidebar entry.
pub fn accent_style(palette: &Palette) -> Style {
    base_style(palette).fg(color(palette.accent))
}

/// Header buttons; disabled ones are muted, focused ones reversed.
pub fn button_style(palette: &Palette, enabled: bool, focused: bool) -> Style {
    let style = if enabled {
        base_style(palette)
            .fg(color(palette.accent))
            .add_modifier(Modifier::BOLD)
    } else {
        muted_style(palette)
    };
    if focused {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

pub fn style_for_line_type(line_type: &LineType, palette: &Palette) -> Style {
    let base = base_style(palette);
    match line_type {
        LineType::Heading(1) => base
            .fg(color(palette.heading))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(_) => base
            .fg(color(palette.heading))
            .add_modifier(Modifier::BOLD),
        LineType::CodeBlock => base.fg(color(palette.code)),
        LineType::BlockQuote => base
            .fg(color(palette.quote))
            .add_modifier(Modifier::ITALIC),
        LineType::HorizontalRule => base.fg(color(palette.border)),
        LineType::Table => base.fg(color(palette.foreground)),
        LineType::ListItem(_) | LineType::Paragraph | LineType::Empty => base,
    }
}

/// Merge an inline span's style onto its line style.
pub fn style_for_inline(base: Style, inline: InlineStyle, palette: &Palette) -> Style {
    let mut style = base;
    if let Some(InlineColor { r, g, b }) = inline.fg {
        style = style.fg(color(Rgb(r, g, b)));
    }
    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            style = style.fg(color(palette.link));
        }
    }
    if inline.code && inline.fg.is_none() {
        style = style.fg(color(palette.code));
    }
    style
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("NOTEDECK_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let has = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|n| lower.contains(n))
        })
    };
    has(colorterm, &["truecolor", "24bit"]) || has(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Each channel maps onto 0..=5.
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + 36 * to_cube(r) + 6 * to_cube(g) + to_cube(b)
}
