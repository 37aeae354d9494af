//! Syntax highlighting for code blocks.
//!
//! Uses syntect with Sublime Text syntax definitions. Each display theme maps
//! to one syntect theme; switching themes re-highlights from the raw code.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntaxTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::document::{Document, InlineColor, InlineSpan, InlineStyle};
use crate::theme::Theme;

/// Colours code blocks in a laid-out document.
pub trait CodeHighlighter {
    /// Switch colour scheme. Takes effect on the next `highlight_document`.
    fn set_theme(&mut self, theme: Theme);

    /// Highlight every code block in `document`, replacing earlier colours.
    fn highlight_document(&self, document: &mut Document);
}

/// syntect-backed highlighter.
#[derive(Debug, Clone, Copy)]
pub struct SyntectHighlighter {
    theme: Theme,
}

impl SyntectHighlighter {
    pub const fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn highlight_document(&self, document: &mut Document) {
        let blocks: Vec<_> = document
            .code_blocks()
            .iter()
            .map(|block| (block.language.clone(), block.raw_lines.join("\n")))
            .collect();
        for (index, (language, code)) in blocks.into_iter().enumerate() {
            let spans = highlight_code(language.as_deref(), &code, self.theme);
            document.apply_code_highlight(index, spans);
        }
    }
}

/// Highlight `code` as `language`. Unknown languages come back as plain code spans.
pub fn highlight_code(language: Option<&str>, code: &str, theme: Theme) -> Vec<Vec<InlineSpan>> {
    let code_style = InlineStyle {
        code: true,
        ..InlineStyle::default()
    };
    let syntax_set = syntax_set();
    let syntax = language.and_then(|lang| {
        syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| syntax_set.find_syntax_by_name(lang))
    });

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| vec![InlineSpan::new(line.to_string(), code_style)])
            .collect();
    };

    let mut highlighter = HighlightLines::new(syntax, syntax_theme(theme));
    code.lines()
        .map(|line| {
            let ranges = highlighter
                .highlight_line(line, syntax_set)
                .unwrap_or_else(|err| {
                    tracing::debug!(%err, "highlighting failed, using plain text");
                    Vec::new()
                });
            if ranges.is_empty() {
                return vec![InlineSpan::new(line.to_string(), code_style)];
            }
            ranges
                .into_iter()
                .map(|(style, text)| {
                    let fg = InlineColor {
                        r: style.foreground.r,
                        g: style.foreground.g,
                        b: style.foreground.b,
                    };
                    InlineSpan::new(
                        text.to_string(),
                        InlineStyle {
                            fg: Some(fg),
                            ..code_style
                        },
                    )
                })
                .collect()
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        tracing::debug!("loading syntax definitions");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme_set() -> &'static ThemeSet {
    static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

const LIGHT_THEMES: &[&str] = &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"];
const DARK_THEMES: &[&str] = &["Monokai Extended", "base16-ocean.dark", "Solarized (dark)"];

fn syntax_theme(theme: Theme) -> &'static SyntaxTheme {
    static LIGHT: OnceLock<SyntaxTheme> = OnceLock::new();
    static DARK: OnceLock<SyntaxTheme> = OnceLock::new();
    let (cell, preferred) = match theme {
        Theme::Light => (&LIGHT, LIGHT_THEMES),
        Theme::Dark => (&DARK, DARK_THEMES),
    };
    cell.get_or_init(|| {
        let themes = &theme_set().themes;
        preferred
            .iter()
            .find_map(|name| themes.get(*name))
            .or_else(|| themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    fn colours(lines: &[Vec<InlineSpan>]) -> Vec<InlineColor> {
        lines
            .iter()
            .flatten()
            .filter_map(|span| span.style().fg)
            .collect()
    }

    #[test]
    fn test_highlight_rust_produces_colored_spans() {
        let lines = highlight_code(Some("rust"), "fn main() {\n    let x = 1;\n}\n", Theme::Dark);
        assert_eq!(lines.len(), 3);
        assert!(!colours(&lines).is_empty());
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let lines = highlight_code(Some("nope"), "just text", Theme::Dark);
        assert_eq!(lines.len(), 1);
        assert!(colours(&lines).is_empty());
        assert!(lines[0].iter().all(|span| span.style().code));
    }

    #[test]
    fn test_themes_produce_different_colours() {
        let code = "fn main() { let s = \"hi\"; }";
        let light = colours(&highlight_code(Some("rust"), code, Theme::Light));
        let dark = colours(&highlight_code(Some("rust"), code, Theme::Dark));
        assert_ne!(light, dark);
    }

    #[test]
    fn test_rehighlight_replaces_previous_colours() {
        let mut doc = parse("```rust\nfn main() {}\n```");
        let mut highlighter = SyntectHighlighter::new(Theme::Light);
        highlighter.highlight_document(&mut doc);
        let line = doc.code_blocks()[0].line_range.start;
        let light = doc.lines()[line].clone();

        highlighter.set_theme(Theme::Dark);
        highlighter.highlight_document(&mut doc);
        let dark = doc.lines()[line].clone();

        assert_eq!(light.content(), dark.content());
        assert_ne!(light.spans(), dark.spans());
        assert!(dark.content().contains("fn main() {}"));
    }
}
