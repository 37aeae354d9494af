//! Light/dark theme state and the colour palettes behind it.

use std::fmt;

/// The two display themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value. Only the exact strings `light` and `dark` are valid.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub const fn palette(self) -> &'static Palette {
        match self {
            Self::Light => &LIGHT_PALETTE,
            Self::Dark => &DARK_PALETTE,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 24-bit colour shared by the terminal styles and the export capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Resolved colours for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
    pub muted: Rgb,
    pub accent: Rgb,
    pub heading: Rgb,
    pub code: Rgb,
    pub link: Rgb,
    pub quote: Rgb,
    pub border: Rgb,
    pub selection: Rgb,
}

const LIGHT_PALETTE: Palette = Palette {
    background: Rgb(0xff, 0xff, 0xff),
    foreground: Rgb(0x21, 0x25, 0x29),
    muted: Rgb(0x6c, 0x75, 0x7d),
    accent: Rgb(0x0d, 0x6e, 0xfd),
    heading: Rgb(0x0a, 0x3d, 0x62),
    code: Rgb(0xad, 0x14, 0x57),
    link: Rgb(0x0a, 0x58, 0xca),
    quote: Rgb(0x49, 0x50, 0x57),
    border: Rgb(0xde, 0xe2, 0xe6),
    selection: Rgb(0xcf, 0xe2, 0xff),
};

const DARK_PALETTE: Palette = Palette {
    background: Rgb(0x12, 0x14, 0x16),
    foreground: Rgb(0xe9, 0xec, 0xef),
    muted: Rgb(0xad, 0xb5, 0xbd),
    accent: Rgb(0x6e, 0xa8, 0xfe),
    heading: Rgb(0x9e, 0xc5, 0xfe),
    code: Rgb(0xe6, 0x85, 0xb5),
    link: Rgb(0x8b, 0xb9, 0xfe),
    quote: Rgb(0xce, 0xd4, 0xda),
    border: Rgb(0x49, 0x50, 0x57),
    selection: Rgb(0x1f, 0x3a, 0x5f),
};

/// Owns the active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeController {
    theme: Theme,
}

impl ThemeController {
    /// Resolve the initial theme from a stored value.
    ///
    /// Absent or unrecognised values fall back to `system_default`.
    pub fn load_initial(stored: Option<&str>, system_default: Theme) -> Self {
        let theme = stored.and_then(Theme::parse).unwrap_or(system_default);
        Self { theme }
    }

    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and return the new value.
    pub const fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Label of the toggle control. It names the action, not the current state.
    pub const fn toggle_label(&self) -> &'static str {
        match self.theme {
            Theme::Light => "Switch to Dark",
            Theme::Dark => "Switch to Light",
        }
    }
}

/// Best guess at the terminal's preferred theme.
pub fn system_preference() -> Theme {
    theme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// Interpret `COLORFGBG` (`"fg;bg"`). Background indices 7 and up are light.
fn theme_from_colorfgbg(colorfgbg: Option<&str>) -> Theme {
    let Some(value) = colorfgbg else {
        return Theme::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return Theme::Dark;
    };
    if bg >= 7 { Theme::Light } else { Theme::Dark }
}
