use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::theme::Theme;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Fixed theme, or `None` to follow the terminal.
    pub const fn theme(self) -> Option<Theme> {
        match self {
            Self::Auto => None,
            Self::Light => Some(Theme::Light),
            Self::Dark => Some(Theme::Dark),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Flags that can be saved as defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_persist: bool,
    pub default_theme: Option<ThemeMode>,
    pub export_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches accumulate, options prefer `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_persist: self.no_persist || other.no_persist,
            default_theme: other.default_theme.or(self.default_theme),
            export_dir: other
                .export_dir
                .clone()
                .or_else(|| self.export_dir.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

/// Directory holding the config file, preferences and the default log.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("notedeck");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("notedeck");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("notedeck");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("notedeck");
        }
    }

    PathBuf::from(".notedeck")
}

pub fn global_config_path() -> PathBuf {
    config_dir().join("config")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".notedeckrc")
}

/// Where theme and sidebar width are persisted.
pub fn preferences_path() -> PathBuf {
    config_dir().join("preferences.json")
}

pub fn default_log_path() -> PathBuf {
    config_dir().join("notedeck.log")
}

/// Read saved flags. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write `flags` as one flag per line.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# notedeck defaults (saved with --save)".to_string()];
    if flags.no_persist {
        lines.push("--no-persist".to_string());
    }
    if let Some(theme) = flags.default_theme {
        lines.push(format!("--default-theme {}", theme.as_str()));
    }
    if let Some(dir) = &flags.export_dir {
        lines.push(format!("--export-dir {}", dir.display()));
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", log.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove saved flags, if any.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the saveable flags out of a token list. Unknown tokens are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let takes_value = matches!(name, "--default-theme" | "--export-dir" | "--log-file");
        let value = if takes_value && inline.is_none() {
            i += 1;
            tokens.get(i).map(String::as_str)
        } else {
            inline
        };
        match (name, value) {
            ("--no-persist", None) => flags.no_persist = true,
            ("--default-theme", Some(value)) => flags.default_theme = parse_theme(value),
            ("--export-dir", Some(value)) => flags.export_dir = Some(PathBuf::from(value)),
            ("--log-file", Some(value)) => flags.log_file = Some(PathBuf::from(value)),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
