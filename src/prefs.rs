//! Persisted user preferences.
//!
//! Two scalar values survive restarts: the theme and the sidebar width.
//! Storage is pluggable through [`PreferenceStorage`]; the default backend
//! keeps a small JSON object on disk.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use crate::theme::Theme;

pub const THEME_KEY: &str = "notedeck-theme";
pub const SIDEBAR_WIDTH_KEY: &str = "notedeck-sidebar-width";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed scalar storage. Absent keys read as `None`.
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot persist the value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage, used by tests and when persistence is disabled.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file storage. The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file is
    /// logged and also starts empty; it is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), %err, "ignoring malformed preferences");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read preferences");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    fn flush(&self) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(&self.values)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, format!("{encoded}\n")).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

/// Typed access to the two persisted preferences.
pub struct Preferences {
    storage: Box<dyn PreferenceStorage>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    pub fn new(storage: impl PreferenceStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// Raw stored theme value; validation is the theme controller's job.
    pub fn theme(&self) -> Option<String> {
        self.storage.get(THEME_KEY)
    }

    /// Raw stored sidebar width; validation is the resizer's job.
    pub fn sidebar_width(&self) -> Option<String> {
        self.storage.get(SIDEBAR_WIDTH_KEY)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if let Err(err) = self.storage.set(THEME_KEY, theme.as_str()) {
            tracing::warn!(%err, "failed to persist theme");
        }
    }

    pub fn set_sidebar_width(&mut self, width: f32) {
        if let Err(err) = self.storage.set(SIDEBAR_WIDTH_KEY, &width.to_string()) {
            tracing::warn!(%err, "failed to persist sidebar width");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_absent_key_is_none() {
        let storage = MemoryStorage::default();
        assert_eq!(storage.get("missing"), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut storage = FileStorage::open(&path);
        storage.set(THEME_KEY, "dark").unwrap();
        storage.set(SIDEBAR_WIDTH_KEY, "31.5").unwrap();

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get(THEME_KEY).as_deref(), Some("dark"));
        assert_eq!(reopened.get(SIDEBAR_WIDTH_KEY).as_deref(), Some("31.5"));
    }

    #[test]
    fn test_file_storage_malformed_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut storage = FileStorage::open(&path);
        assert_eq!(storage.get(THEME_KEY), None);

        storage.set(THEME_KEY, "light").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"light\""));
    }

    #[test]
    fn test_preferences_write_typed_values() {
        let mut prefs = Preferences::new(MemoryStorage::default());
        prefs.set_theme(Theme::Dark);
        prefs.set_sidebar_width(42.0);
        assert_eq!(prefs.theme().as_deref(), Some("dark"));
        assert_eq!(prefs.sidebar_width().as_deref(), Some("42"));
    }
}
