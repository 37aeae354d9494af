//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: State transitions; I/O is requested as [`Effect`]s
//! - [`App::run`]: Main event loop, effect execution and rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{
    Effect, Model, PaneContent, Preference, SidebarState, ToastLevel, load_error_message,
};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::export::ExportBackend;
use crate::layout::{Resizer, SidebarBounds};
use crate::pipeline::ContentFetcher;
use crate::prefs::{MemoryStorage, Preferences};
use crate::theme::{Theme, ThemeController};

/// Owns the terminal, the collaborators behind effects, and the event loop.
pub struct App {
    catalog: Catalog,
    fetcher: Arc<dyn ContentFetcher>,
    preferences: Preferences,
    export_dir: PathBuf,
    export_backend: ExportBackend,
    default_theme: Option<Theme>,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create an application over `catalog`, reading documents through `fetcher`.
    pub fn new(catalog: Catalog, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            catalog,
            fetcher,
            preferences: Preferences::new(MemoryStorage::default()),
            export_dir: PathBuf::from("."),
            export_backend: ExportBackend::default(),
            default_theme: None,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Where theme and sidebar width are persisted.
    #[must_use]
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Directory exported files are written to.
    #[must_use]
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_export_backend(mut self, backend: ExportBackend) -> Self {
        self.export_backend = backend;
        self
    }

    /// Theme used when none is stored. Defaults to the terminal's preference.
    #[must_use]
    pub const fn with_default_theme(mut self, theme: Option<Theme>) -> Self {
        self.default_theme = theme;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// Build the starting model from stored preferences.
    fn initial_model(&self, terminal_size: (u16, u16)) -> Model {
        let system_default = self
            .default_theme
            .unwrap_or_else(crate::theme::system_preference);
        let theme =
            ThemeController::load_initial(self.preferences.theme().as_deref(), system_default);
        let resizer = Resizer::new(
            SidebarBounds::default(),
            self.preferences.sidebar_width().as_deref(),
            terminal_size.0,
        );
        tracing::debug!(
            theme = %theme.theme(),
            sidebar = resizer.width(),
            documents = self.catalog.len(),
            "initial state"
        );
        let mut model = Model::new(
            self.catalog.clone(),
            theme,
            resizer,
            self.export_dir.clone(),
            terminal_size,
        );
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model
    }
}
