use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::catalog::{Catalog, DocumentRef};
use crate::document::{Document, MarkdownRenderer, MarkupRenderer, render_enhanced};
use crate::export::{ExportJob, ExportOrchestrator};
use crate::highlight::{CodeHighlighter, SyntectHighlighter};
use crate::layout::Resizer;
use crate::navigation::Navigator;
use crate::pipeline::{FetchCompletion, RenderPhase, RenderPipeline, RenderRequest};
use crate::theme::{Palette, Theme, ThemeController};
use crate::ui::screen::ScreenLayout;
use crate::ui::viewport::Viewport;

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the content pane currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneContent {
    /// Nothing committed yet.
    Empty,
    Document(Document),
    /// The last live fetch failed.
    LoadError { identifier: String },
}

impl PaneContent {
    pub const fn document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

/// Text shown in place of a document that could not be fetched.
pub fn load_error_message(identifier: &str) -> String {
    format!("Unable to load {identifier}.")
}

/// A value the event loop writes to the preference store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preference {
    Theme(Theme),
    SidebarWidth(f32),
}

/// Work `update` asks the event loop to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(RenderRequest),
    Persist(Preference),
    Export(ExportJob),
}

/// Sidebar filter and cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarState {
    pub query: String,
    /// Typing goes to the filter input
    pub editing: bool,
    /// Index into the filtered entries
    pub cursor: usize,
    /// First filtered entry on screen
    pub scroll: usize,
}

/// The complete application state.
pub struct Model {
    pub catalog: Catalog,
    pub navigator: Navigator,
    pub pipeline: RenderPipeline,
    pub pane: PaneContent,
    pub viewport: Viewport,
    /// Catalog position highlighted in the sidebar; follows commits, not requests
    pub active_entry: Option<usize>,
    pub sidebar: SidebarState,
    /// Keys go to the sidebar list instead of the content pane
    pub sidebar_focused: bool,
    pub resizer: Resizer,
    pub theme: ThemeController,
    pub export: ExportOrchestrator,
    /// Blocking message; input is captured until dismissed
    pub alert: Option<String>,
    pub help_visible: bool,
    pub should_quit: bool,
    pub terminal_size: (u16, u16),
    /// Config paths shown in help
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    renderer: Box<dyn MarkupRenderer>,
    highlighter: Box<dyn CodeHighlighter>,
    toast: Option<Toast>,
    effects: Vec<Effect>,
}

impl Model {
    pub fn new(
        catalog: Catalog,
        theme: ThemeController,
        resizer: Resizer,
        export_dir: impl Into<PathBuf>,
        terminal_size: (u16, u16),
    ) -> Self {
        let mut model = Self {
            catalog,
            navigator: Navigator::new(),
            pipeline: RenderPipeline::new(),
            pane: PaneContent::Empty,
            viewport: Viewport::new(0, 0, 0),
            active_entry: None,
            sidebar: SidebarState::default(),
            sidebar_focused: false,
            resizer,
            theme,
            export: ExportOrchestrator::new(export_dir),
            alert: None,
            help_visible: false,
            should_quit: false,
            terminal_size,
            config_global_path: None,
            config_local_path: None,
            renderer: Box::new(MarkdownRenderer),
            highlighter: Box::new(SyntectHighlighter::new(theme.theme())),
            toast: None,
            effects: Vec::new(),
        };
        model.sync_viewport();
        model
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: impl MarkupRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    #[must_use]
    pub fn with_highlighter(mut self, mut highlighter: impl CodeHighlighter + 'static) -> Self {
        highlighter.set_theme(self.theme.theme());
        self.highlighter = Box::new(highlighter);
        self
    }

    pub fn layout(&self) -> ScreenLayout {
        let (width, height) = self.terminal_size;
        ScreenLayout::compute(
            Rect::new(0, 0, width, height),
            self.resizer.columns(),
            self.resizer.is_narrow(),
        )
    }

    /// Width markup is laid out at.
    pub fn pane_width(&self) -> u16 {
        self.layout().content_inner().width.max(1)
    }

    pub fn palette(&self) -> &'static Palette {
        self.theme.theme().palette()
    }

    pub fn current_document(&self) -> &DocumentRef {
        self.navigator.current_document(&self.catalog)
    }

    /// Catalog positions matching the sidebar filter, in catalog order.
    pub fn visible_entries(&self) -> Vec<usize> {
        self.catalog.filter(&self.sidebar.query)
    }

    /// Drain the effects queued by `update`.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(super) fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Issue a render request for the current selection.
    pub(super) fn request_render(&mut self) {
        let request = self.pipeline.request(self.navigator.current_document(&self.catalog));
        tracing::debug!(
            token = request.token.value(),
            identifier = %request.identifier,
            "render requested"
        );
        self.effects.push(Effect::Fetch(request));
    }

    /// Apply a finished fetch. Superseded completions change nothing.
    pub(super) fn apply_fetch(&mut self, completion: FetchCompletion) {
        let FetchCompletion { request, result } = completion;
        match (self.pipeline.settle(&request, result.is_ok()), result) {
            (RenderPhase::Committed, Ok(source)) => {
                let mut doc = render_enhanced(self.renderer.as_ref(), &source, self.pane_width());
                self.highlighter.highlight_document(&mut doc);
                self.show(PaneContent::Document(doc));
                self.active_entry = Some(request.position);
                self.reveal_active_entry();
            }
            (RenderPhase::Failed, Err(err)) => {
                tracing::warn!(%err, "document failed to load");
                self.show(PaneContent::LoadError {
                    identifier: request.identifier,
                });
            }
            _ => {}
        }
    }

    fn show(&mut self, pane: PaneContent) {
        let (lines, region) = match &pane {
            PaneContent::Document(doc) => (doc.line_count(), doc.widest_scroll_region()),
            PaneContent::LoadError { .. } => (1, 0),
            PaneContent::Empty => (0, 0),
        };
        self.pane = pane;
        self.viewport.set_total_lines(lines);
        self.viewport.set_region_width(region);
        self.viewport.reset();
    }

    /// Re-render the committed document when the pane width changed.
    pub(super) fn reflow(&mut self) {
        let width = self.pane_width();
        let PaneContent::Document(doc) = &mut self.pane else {
            return;
        };
        if doc.width() == width {
            return;
        }
        let mut reflowed = render_enhanced(self.renderer.as_ref(), doc.source(), width);
        self.highlighter.highlight_document(&mut reflowed);
        tracing::debug!(from = doc.width(), to = width, "reflowed document");
        self.viewport.set_total_lines(reflowed.line_count());
        self.viewport.set_region_width(reflowed.widest_scroll_region());
        *doc = reflowed;
    }

    /// Switch theme, recolour code blocks and return the new theme.
    pub(super) fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggle();
        self.highlighter.set_theme(theme);
        if let PaneContent::Document(doc) = &mut self.pane {
            self.highlighter.highlight_document(doc);
        }
        theme
    }

    /// Match the viewport to the content pane.
    pub(super) fn sync_viewport(&mut self) {
        let inner = self.layout().content_inner();
        self.viewport.resize(inner.width, inner.height);
    }

    /// Keep the sidebar cursor inside the filtered list and on screen.
    pub(super) fn clamp_sidebar(&mut self) {
        let count = self.visible_entries().len();
        self.sidebar.cursor = self.sidebar.cursor.min(count.saturating_sub(1));
        let rows = usize::from(self.layout().sidebar_list().height).max(1);
        if self.sidebar.cursor < self.sidebar.scroll {
            self.sidebar.scroll = self.sidebar.cursor;
        } else if self.sidebar.cursor >= self.sidebar.scroll + rows {
            self.sidebar.scroll = self.sidebar.cursor + 1 - rows;
        }
        self.sidebar.scroll = self.sidebar.scroll.min(count.saturating_sub(rows));
    }

    /// Move the sidebar cursor onto the active entry if it is listed.
    fn reveal_active_entry(&mut self) {
        let Some(active) = self.active_entry else {
            return;
        };
        if let Some(row) = self.visible_entries().iter().position(|&p| p == active) {
            self.sidebar.cursor = row;
            self.clamp_sidebar();
        }
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    /// Drop an expired toast. Returns true when one was removed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast.as_ref().map(|t| (t.message.as_str(), t.level))
    }
}
