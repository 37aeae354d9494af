use crate::export::{
    EXPORT_FAILED_MESSAGE, ExportCompletion, ExportFormat, ExportRejected, PaneSnapshot,
};
use crate::layout::PointerId;
use crate::pipeline::FetchCompletion;

use super::model::{Effect, Model, Preference, ToastLevel};

/// Every input the application reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Documents
    /// Select a document by identifier
    SelectDocument(String),
    /// Step back through the catalog
    PreviousDocument,
    /// Step forward through the catalog
    NextDocument,
    /// A fetch worker finished
    FetchCompleted(FetchCompletion),

    // Content pane
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    GoToTop,
    GoToBottom,
    /// Scroll table regions left
    ScrollTableLeft,
    /// Scroll table regions right
    ScrollTableRight,

    // Sidebar
    /// Focus the filter input
    StartFilter,
    /// Replace the filter query
    FilterInput(String),
    /// Leave the filter input, keeping the query
    FinishFilter,
    /// Empty the filter and leave the input
    ClearFilter,
    /// Move keyboard focus between sidebar and content
    SwitchFocus,
    SidebarUp,
    SidebarDown,
    /// Open the entry under the sidebar cursor
    SidebarActivate,
    /// Open the nth filtered entry (mouse)
    SidebarClick(usize),

    // Layout
    ToggleTheme,
    /// Pointer pressed on the divider
    BeginDrag(PointerId),
    /// Pointer moved to a column during a drag
    DragTo(PointerId, u16),
    /// Pointer released or capture lost
    EndDrag,
    /// Terminal lost focus
    WindowBlur,

    // Download
    ToggleDownloadMenu,
    /// Close the menu; the flag says whether focus returns to the trigger
    CloseDownloadMenu { return_focus: bool },
    MenuFocusNext,
    MenuFocusPrevious,
    /// Run the focused menu option
    MenuActivate,
    /// Start an export
    Export(ExportFormat),
    /// An export worker finished
    ExportFinished(ExportCompletion),

    // Window
    DismissAlert,
    ToggleHelp,
    HideHelp,
    /// Terminal resized
    Resize(u16, u16),
    Redraw,
    Quit,
}

/// Apply `msg` to `model`.
///
/// All I/O is requested through effects on the model; this function never
/// blocks.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::SelectDocument(identifier) => {
            if model
                .navigator
                .select_by_identifier(&model.catalog, &identifier)
                .is_some()
            {
                model.request_render();
            } else {
                tracing::debug!(%identifier, "ignoring unknown document");
            }
        }
        Message::PreviousDocument => {
            if model.navigator.select_previous().is_some() {
                model.request_render();
            }
        }
        Message::NextDocument => {
            if model.navigator.select_next(&model.catalog).is_some() {
                model.request_render();
            }
        }
        Message::FetchCompleted(completion) => model.apply_fetch(completion),

        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::HalfPageUp => model.viewport.half_page_up(),
        Message::HalfPageDown => model.viewport.half_page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => model.viewport.go_to_bottom(),
        Message::ScrollTableLeft => model.viewport.scroll_left(TABLE_SCROLL_STEP),
        Message::ScrollTableRight => model.viewport.scroll_right(TABLE_SCROLL_STEP),

        Message::StartFilter => {
            model.sidebar.editing = true;
            model.sidebar_focused = true;
        }
        Message::FilterInput(query) => {
            model.sidebar.query = query;
            model.sidebar.cursor = 0;
            model.sidebar.scroll = 0;
            model.clamp_sidebar();
        }
        Message::FinishFilter => model.sidebar.editing = false,
        Message::ClearFilter => {
            model.sidebar.query.clear();
            model.sidebar.editing = false;
            model.clamp_sidebar();
        }
        Message::SwitchFocus => {
            model.sidebar_focused = !model.sidebar_focused;
            model.sidebar.editing = false;
        }
        Message::SidebarUp => {
            model.sidebar.cursor = model.sidebar.cursor.saturating_sub(1);
            model.clamp_sidebar();
        }
        Message::SidebarDown => {
            model.sidebar.cursor += 1;
            model.clamp_sidebar();
        }
        Message::SidebarActivate => {
            let cursor = model.sidebar.cursor;
            model = activate_visible(model, cursor);
        }
        Message::SidebarClick(row) => {
            model.sidebar_focused = true;
            model = activate_visible(model, row);
        }

        Message::ToggleTheme => {
            let theme = model.toggle_theme();
            model.push_effect(Effect::Persist(Preference::Theme(theme)));
        }
        Message::BeginDrag(pointer) => {
            if let Err(reason) = model.resizer.begin_drag(pointer) {
                tracing::debug!(?reason, "divider drag refused");
            }
        }
        Message::DragTo(pointer, column) => {
            if model
                .resizer
                .pointer_move(pointer, f32::from(column))
                .is_some()
            {
                model.sync_viewport();
            }
        }
        Message::EndDrag | Message::WindowBlur => {
            if let Some(width) = model.resizer.end_drag() {
                model.push_effect(Effect::Persist(Preference::SidebarWidth(width)));
                model.sync_viewport();
                model.reflow();
                model.clamp_sidebar();
            }
        }

        Message::ToggleDownloadMenu => model.export.menu_mut().toggle(),
        Message::CloseDownloadMenu { return_focus } => model.export.menu_mut().close(return_focus),
        Message::MenuFocusNext => model.export.menu_mut().focus_next(),
        Message::MenuFocusPrevious => model.export.menu_mut().focus_previous(),
        Message::MenuActivate => {
            if let Some(format) = model.export.menu().focused_format() {
                model = start_export(model, format);
            }
        }
        Message::Export(format) => model = start_export(model, format),
        Message::ExportFinished(completion) => {
            model.export.finish(&completion);
            match completion.result {
                Ok(path) => {
                    model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                }
                Err(_) => model.alert = Some(EXPORT_FAILED_MESSAGE.to_string()),
            }
        }

        Message::DismissAlert => model.alert = None,
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            if let Some(width) = model.resizer.set_viewport_width(width) {
                model.push_effect(Effect::Persist(Preference::SidebarWidth(width)));
            }
            model.sync_viewport();
            model.reflow();
            model.clamp_sidebar();
        }
        Message::Redraw => {}
        Message::Quit => model.should_quit = true,
    }
    model
}

/// Columns moved per table scroll step.
const TABLE_SCROLL_STEP: usize = 4;

fn activate_visible(mut model: Model, row: usize) -> Model {
    let Some(&position) = model.visible_entries().get(row) else {
        return model;
    };
    model.sidebar.cursor = row;
    model.clamp_sidebar();
    let identifier = model.catalog.get(position).map(|doc| doc.identifier().to_string());
    match identifier {
        Some(identifier) => update(model, Message::SelectDocument(identifier)),
        None => model,
    }
}

fn start_export(mut model: Model, format: ExportFormat) -> Model {
    let Some(doc) = model.pane.document() else {
        model.show_toast(ToastLevel::Warning, "Nothing to export yet");
        return model;
    };
    let snapshot = PaneSnapshot::from_document(doc, model.palette());
    let stem = model
        .active_entry
        .and_then(|position| model.catalog.get(position))
        .unwrap_or_else(|| model.current_document())
        .label()
        .to_string();
    match model.export.begin(format, snapshot, &stem) {
        Ok(job) => model.push_effect(Effect::Export(job)),
        Err(ExportRejected::Busy) => {
            model.show_toast(ToastLevel::Warning, "An export is already in progress");
        }
    }
    model
}
