use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use crate::app::{App, Message, Model};
use crate::export::{ExportFormat, MenuFocus};
use crate::layout::{DragState, PointerId};
use crate::ui::screen::{self, HeaderButton, Region};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            Event::FocusLost => Some(Message::WindowBlur),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }

        if model.alert.is_some() {
            return matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' '))
                .then_some(Message::DismissAlert);
        }

        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if model.export.menu().is_open() {
            return match key.code {
                KeyCode::Esc => Some(Message::CloseDownloadMenu { return_focus: true }),
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Some(Message::MenuFocusNext),
                KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                    Some(Message::MenuFocusPrevious)
                }
                KeyCode::Enter | KeyCode::Char(' ') => Some(Message::MenuActivate),
                KeyCode::Char('d') => Some(Message::ToggleDownloadMenu),
                KeyCode::Char('q') => Some(Message::Quit),
                _ => None,
            };
        }

        if model.sidebar.editing {
            return match key.code {
                KeyCode::Esc => Some(Message::ClearFilter),
                KeyCode::Enter => Some(Message::FinishFilter),
                KeyCode::Down => Some(Message::SidebarDown),
                KeyCode::Up => Some(Message::SidebarUp),
                KeyCode::Backspace => {
                    let mut next = model.sidebar.query.clone();
                    next.pop();
                    Some(Message::FilterInput(next))
                }
                KeyCode::Char(c) if !ctrl => {
                    let mut next = model.sidebar.query.clone();
                    next.push(c);
                    Some(Message::FilterInput(next))
                }
                _ => None,
            };
        }

        if model.sidebar_focused {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => return Some(Message::SidebarDown),
                KeyCode::Char('k') | KeyCode::Up => return Some(Message::SidebarUp),
                KeyCode::Enter | KeyCode::Char(' ' | 'l') => {
                    return Some(Message::SidebarActivate);
                }
                KeyCode::Esc => return Some(Message::SwitchFocus),
                _ => {}
            }
        }

        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('[') => Some(Message::PreviousDocument),
            KeyCode::Char(']') => Some(Message::NextDocument),
            KeyCode::Char('/') => Some(Message::StartFilter),
            KeyCode::Char('d') if ctrl => Some(Message::HalfPageDown),
            KeyCode::Char('u') if ctrl => Some(Message::HalfPageUp),
            KeyCode::Char('l') if ctrl => Some(Message::Redraw),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Char(' ') | KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Char('b') | KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::ScrollTableLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::ScrollTableRight),
            KeyCode::Char('t') => Some(Message::ToggleTheme),
            KeyCode::Char('d') => Some(Message::ToggleDownloadMenu),
            KeyCode::Enter if model.export.menu().focus() == MenuFocus::Trigger => {
                Some(Message::ToggleDownloadMenu)
            }
            KeyCode::Tab => Some(Message::SwitchFocus),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        let (col, row) = (mouse.column, mouse.row);
        let pressed = match mouse.kind {
            MouseEventKind::Down(button) => Some(button),
            _ => None,
        };

        if model.alert.is_some() {
            return pressed.map(|_| Message::DismissAlert);
        }
        if model.help_visible {
            return pressed.map(|_| Message::HideHelp);
        }

        // Any release ends the drag, even from a button that did not start it.
        if let DragState::Dragging { .. } = model.resizer.drag_state() {
            return match mouse.kind {
                MouseEventKind::Drag(button) => Some(Message::DragTo(pointer_for(button), col)),
                MouseEventKind::Up(_) => Some(Message::EndDrag),
                _ => None,
            };
        }

        let layout = model.layout();
        let (width, height) = model.terminal_size;
        let screen_area = Rect::new(0, 0, width, height);
        let buttons = crate::ui::header_buttons(model, layout.header);

        if model.export.menu().is_open() {
            let Some(button) = pressed else {
                return None;
            };
            let dropdown = screen::dropdown_rect(buttons.download, screen_area);
            if let Some(item) = screen::dropdown_item_at(dropdown, col, row) {
                return ExportFormat::ALL.get(item).map(|&format| Message::Export(format));
            }
            if button == MouseButton::Left
                && buttons.button_at(col, row) == Some(HeaderButton::Download)
            {
                return Some(Message::ToggleDownloadMenu);
            }
            return Some(Message::CloseDownloadMenu {
                return_focus: false,
            });
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match layout.region_at(col, row) {
                Region::Header => match buttons.button_at(col, row)? {
                    HeaderButton::Previous => Some(Message::PreviousDocument),
                    HeaderButton::Next => Some(Message::NextDocument),
                    HeaderButton::Theme => Some(Message::ToggleTheme),
                    HeaderButton::Download => Some(Message::ToggleDownloadMenu),
                },
                Region::Divider => Some(Message::BeginDrag(pointer_for(MouseButton::Left))),
                Region::Sidebar => match layout.sidebar_row(col, row) {
                    Some(offset) => Some(Message::SidebarClick(model.sidebar.scroll + offset)),
                    None if row == layout.sidebar_list().y.saturating_sub(1) => {
                        Some(Message::StartFilter)
                    }
                    None => None,
                },
                _ => None,
            },
            MouseEventKind::ScrollDown => match layout.region_at(col, row) {
                Region::Sidebar => Some(Message::SidebarDown),
                _ => Some(Message::ScrollDown(3)),
            },
            MouseEventKind::ScrollUp => match layout.region_at(col, row) {
                Region::Sidebar => Some(Message::SidebarUp),
                _ => Some(Message::ScrollUp(3)),
            },
            MouseEventKind::ScrollLeft => Some(Message::ScrollTableLeft),
            MouseEventKind::ScrollRight => Some(Message::ScrollTableRight),
            _ => None,
        }
    }
}

/// Terminals report buttons, not pointer ids; each button acts as its own pointer.
const fn pointer_for(button: MouseButton) -> PointerId {
    match button {
        MouseButton::Left => PointerId(0),
        MouseButton::Right => PointerId(1),
        MouseButton::Middle => PointerId(2),
    }
}
