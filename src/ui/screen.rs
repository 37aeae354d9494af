//! Screen geometry shared by drawing and mouse hit-testing.

use ratatui::layout::Rect;
use ratatui::widgets::Block;
use unicode_width::UnicodeWidthStr;

/// Rows given to the sidebar when it is stacked above the content.
pub const STACKED_SIDEBAR_ROWS: u16 = 8;

/// Width of the download dropdown, borders included.
pub const DROPDOWN_WIDTH: u16 = 20;
const DROPDOWN_HEIGHT: u16 = 4;

/// Label on the download trigger.
pub const DOWNLOAD_LABEL: &str = "Download ▾";

/// Top-level regions of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub sidebar: Rect,
    /// Absent in the stacked layout.
    pub divider: Option<Rect>,
    pub content: Rect,
    pub status: Rect,
}

/// What a screen cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Header,
    Sidebar,
    Divider,
    Content,
    Status,
    Outside,
}

impl ScreenLayout {
    /// Split `area` for a sidebar of `sidebar_cols` columns.
    pub fn compute(area: Rect, sidebar_cols: u16, narrow: bool) -> Self {
        let header = Rect { height: area.height.min(1), ..area };
        let status = Rect {
            y: area.bottom().saturating_sub(1).max(header.bottom()),
            height: area.height.saturating_sub(1).min(1),
            ..area
        };
        let body = Rect {
            y: header.bottom(),
            height: status.y.saturating_sub(header.bottom()),
            ..area
        };

        if narrow {
            let rows = STACKED_SIDEBAR_ROWS.min(body.height / 2);
            let sidebar = Rect { height: rows, ..body };
            let content = Rect {
                y: body.y + rows,
                height: body.height - rows,
                ..body
            };
            return Self {
                header,
                sidebar,
                divider: None,
                content,
                status,
            };
        }

        let cols = sidebar_cols.min(body.width.saturating_sub(1));
        let sidebar = Rect { width: cols, ..body };
        let divider = Rect {
            x: body.x + cols,
            width: body.width.saturating_sub(cols).min(1),
            ..body
        };
        let content = Rect {
            x: divider.right(),
            width: body.right().saturating_sub(divider.right()),
            ..body
        };
        Self {
            header,
            sidebar,
            divider: Some(divider),
            content,
            status,
        }
    }

    /// Inside of the bordered content pane.
    pub fn content_inner(&self) -> Rect {
        Block::bordered().inner(self.content)
    }

    /// Rows of the sidebar that list documents.
    pub fn sidebar_list(&self) -> Rect {
        let inner = Block::bordered().inner(self.sidebar);
        Rect {
            y: inner.y + 1,
            height: inner.height.saturating_sub(1),
            ..inner
        }
    }

    /// Row of the sidebar list under `row`, counted from the first visible entry.
    pub fn sidebar_row(&self, column: u16, row: u16) -> Option<usize> {
        let list = self.sidebar_list();
        contains(list, column, row).then(|| usize::from(row - list.y))
    }

    pub fn region_at(&self, column: u16, row: u16) -> Region {
        if contains(self.header, column, row) {
            Region::Header
        } else if self.divider.is_some_and(|d| contains(d, column, row)) {
            Region::Divider
        } else if contains(self.sidebar, column, row) {
            Region::Sidebar
        } else if contains(self.content, column, row) {
            Region::Content
        } else if contains(self.status, column, row) {
            Region::Status
        } else {
            Region::Outside
        }
    }
}

/// Header buttons, laid out right to left from the header's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderButtons {
    pub previous: Rect,
    pub next: Rect,
    pub theme: Rect,
    pub download: Rect,
}

/// Clickable header targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderButton {
    Previous,
    Next,
    Theme,
    Download,
}

impl HeaderButtons {
    /// Buttons render as ` label ` with one blank column between them.
    pub fn compute(header: Rect, previous: &str, next: &str, theme: &str) -> Self {
        let mut right = header.right();
        let mut place = |label: &str| {
            let width = u16::try_from(label.width() + 2).unwrap_or(u16::MAX);
            let x = right.saturating_sub(width).max(header.x);
            let rect = Rect {
                x,
                y: header.y,
                width: right.saturating_sub(x),
                height: header.height,
            };
            right = x.saturating_sub(1);
            rect
        };
        let download = place(DOWNLOAD_LABEL);
        let theme = place(theme);
        let next = place(next);
        let previous = place(previous);
        Self {
            previous,
            next,
            theme,
            download,
        }
    }

    pub fn button_at(&self, column: u16, row: u16) -> Option<HeaderButton> {
        [
            (self.previous, HeaderButton::Previous),
            (self.next, HeaderButton::Next),
            (self.theme, HeaderButton::Theme),
            (self.download, HeaderButton::Download),
        ]
        .into_iter()
        .find(|(rect, _)| rect.width > 0 && contains(*rect, column, row))
        .map(|(_, button)| button)
    }
}

/// Dropdown under the download trigger, right-aligned with it.
pub fn dropdown_rect(trigger: Rect, screen: Rect) -> Rect {
    let width = DROPDOWN_WIDTH.min(screen.width);
    let x = trigger.right().saturating_sub(width).max(screen.x);
    let y = trigger.bottom();
    Rect {
        x,
        y,
        width,
        height: DROPDOWN_HEIGHT.min(screen.bottom().saturating_sub(y)),
    }
}

/// Dropdown option under the cursor.
pub fn dropdown_item_at(dropdown: Rect, column: u16, row: u16) -> Option<usize> {
    let inner = Block::bordered().inner(dropdown);
    contains(inner, column, row).then(|| usize::from(row - inner.y))
}

const fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}
