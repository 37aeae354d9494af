//! Sidebar width and the divider drag state machine.
//!
//! Widths are measured in terminal columns but kept as `f32` so stored
//! values round-trip exactly.

/// Terminals narrower than this stack the sidebar above the content and
/// disable dragging.
pub const NARROW_BREAKPOINT: u16 = 80;

/// Allowed sidebar widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SidebarBounds {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl Default for SidebarBounds {
    fn default() -> Self {
        Self {
            min: 16.0,
            max: 60.0,
            default: 28.0,
        }
    }
}

impl SidebarBounds {
    pub fn clamp(&self, width: f32) -> f32 {
        width.clamp(self.min, self.max)
    }

    /// Parse a stored width. Anything that is not a finite number yields
    /// the default; finite numbers are clamped.
    pub fn restore(&self, stored: Option<&str>) -> f32 {
        stored
            .and_then(|raw| raw.trim().parse::<f32>().ok())
            .filter(|width| width.is_finite())
            .map_or(self.default, |width| self.clamp(width))
    }
}

/// Identifies the pointer that owns a drag. Terminals report mouse buttons
/// rather than pointer ids, so the button plays that role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging { pointer: PointerId },
}

/// Why a drag could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejected {
    Narrow,
    AlreadyDragging,
}

/// Owns the sidebar width and any drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Resizer {
    bounds: SidebarBounds,
    width: f32,
    drag: DragState,
    narrow: bool,
}

impl Resizer {
    pub fn new(bounds: SidebarBounds, stored: Option<&str>, viewport_width: u16) -> Self {
        Self {
            width: bounds.restore(stored),
            bounds,
            drag: DragState::Idle,
            narrow: is_narrow(viewport_width),
        }
    }

    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Sidebar width in whole columns.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn columns(&self) -> u16 {
        // Bounded by SidebarBounds, which sits far inside u16.
        self.width.round() as u16
    }

    pub const fn bounds(&self) -> SidebarBounds {
        self.bounds
    }

    pub const fn is_narrow(&self) -> bool {
        self.narrow
    }

    pub const fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub const fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Start dragging the divider with `pointer`.
    ///
    /// # Errors
    ///
    /// Refused while the viewport is narrow or another drag is active.
    pub const fn begin_drag(&mut self, pointer: PointerId) -> Result<(), DragRejected> {
        if self.narrow {
            return Err(DragRejected::Narrow);
        }
        if self.is_dragging() {
            return Err(DragRejected::AlreadyDragging);
        }
        self.drag = DragState::Dragging { pointer };
        Ok(())
    }

    /// Apply a pointer position during a drag. Returns the applied width, or
    /// `None` when no drag owned by `pointer` is active.
    pub fn pointer_move(&mut self, pointer: PointerId, x: f32) -> Option<f32> {
        match self.drag {
            DragState::Dragging { pointer: owner } if owner == pointer => {
                self.width = self.bounds.clamp(x);
                Some(self.width)
            }
            _ => None,
        }
    }

    /// Finish the drag. Returns the width to persist, or `None` when no drag
    /// was active.
    pub const fn end_drag(&mut self) -> Option<f32> {
        if !self.is_dragging() {
            return None;
        }
        self.drag = DragState::Idle;
        Some(self.width)
    }

    /// Track the viewport width. Becoming narrow mid-drag ends the drag and
    /// returns the width to persist.
    pub fn set_viewport_width(&mut self, viewport_width: u16) -> Option<f32> {
        self.narrow = is_narrow(viewport_width);
        if self.narrow { self.end_drag() } else { None }
    }
}

pub const fn is_narrow(viewport_width: u16) -> bool {
    viewport_width < NARROW_BREAKPOINT
}
