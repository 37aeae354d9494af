//! Selection state over the catalog.

use crate::catalog::{Catalog, DocumentRef};

/// Label shown on the previous button when the first document is selected.
pub const START_LABEL: &str = "◀ Start";
/// Label shown on the next button when the last document is selected.
pub const END_LABEL: &str = "End ▶";

/// Tracks which document is selected.
///
/// The index is always valid for the catalog it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigator {
    current: usize,
}

impl Navigator {
    pub const fn new() -> Self {
        Self { current: 0 }
    }

    pub const fn current(&self) -> usize {
        self.current
    }

    pub fn current_document<'a>(&self, catalog: &'a Catalog) -> &'a DocumentRef {
        catalog.get(self.current).unwrap_or_else(|| catalog.first())
    }

    /// Select the document with `identifier`.
    ///
    /// Unknown identifiers are ignored and yield `None`.
    pub fn select_by_identifier(&mut self, catalog: &Catalog, identifier: &str) -> Option<usize> {
        let index = catalog.position_of(identifier)?;
        self.current = index;
        Some(index)
    }

    pub fn has_next(&self, catalog: &Catalog) -> bool {
        self.current + 1 < catalog.len()
    }

    /// Step back one document. Returns `None` at the start of the deck.
    pub fn select_previous(&mut self) -> Option<usize> {
        let index = self.current.checked_sub(1)?;
        self.current = index;
        Some(index)
    }

    /// Step forward one document. Returns `None` at the end of the deck.
    pub fn select_next(&mut self, catalog: &Catalog) -> Option<usize> {
        if !self.has_next(catalog) {
            return None;
        }
        self.current += 1;
        Some(self.current)
    }

    /// Presentation state of the previous/next controls.
    pub fn pager(&self, catalog: &Catalog) -> Pager {
        let previous = self
            .current
            .checked_sub(1)
            .and_then(|idx| catalog.get(idx))
            .map_or_else(
                || PagerButton::disabled(START_LABEL),
                |doc| PagerButton::enabled(format!("◀ {}", doc.label()), doc.identifier()),
            );
        let next = catalog.get(self.current + 1).map_or_else(
            || PagerButton::disabled(END_LABEL),
            |doc| PagerButton::enabled(format!("{} ▶", doc.label()), doc.identifier()),
        );
        Pager { previous, next }
    }
}

/// Both paging controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub previous: PagerButton,
    pub next: PagerButton,
}

/// One paging control: its label and, when enabled, the document it opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerButton {
    pub label: String,
    pub target: Option<String>,
}

impl PagerButton {
    fn enabled(label: String, target: &str) -> Self {
        Self {
            label,
            target: Some(target.to_string()),
        }
    }

    fn disabled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            target: None,
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Catalog {
        Catalog::new(["A.md", "B.md", "C.md"]).unwrap()
    }

    #[test]
    fn test_initial_selection_disables_previous() {
        let catalog = deck();
        let nav = Navigator::new();
        let pager = nav.pager(&catalog);
        assert!(!pager.previous.is_enabled());
        assert_eq!(pager.previous.label, "◀ Start");
        assert!(pager.next.is_enabled());
        assert_eq!(pager.next.target.as_deref(), Some("B.md"));
        assert_eq!(pager.next.label, "B ▶");
    }

    #[test]
    fn test_select_last_disables_next() {
        let catalog = deck();
        let mut nav = Navigator::new();
        assert_eq!(nav.select_by_identifier(&catalog, "C.md"), Some(2));
        let pager = nav.pager(&catalog);
        assert_eq!(pager.previous.target.as_deref(), Some("B.md"));
        assert_eq!(pager.previous.label, "◀ B");
        assert!(!pager.next.is_enabled());
        assert_eq!(pager.next.label, "End ▶");
    }

    #[test]
    fn test_unknown_identifier_is_ignored() {
        let catalog = deck();
        let mut nav = Navigator::new();
        nav.select_by_identifier(&catalog, "B.md");
        assert_eq!(nav.select_by_identifier(&catalog, "nope.md"), None);
        assert_eq!(nav.current(), 1);
    }

    #[test]
    fn test_boundaries_leave_index_unchanged() {
        let catalog = deck();
        let mut nav = Navigator::new();
        assert_eq!(nav.select_previous(), None);
        assert_eq!(nav.current(), 0);

        nav.select_by_identifier(&catalog, "C.md");
        assert_eq!(nav.select_next(&catalog), None);
        assert_eq!(nav.current(), 2);
    }

    #[test]
    fn test_step_through_deck() {
        let catalog = deck();
        let mut nav = Navigator::new();
        assert_eq!(nav.select_next(&catalog), Some(1));
        assert_eq!(nav.select_next(&catalog), Some(2));
        assert_eq!(nav.select_previous(), Some(1));
        assert_eq!(nav.current_document(&catalog).identifier(), "B.md");
    }

    #[test]
    fn test_single_document_deck_has_no_paging() {
        let catalog = Catalog::new(["Only.md"]).unwrap();
        let nav = Navigator::new();
        let pager = nav.pager(&catalog);
        assert!(!pager.previous.is_enabled());
        assert!(!pager.next.is_enabled());
    }
}
