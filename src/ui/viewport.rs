//! Scroll state of the content pane.
//!
//! Rows scroll the whole document. Columns only apply to table scroll
//! regions, which keep their natural width and may overflow the pane.

use std::ops::Range;

/// Visible window onto the rendered document.
///
/// # Example
///
/// ```
/// use notedeck::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(60, 20, 100);
/// vp.scroll_down(10);
/// assert_eq!(vp.visible_range(), 10..30);
///
/// vp.set_region_width(90);
/// vp.scroll_right(50);
/// assert_eq!(vp.column(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
    column: usize,
    region_width: usize,
}

impl Viewport {
    /// `width` and `height` are the pane's inner size in cells.
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
            column: 0,
            region_width: 0,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Horizontal offset applied to table scroll regions.
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Document lines currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.total_lines);
        self.offset.min(end)..end
    }

    /// How far down the document the pane is, 0-100.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max as f64) * 100.0).round() as u8
        }
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = (self.offset + n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.height as usize);
    }

    pub const fn half_page_up(&mut self) {
        self.scroll_up(self.height as usize / 2);
    }

    pub fn half_page_down(&mut self) {
        self.scroll_down(self.height as usize / 2);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub const fn scroll_left(&mut self, n: usize) {
        self.column = self.column.saturating_sub(n);
    }

    pub fn scroll_right(&mut self, n: usize) {
        self.column = (self.column + n).min(self.max_column());
    }

    /// Width of the widest scroll region in the current document.
    pub fn set_region_width(&mut self, width: usize) {
        self.region_width = width;
        self.column = self.column.min(self.max_column());
    }

    /// Back to the top-left corner.
    pub const fn reset(&mut self) {
        self.offset = 0;
        self.column = 0;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
        self.column = self.column.min(self.max_column());
    }

    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }

    const fn max_column(&self) -> usize {
        self.region_width.saturating_sub(self.width as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_viewport_starts_top_left() {
        let vp = Viewport::new(60, 20, 100);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.column(), 0);
        assert_eq!(vp.visible_range(), 0..20);
    }

    #[test]
    fn test_short_document_is_fully_visible() {
        let mut vp = Viewport::new(60, 20, 5);
        vp.scroll_down(10);
        assert_eq!(vp.visible_range(), 0..5);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_scroll_down_clamps_to_last_page() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 80);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_paging() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.page_down();
        assert_eq!(vp.offset(), 20);
        vp.half_page_down();
        assert_eq!(vp.offset(), 30);
        vp.page_up();
        assert_eq!(vp.offset(), 10);
        vp.half_page_up();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_go_to_top_and_bottom() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.go_to_bottom();
        assert_eq!(vp.visible_range(), 80..100);
        vp.go_to_top();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_horizontal_scroll_needs_an_overflowing_region() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.scroll_right(10);
        assert_eq!(vp.column(), 0);

        vp.set_region_width(75);
        vp.scroll_right(10);
        assert_eq!(vp.column(), 10);
        vp.scroll_right(10);
        assert_eq!(vp.column(), 15);
        vp.scroll_left(100);
        assert_eq!(vp.column(), 0);
    }

    #[test]
    fn test_widening_pane_pulls_column_back() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.set_region_width(90);
        vp.scroll_right(30);
        vp.resize(80, 20);
        assert_eq!(vp.column(), 10);
    }

    #[test]
    fn test_reset_returns_to_origin() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.set_region_width(90);
        vp.scroll_down(40);
        vp.scroll_right(5);
        vp.reset();
        assert_eq!((vp.offset(), vp.column()), (0, 0));
    }

    #[test]
    fn test_shrinking_document_clamps_offset() {
        let mut vp = Viewport::new(60, 20, 100);
        vp.scroll_down(70);
        vp.set_total_lines(50);
        assert_eq!(vp.offset(), 30);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_stays_in_bounds(
                total in 0..5000usize,
                height in 1..100u16,
                down in 0..10000usize,
                up in 0..10000usize,
            ) {
                let mut vp = Viewport::new(60, height, total);
                vp.scroll_down(down);
                vp.scroll_up(up);
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end <= total);
                prop_assert!(vp.scroll_percent() <= 100);
            }

            #[test]
            fn column_never_exceeds_overflow(
                width in 1..200u16,
                region in 0..500usize,
                right in 0..1000usize,
            ) {
                let mut vp = Viewport::new(width, 20, 10);
                vp.set_region_width(region);
                vp.scroll_right(right);
                prop_assert!(vp.column() <= region.saturating_sub(width as usize));
            }
        }
    }
}
