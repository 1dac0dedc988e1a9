//! Scroll position of the suggestion list
//!
//! `scroll_into_view` aligns the requested row to the nearest edge of the
//! visible window; `step` then eases the drawn offset toward that target a
//! few rows per frame instead of jumping.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SuggestionViewport {
    /// First row currently drawn
    offset: usize,
    /// First row the viewport is moving to
    target: usize,
    /// Rows that fit in the panel
    height: usize,
}

impl SuggestionViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the top, used whenever the result list is replaced
    pub fn reset(&mut self) {
        self.offset = 0;
        self.target = 0;
    }

    /// Update the visible height after a layout change
    pub fn set_height(&mut self, height: usize, len: usize) {
        self.height = height;
        let max_offset = len.saturating_sub(height);
        self.target = self.target.min(max_offset);
        self.offset = self.offset.min(max_offset);
    }

    /// Nearest-edge alignment of `index`
    pub fn scroll_into_view(&mut self, index: usize) {
        if self.height == 0 {
            self.target = index;
            return;
        }
        if index < self.target {
            self.target = index;
        } else if index >= self.target + self.height {
            self.target = index + 1 - self.height;
        }
    }

    /// Move half the remaining distance (at least one row). Returns whether
    /// the offset changed.
    pub fn step(&mut self) -> bool {
        if self.offset == self.target {
            return false;
        }
        let distance = self.offset.abs_diff(self.target);
        let delta = (distance + 1) / 2;
        if self.offset < self.target {
            self.offset += delta;
        } else {
            self.offset -= delta;
        }
        true
    }

    pub fn is_settled(&self) -> bool {
        self.offset == self.target
    }

    /// Row range to draw for a list of `len` rows
    pub fn visible_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        let end = (start + self.height).min(len);
        start..end
    }
}
