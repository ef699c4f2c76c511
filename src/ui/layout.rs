//! Gallery grid and click hit-testing
//!
//! Provides:
//! - Row-major card grid with a configurable column count
//! - Keyboard navigation helpers (up/down/left/right/home/end)
//! - Scrolling the visible rows to follow the focused card
//! - A hit map recorded while drawing, used to route mouse clicks

use ratatui::layout::{Position, Rect};
use std::ops::Range;

/// Height of a card in lines, borders included
pub const CARD_HEIGHT: u16 = 5;

/// Grid layout configuration
#[derive(Debug, Clone, Copy)]
pub struct GridLayout {
    /// Number of columns
    pub columns: u16,
    /// Number of visible rows
    pub visible_rows: u16,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            visible_rows: 3,
        }
    }
}

impl GridLayout {
    /// Create a new grid layout
    pub fn new(columns: u16, visible_rows: u16) -> Self {
        Self {
            columns: columns.clamp(1, 8),
            visible_rows: visible_rows.max(1),
        }
    }

    /// Grid that fits `area`, keeping the configured column count
    pub fn fit(columns: u16, area: Rect) -> Self {
        Self::new(columns, area.height / CARD_HEIGHT)
    }

    /// Total number of visible cards (columns × rows)
    pub fn visible_count(&self) -> usize {
        (self.columns as usize) * (self.visible_rows as usize)
    }

    /// Range of cards to draw so the focused card stays in view
    pub fn visible_range(&self, selected: usize, total: usize) -> Range<usize> {
        if total == 0 {
            return 0..0;
        }

        let columns = self.columns as usize;
        let rows = self.visible_rows as usize;
        let selected_row = selected.min(total - 1) / columns;
        let first_row = selected_row.saturating_sub(rows - 1);
        let start = first_row * columns;
        let end = (start + self.visible_count()).min(total);
        start..end
    }

    /// Convert a flat index (relative to the first visible card) to (row, col)
    /// ```text
    /// Index:  0 1 2 3
    ///         4 5 6 7
    /// ```
    pub fn index_to_position(&self, index: usize) -> (u16, u16) {
        let columns = self.columns as usize;
        ((index / columns) as u16, (index % columns) as u16)
    }

    /// Calculate new selection after moving up one row
    pub fn move_up(&self, current: usize) -> usize {
        let columns = self.columns as usize;
        if current >= columns {
            current - columns
        } else {
            current
        }
    }

    /// Calculate new selection after moving down one row
    pub fn move_down(&self, current: usize, total: usize) -> usize {
        let next = current + self.columns as usize;
        if next < total {
            next
        } else {
            current
        }
    }

    /// Calculate new selection after moving left
    pub fn move_left(&self, current: usize) -> usize {
        current.saturating_sub(1)
    }

    /// Calculate new selection after moving right
    pub fn move_right(&self, current: usize, total: usize) -> usize {
        if current + 1 < total {
            current + 1
        } else {
            current
        }
    }

    /// Move to first card
    pub fn move_home(&self) -> usize {
        0
    }

    /// Move to last card
    pub fn move_end(&self, total: usize) -> usize {
        total.saturating_sub(1)
    }
}

/// What a screen region does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Card(usize),
    PageLink(usize),
    ThemeSwitcher,
    OverlayPanel,
    CloseButton,
}

/// Regions recorded during the last draw, topmost last
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    regions: Vec<(Rect, Region)>,
}

impl HitMap {
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    pub fn push(&mut self, area: Rect, region: Region) {
        self.regions.push((area, region));
    }

    /// Topmost region containing the point
    pub fn hit(&self, column: u16, row: u16) -> Option<Region> {
        let pos = Position::new(column, row);
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(pos))
            .map(|(_, region)| *region)
    }
}
