use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const TILE_WIDTH: u16 = 24;
pub const TILE_HEIGHT: u16 = 3;

pub struct MainLayout {
    pub header_area: Rect,
    pub body_area: Rect,
    pub footer_area: Rect,
}

pub fn get_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Tiles
            Constraint::Length(1), // Footer
        ])
        .split(area);

    MainLayout {
        header_area: chunks[0],
        body_area: chunks[1],
        footer_area: chunks[2],
    }
}

/// Tile grid geometry for one frame. Rows scroll; columns follow the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub area: Rect,
    pub columns: usize,
    pub visible_rows: usize,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(Rect::default())
    }
}

impl Grid {
    pub fn new(area: Rect) -> Self {
        Self {
            area,
            columns: usize::from(area.width / TILE_WIDTH).max(1),
            visible_rows: usize::from(area.height / TILE_HEIGHT).max(1),
        }
    }

    pub fn total_rows(&self, count: usize) -> usize {
        count.div_ceil(self.columns)
    }

    pub fn max_scroll(&self, count: usize) -> usize {
        self.total_rows(count).saturating_sub(self.visible_rows)
    }

    /// Screen rect of tile `index`, or `None` when scrolled out of view.
    pub fn tile_rect(&self, index: usize, scroll_row: usize) -> Option<Rect> {
        let row = index / self.columns;
        let col = index % self.columns;
        if row < scroll_row || row >= scroll_row + self.visible_rows {
            return None;
        }

        let x = self.area.x + col as u16 * TILE_WIDTH;
        let y = self.area.y + (row - scroll_row) as u16 * TILE_HEIGHT;
        let rect = Rect::new(x, y, TILE_WIDTH, TILE_HEIGHT).intersection(self.area);
        (!rect.is_empty()).then_some(rect)
    }

    /// Index of the tile under a screen cell.
    pub fn tile_at(&self, x: u16, y: u16, scroll_row: usize, count: usize) -> Option<usize> {
        let inside = x >= self.area.x
            && x < self.area.x + self.area.width
            && y >= self.area.y
            && y < self.area.y + self.area.height;
        if !inside {
            return None;
        }

        let col = usize::from((x - self.area.x) / TILE_WIDTH);
        if col >= self.columns {
            return None;
        }
        let row = usize::from((y - self.area.y) / TILE_HEIGHT) + scroll_row;
        let index = row * self.columns + col;
        (index < count).then_some(index)
    }

    /// Smallest scroll change that brings `index` into view.
    pub fn scroll_to_show(&self, index: usize, scroll_row: usize) -> usize {
        let row = index / self.columns;
        if row < scroll_row {
            row
        } else if row >= scroll_row + self.visible_rows {
            row + 1 - self.visible_rows
        } else {
            scroll_row
        }
    }
}
