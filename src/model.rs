pub mod cell;
pub mod column;
pub mod data;

use std::cmp;

use serde::{Deserialize, Serialize};

/// A cell address. `col` is a column index, `row` a row index; whether these are
/// display or logical positions depends on the API that hands them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Item {
    pub col: usize,
    pub row: usize,
}

impl Item {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// A rectangle of cells. `x`/`y` are the top-left column/row, `width`/`height` are counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn single(item: Item) -> Self {
        Self::new(item.col, item.row, 1, 1)
    }

    /// Smallest rectangle containing both corners.
    pub fn spanning(a: Item, b: Item) -> Self {
        let x = cmp::min(a.col, b.col);
        let y = cmp::min(a.row, b.row);
        Self {
            x,
            y,
            width: cmp::max(a.col, b.col) - x + 1,
            height: cmp::max(a.row, b.row) - y + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn contains(&self, item: Item) -> bool {
        item.col >= self.x && item.col < self.right() && item.row >= self.y && item.row < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = cmp::min(self.x, other.x);
        let y = cmp::min(self.y, other.y);
        Rect {
            x,
            y,
            width: cmp::max(self.right(), other.right()) - x,
            height: cmp::max(self.bottom(), other.bottom()) - y,
        }
    }

    /// Clamp to a grid of `cols` x `rows`. May return an empty rect.
    pub fn clamp_to(&self, cols: usize, rows: usize) -> Rect {
        let x = self.x.min(cols);
        let y = self.y.min(rows);
        Rect {
            x,
            y,
            width: self.right().min(cols) - x,
            height: self.bottom().min(rows) - y,
        }
    }

    /// Cells in row-major order
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        (self.y..self.bottom()).flat_map(move |row| (self.x..self.right()).map(move |col| Item { col, row }))
    }
}

/// A rectangle in pixels on the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    /// Shrink by `dx` on the left/right and `dy` on the top/bottom.
    pub fn inset(&self, dx: f32, dy: f32) -> Bounds {
        Bounds {
            x: self.x + dx,
            y: self.y + dy,
            width: (self.width - 2.0 * dx).max(0.0),
            height: (self.height - 2.0 * dy).max(0.0),
        }
    }
}

#[cfg(test)]
mod test;
