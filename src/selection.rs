//! Selection & range model.
//!
//! Coordinates are display positions except `rows`, which holds logical row indices so a
//! selected row keeps its membership while hidden or filtered out.

pub mod model;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{Item, Rect};

pub use model::{SelectionModel, SelectionTarget};

/// How cells may be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RangeSelect {
    None,
    /// Single cell only
    Cell,
    #[default]
    Rect,
    /// Ctrl-click adds further rectangles
    MultiRect,
    /// An unordered, toggleable set of cells
    Freeform,
}

/// How many rows (or columns) may be selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectCount {
    None,
    Single,
    #[default]
    Multi,
}

/// Click semantics for row/column selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// A modifier is needed to add to the selection; a plain click replaces it
    #[default]
    Auto,
    /// Every click toggles membership
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Blend {
    #[default]
    Exclusive,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Blending {
    pub row: Blend,
    pub column: Blend,
    pub range: Blend,
}

impl Blending {
    pub fn mixed() -> Self {
        Self {
            row: Blend::Mixed,
            column: Blend::Mixed,
            range: Blend::Mixed,
        }
    }

    fn of(&self, category: Category) -> Blend {
        match category {
            Category::Row => self.row,
            Category::Column => self.column,
            Category::Range => self.range,
        }
    }

    /// Whether activating `active` must empty `other`
    pub fn clears(&self, active: Category, other: Category) -> bool {
        active != other && !(self.of(active) == Blend::Mixed && self.of(other) == Blend::Mixed)
    }
}

/// Selection categories subject to blending. Ranges include freeform cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Row,
    Column,
    Range,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Row, Category::Column, Category::Range];
}

/// Snapshot of what is selected.
///
/// The focused cell is not a blending category: it survives row and column selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub current: Option<Item>,
    /// Logical row indices
    pub rows: BTreeSet<usize>,
    /// Display column positions
    pub columns: BTreeSet<usize>,
    /// Rectangles, the last one is the range being extended
    pub ranges: Vec<Rect>,
    /// Freeform cells
    pub cells: BTreeSet<Item>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.rows.is_empty() && self.columns.is_empty() && !self.has_range()
    }

    pub fn has_range(&self) -> bool {
        !self.ranges.is_empty() || !self.cells.is_empty()
    }

    pub fn clear(&mut self, category: Category) {
        match category {
            Category::Row => self.rows.clear(),
            Category::Column => self.columns.clear(),
            Category::Range => {
                self.ranges.clear();
                self.cells.clear();
            }
        }
    }

    /// Apply blending for a selection of `category` that is about to change.
    pub fn activate(&mut self, category: Category, blending: &Blending) {
        for other in Category::ALL {
            if blending.clears(category, other) {
                self.clear(other);
            }
        }
    }

    /// The rectangle edits and copies act on: the active range, else the focused cell.
    pub fn primary_range(&self) -> Option<Rect> {
        if let Some(rect) = self.ranges.last() {
            return Some(*rect);
        }
        if let Some(bounds) = self.cells_bounds() {
            return Some(bounds);
        }
        self.current.map(Rect::single)
    }

    /// Bounding rectangle of the freeform cells
    pub fn cells_bounds(&self) -> Option<Rect> {
        let mut iter = self.cells.iter();
        let first = Rect::single(*iter.next()?);
        Some(iter.fold(first, |acc, item| acc.union(&Rect::single(*item))))
    }

    pub fn range_contains(&self, item: Item) -> bool {
        self.cells.contains(&item) || self.ranges.iter().any(|r| r.contains(item))
    }

    /// Whether `item` (display) on logical row `logical_row` shows as selected.
    pub fn is_selected(&self, item: Item, logical_row: usize) -> bool {
        self.range_contains(item) || self.rows.contains(&logical_row) || self.columns.contains(&item.col)
    }
}
