use crate::model::cell::Cell;
use crate::model::data::GridData;
use crate::model::Item;

use super::EditSource;

/// One cell replacement. `col`/`row` are logical indices.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub col: usize,
    pub row: usize,
    pub previous: Cell,
    pub new: Cell,
}

impl CellChange {
    pub fn item(&self) -> Item {
        Item::new(self.col, self.row)
    }

    fn inverse(&self) -> CellChange {
        CellChange {
            col: self.col,
            row: self.row,
            previous: self.new.clone(),
            new: self.previous.clone(),
        }
    }
}

/// An atomic batch of cell replacements, undone and redone as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    source: EditSource,
    changes: Vec<CellChange>,
}

impl UndoEntry {
    /// `None` when there is nothing to record
    pub fn new(source: EditSource, changes: Vec<CellChange>) -> Option<Self> {
        if changes.is_empty() {
            None
        } else {
            Some(Self { source, changes })
        }
    }

    pub fn source(&self) -> EditSource {
        self.source
    }

    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Logical addresses touched by this entry
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.changes.iter().map(CellChange::item)
    }

    /// The entry that undoes this one. Changes run in reverse so repeated writes to the
    /// same cell unwind to the oldest previous value.
    pub fn inverse(&self) -> UndoEntry {
        UndoEntry {
            source: self.source,
            changes: self.changes.iter().rev().map(CellChange::inverse).collect(),
        }
    }

    pub fn apply(&self, data: &mut GridData) {
        for change in &self.changes {
            data.set_cell(change.col, change.row, change.new.clone());
        }
    }

    pub fn revert(&self, data: &mut GridData) {
        self.inverse().apply(data);
    }
}

/// Collects the replacements of one user-visible edit.
#[derive(Debug, Default)]
pub struct EditBatch {
    changes: Vec<CellChange>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a replacement; no-ops (identical cells) are skipped.
    pub fn push(&mut self, col: usize, row: usize, previous: Cell, new: Cell) {
        if previous != new {
            self.changes.push(CellChange { col, row, previous, new });
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn finish(self, source: EditSource) -> Option<UndoEntry> {
        UndoEntry::new(source, self.changes)
    }
}
