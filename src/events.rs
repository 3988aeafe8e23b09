//! Events the grid reports to its host.
//!
//! Cell addresses in events are logical (`col` is the column index in the data,
//! `row` the logical row) unless a field says otherwise.

use std::collections::BTreeSet;

use crate::model::cell::Cell;
use crate::model::{Item, Rect};
use crate::view::sort::SortColumn;
use crate::viewport::VisibleRegion;

/// One entry of a batch edit
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub item: Item,
    pub value: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverKind {
    Cell,
    Header,
    GroupHeader,
    RowMarker,
    OutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A single committed edit. A rejected edit reports the previous value.
    CellEdited { col: usize, row: usize, value: Cell },
    CellsEdited { edits: Vec<CellEdit>, count: usize },
    CellClicked { col: usize, row: usize },
    CellActivated { col: usize, row: usize },
    CellContextMenu { col: usize, row: usize },
    HeaderClicked { col: usize },
    HeaderMenuClicked { col: usize },
    /// Display positions
    ColumnMoved { start_index: usize, end_index: usize },
    /// Display positions; the host owns row order
    RowMoved { start_index: usize, end_index: usize },
    ColumnResized { col: usize, width: f32 },
    SelectedCell { item: Option<Item> },
    SelectedRows { rows: BTreeSet<usize> },
    /// Display coordinates
    SelectedRange { range: Option<Rect> },
    /// Logical column indices
    SelectedColumns { columns: BTreeSet<usize> },
    SortColumns { columns: Vec<SortColumn> },
    VisibleRegion(VisibleRegion),
    ItemHovered {
        kind: HoverKind,
        col: Option<usize>,
        row: Option<usize>,
        is_fill_handle: bool,
    },
    CanUndo(bool),
    CanRedo(bool),
    UndoRedoPerformed { action: HistoryAction },
    DeletePressed {
        cells: Vec<Item>,
        rows: BTreeSet<usize>,
        columns: BTreeSet<usize>,
    },
    /// Ctrl+F: the host opens its search UI
    SearchRequested,
    /// A context-menu item delegated to the host
    HostAction { id: String, col: usize, row: Option<usize> },
}
