use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use super::cell::Cell;
use super::column::Column;
use super::Item;
use crate::error::{GridError, Result};

/// Row storage. Rows are shared between snapshots and copied only when written.
pub type Row = Arc<Vec<Cell>>;

/// Immutable-by-convention snapshot of the host's columns and rows.
///
/// Rows are addressed by their logical index, which never changes with sort, filter
/// or hide state. Writing a cell clones only the affected row (`Arc::make_mut`), so a
/// snapshot handed out earlier keeps its values.
#[derive(Debug, Clone, Default)]
pub struct GridData {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl GridData {
    /// Build a snapshot, failing fast on shapes the engine cannot render.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(GridError::NoColumns);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.id.as_str()) {
                return Err(GridError::DuplicateColumnId(col.id.clone()));
            }
        }

        for (idx, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(GridError::RowShape {
                    row: idx,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }

        Ok(Self {
            columns,
            rows: rows.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get_cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    pub fn get_row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Replace one cell. Out-of-range writes are ignored.
    pub fn set_cell(&mut self, col: usize, row: usize, cell: Cell) {
        if let Some(row_data) = self.rows.get_mut(row) {
            if let Some(slot) = Arc::make_mut(row_data).get_mut(col) {
                *slot = cell;
            }
        }
    }

    /// Whether two snapshots share the storage of `row`
    pub fn shares_row(&self, other: &GridData, row: usize) -> bool {
        match (self.rows.get(row), other.rows.get(row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The span a cell participates in, if it is well formed.
    ///
    /// A span is honoured only when it contains `col`, stays inside the grid, and every
    /// covered cell reports the identical bounds. Anything else renders unspanned.
    pub fn effective_span(&self, col: usize, row: usize) -> Option<(usize, usize)> {
        let cells = self.rows.get(row)?;
        let (start, end) = cells.get(col)?.span?;

        if start > end || col < start || col > end || end >= cells.len() {
            return None;
        }
        if start == end {
            return None;
        }

        let consistent = cells[start..=end].iter().all(|c| c.span == Some((start, end)));
        if consistent {
            Some((start, end))
        } else {
            None
        }
    }

    /// Cells declaring a span that [`GridData::effective_span`] refuses.
    pub fn span_violations(&self) -> Vec<Item> {
        let mut out = Vec::new();
        for (row, cells) in self.rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some((start, end)) = cell.span {
                    if start != end && self.effective_span(col, row).is_none() {
                        out.push(Item { col, row });
                    }
                }
            }
        }
        if !out.is_empty() {
            warn!(count = out.len(), "malformed cell spans rendered unspanned");
        }
        out
    }
}
