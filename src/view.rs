//! Sort/filter engine.
//!
//! The engine never reorders the host's rows. It derives a [`DisplayOrder`]: the
//! permutation of logical row indices the user sees after sorting, filtering and hiding.
//! Every edit is addressed through the logical index, so display position and logical
//! row are never confused.

pub mod sort;

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kinds::CellRegistry;
use crate::model::data::GridData;
use sort::{sort_rows, SortColumn, PARALLEL_THRESHOLD};

/// Per-column allow-sets of raw (copy text) values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    allowed: BTreeMap<usize, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `col` to `values`. Replaces any earlier filter on that column.
    pub fn allow<I, S>(&mut self, col: usize, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.insert(col, values.into_iter().map(Into::into).collect());
    }

    pub fn clear_column(&mut self, col: usize) {
        self.allowed.remove(&col);
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.allowed.keys().copied()
    }

    /// A row is visible iff it passes every active column filter.
    pub fn matches(&self, data: &GridData, registry: &CellRegistry, row: usize) -> bool {
        self.allowed.iter().all(|(&col, allowed)| {
            data.get_cell(col, row)
                .map(|cell| allowed.contains(registry.copy(cell).trim()))
                .unwrap_or(false)
        })
    }
}

/// Display position <-> logical row mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOrder {
    rows: Vec<usize>,
    positions: Vec<Option<usize>>,
}

impl DisplayOrder {
    /// Every row in logical order
    pub fn identity(row_count: usize) -> Self {
        Self::from_rows((0..row_count).collect(), row_count)
    }

    fn from_rows(rows: Vec<usize>, row_count: usize) -> Self {
        let mut positions = vec![None; row_count];
        for (display, &logical) in rows.iter().enumerate() {
            if let Some(slot) = positions.get_mut(logical) {
                *slot = Some(display);
            }
        }
        Self { rows, positions }
    }

    /// Sort, then drop rows failing `filter`, then drop `hidden` rows.
    pub fn compute(
        data: &GridData,
        registry: &CellRegistry,
        sort: &[SortColumn],
        filter: &FilterSpec,
        hidden: &BTreeSet<usize>,
    ) -> Self {
        let row_count = data.row_count();
        let sorted = sort_rows(data, registry, sort, (0..row_count).collect());

        let keep = |&row: &usize| !hidden.contains(&row) && (filter.is_empty() || filter.matches(data, registry, row));
        let rows: Vec<usize> = if row_count >= PARALLEL_THRESHOLD {
            sorted.into_par_iter().filter(keep).collect()
        } else {
            sorted.into_iter().filter(keep).collect()
        };

        debug!(
            rows = row_count,
            visible = rows.len(),
            sort_keys = sort.len(),
            filters = filter.allowed.len(),
            hidden = hidden.len(),
            "display order recomputed"
        );
        Self::from_rows(rows, row_count)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Logical rows in display order
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn logical(&self, display: usize) -> Option<usize> {
        self.rows.get(display).copied()
    }

    pub fn display(&self, logical: usize) -> Option<usize> {
        self.positions.get(logical).copied().flatten()
    }

    pub fn is_visible(&self, logical: usize) -> bool {
        self.display(logical).is_some()
    }

    pub fn last(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    /// Display position `jump` rows below `start`, clamped to the last row.
    pub fn jump_down(&self, start: usize, jump: usize) -> usize {
        (start + jump).min(self.rows.len().saturating_sub(1))
    }

    pub fn jump_up(&self, start: usize, jump: usize) -> usize {
        start.saturating_sub(jump)
    }
}

/// Display permutation of columns (drag reorder). Column ids and logical indices are unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    order: Vec<usize>,
}

impl ColumnOrder {
    pub fn identity(col_count: usize) -> Self {
        Self {
            order: (0..col_count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn logical(&self, display: usize) -> Option<usize> {
        self.order.get(display).copied()
    }

    pub fn display(&self, logical: usize) -> Option<usize> {
        self.order.iter().position(|&c| c == logical)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Move the column at display position `from` to display position `to`.
    /// Returns false (and changes nothing) when either index is out of range.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from >= self.order.len() || to >= self.order.len() {
            return false;
        }
        let col = self.order.remove(from);
        self.order.insert(to, col);
        true
    }
}

#[cfg(test)]
mod test;
