//! Operations on a [`DataGrid`]: editing, clipboard, fill, history, view changes,
//! search and context menus.
//!
//! Public methods take display addresses unless they say otherwise. Everything that
//! writes cells resolves to logical addresses first and goes through one undo entry.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};

use super::{target, DataGrid, GridTarget, KeyResult};
use crate::actions::{ActionContext, BuiltinAction, Menu, MenuAction};
use crate::clipboard;
use crate::config::FlashTrigger;
use crate::edit::batch::{double_click_fill_target, paste_cell, plan_fill, plan_paste, PasteOutcome};
use crate::edit::editor::EditSession;
use crate::edit::{CellChange, EditBatch, EditSource, UndoEntry};
use crate::error::Result;
use crate::events::{CellEdit, GridEvent, HistoryAction};
use crate::kinds::{CellRegistry, EditorPresentation, EditorValue};
use crate::model::cell::Cell;
use crate::model::{Item, Rect};
use crate::view::sort::{column_is_sortable, SortColumn, SortDirection, SortSpec, PARALLEL_THRESHOLD};
use crate::view::FilterSpec;

/// Where a context menu was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    /// Display cell
    Cell(Item),
    /// Display column
    Header(usize),
}

impl DataGrid {
    // === Editing ===

    /// Open the editor of a display cell, committing any editor already open.
    /// Toggle-style kinds commit straight away. Returns whether anything opened or changed.
    pub fn activate_cell(&mut self, item: Item) -> bool {
        self.begin_edit(item, None)
    }

    pub(crate) fn begin_edit(&mut self, item: Item, seed: Option<char>) -> bool {
        let Some(logical) = self.logical_item(item) else {
            return false;
        };
        let Some(cell) = self.data.get_cell(logical.col, logical.row).cloned() else {
            return false;
        };
        if seed.is_none() {
            self.emit(GridEvent::CellActivated {
                col: logical.col,
                row: logical.row,
            });
        }
        let Some(handle) = self.registry.begin_edit(&cell) else {
            return false;
        };
        let handle = match seed {
            Some(c) if matches!(handle.value, EditorValue::Text(_)) => handle.seeded(&c.to_string()),
            Some(_) => return false,
            None => handle,
        };
        let session = EditSession {
            item,
            logical,
            handle,
            original: cell,
        };

        if session.presentation() == EditorPresentation::Immediate {
            self.commit_edit();
            self.commit_session(session);
            return true;
        }
        debug!(col = logical.col, row = logical.row, kind = %session.handle.kind, "editor opened");
        if let Some(displaced) = self.editor.open(session) {
            self.commit_session(displaced);
        }
        self.scheduler.borrow_mut().damage_cells([logical]);
        true
    }

    /// The open editor, for hosts that drive it directly.
    pub fn edit_session_mut(&mut self) -> Option<&mut EditSession> {
        self.editor.session_mut()
    }

    /// Commit the open editor. Returns false when none was open.
    pub fn commit_edit(&mut self) -> bool {
        match self.editor.close() {
            Some(session) => {
                self.commit_session(session);
                true
            }
            None => false,
        }
    }

    /// Close the open editor without writing.
    pub fn cancel_edit(&mut self) -> bool {
        match self.editor.close() {
            Some(session) => {
                self.scheduler.borrow_mut().damage_cells([session.logical]);
                true
            }
            None => false,
        }
    }

    /// Run an editor value through the kind and the validator. A rejection reports the
    /// cell's current value and leaves history alone.
    fn commit_session(&mut self, session: EditSession) {
        let EditSession { logical, handle, .. } = session;
        let Some(current) = self.data.get_cell(logical.col, logical.row).cloned() else {
            return;
        };
        let accepted = match self.registry.commit_edit(&current, handle.value) {
            Ok(new) if self.validates(logical, &current, &new) => Some(new),
            Ok(_) => {
                debug!(col = logical.col, row = logical.row, "edit vetoed by validator");
                None
            }
            Err(err) => {
                debug!(col = logical.col, row = logical.row, error = %err, "edit rejected");
                None
            }
        };

        match accepted {
            Some(new) if new != current => {
                let change = CellChange {
                    col: logical.col,
                    row: logical.row,
                    previous: current,
                    new,
                };
                if let Some(entry) = UndoEntry::new(EditSource::Edit, vec![change]) {
                    self.commit_entry(entry);
                }
            }
            Some(_) => self.scheduler.borrow_mut().damage_cells([logical]),
            None => {
                self.emit(GridEvent::CellEdited {
                    col: logical.col,
                    row: logical.row,
                    value: current,
                });
                self.scheduler.borrow_mut().damage_cells([logical]);
            }
        }
    }

    fn validates(&self, item: Item, previous: &Cell, new: &Cell) -> bool {
        self.validator.as_ref().map_or(true, |v| v.validate(item, previous, new))
    }

    /// Cells hidden under the leftmost cell of a merge never take writes.
    fn is_covered(&self, logical: Item) -> bool {
        matches!(self.data.effective_span(logical.col, logical.row), Some((start, _)) if start != logical.col)
    }

    /// Apply `entry`, push it onto the history and report it.
    fn commit_entry(&mut self, entry: UndoEntry) {
        entry.apply(&mut self.data);
        let source = entry.source();
        let items: Vec<Item> = entry.items().collect();

        match entry.changes() {
            [change] if source == EditSource::Edit => self.emit(GridEvent::CellEdited {
                col: change.col,
                row: change.row,
                value: change.new.clone(),
            }),
            changes => self.emit(GridEvent::CellsEdited {
                edits: cell_edits(changes),
                count: changes.len(),
            }),
        }
        self.history.record(entry);
        self.emit_history_state();
        self.cells_written(&items, source.flash_trigger());
    }

    fn commit_batch(&mut self, batch: EditBatch, source: EditSource) -> usize {
        let count = batch.len();
        if let Some(entry) = batch.finish(source) {
            info!(?source, cells = count, "batch edit");
            self.commit_entry(entry);
        }
        count
    }

    /// Repaint written cells, flashing them when `trigger` is configured.
    fn cells_written(&mut self, items: &[Item], trigger: FlashTrigger) {
        let mut scheduler = self.scheduler.borrow_mut();
        if self.options.flashes_on(trigger) {
            let duration = Duration::from_millis(self.options.flash_duration_ms);
            scheduler.flash(items.iter().copied(), Instant::now(), duration);
        } else {
            scheduler.damage_cells(items.iter().copied());
        }
    }

    // === History ===

    /// Undo the last entry. An open editor is discarded first.
    pub fn undo(&mut self) -> bool {
        self.cancel_edit();
        let Some(inverse) = self.history.undo() else {
            return false;
        };
        inverse.apply(&mut self.data);
        self.history_applied(inverse, HistoryAction::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_edit();
        let Some(entry) = self.history.redo() else {
            return false;
        };
        entry.apply(&mut self.data);
        self.history_applied(entry, HistoryAction::Redo);
        true
    }

    fn history_applied(&mut self, entry: UndoEntry, action: HistoryAction) {
        debug!(?action, cells = entry.len(), "history applied");
        let items: Vec<Item> = entry.items().collect();
        self.emit(GridEvent::CellsEdited {
            edits: cell_edits(entry.changes()),
            count: entry.len(),
        });
        self.emit(GridEvent::UndoRedoPerformed { action });
        self.emit_history_state();
        let trigger = match action {
            HistoryAction::Undo => FlashTrigger::Undo,
            HistoryAction::Redo => FlashTrigger::Redo,
        };
        self.cells_written(&items, trigger);
    }

    // === Selection helpers ===

    /// Select a display rectangle with its top-left cell focused.
    pub fn select_range(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let before = self.selection.state().clone();
        let t = target!(self);
        self.selection.select_cell(Item::new(rect.x, rect.y), &t);
        self.selection
            .extend_to(Item::new(rect.right() - 1, rect.bottom() - 1), &t);
        self.selection_changed(&before);
    }

    /// Display cells an operation on the selection acts on, row by row.
    ///
    /// A range wins over row selections, which win over column selections; with none of
    /// them the focused cell is used.
    fn selection_block_items(&self) -> Option<Vec<Vec<Item>>> {
        let state = self.selection.state();
        let all_cols: Vec<usize> = (0..self.columns.len()).collect();

        let (cols, rows): (Vec<usize>, Vec<usize>) = if state.has_range() {
            let rect = state.primary_range()?;
            ((rect.x..rect.right()).collect(), (rect.y..rect.bottom()).collect())
        } else if !state.rows.is_empty() {
            let rows = (0..self.order.len())
                .filter(|r| self.order.logical(*r).map_or(false, |l| state.rows.contains(&l)))
                .collect();
            (all_cols, rows)
        } else if !state.columns.is_empty() {
            (state.columns.iter().copied().collect(), (0..self.order.len()).collect())
        } else {
            let current = state.current?;
            (vec![current.col], vec![current.row])
        };

        if cols.is_empty() || rows.is_empty() {
            return None;
        }
        Some(
            rows.iter()
                .map(|&row| cols.iter().map(|&col| Item::new(col, row)).collect())
                .collect(),
        )
    }

    /// Logical cells covered by the selection, including whole rows and columns and
    /// freeform cells.
    fn selected_logical_items(&self) -> Vec<Item> {
        let state = self.selection.state();
        let mut items = BTreeSet::new();
        for rect in &state.ranges {
            items.extend(rect.items());
        }
        items.extend(state.cells.iter().copied());
        for display_row in 0..self.order.len() {
            let selected = self.order.logical(display_row).map_or(false, |l| state.rows.contains(&l));
            if selected {
                items.extend((0..self.columns.len()).map(|c| Item::new(c, display_row)));
            }
        }
        for &col in &state.columns {
            items.extend((0..self.order.len()).map(|r| Item::new(col, r)));
        }
        if items.is_empty() {
            items.extend(state.current);
        }
        items.into_iter().filter_map(|i| self.logical_item(i)).collect()
    }

    // === Clipboard ===

    /// Clipboard text for the selection, or `None` when copying is disabled or nothing
    /// is selected.
    pub fn copy_selection(&self) -> Result<Option<String>> {
        if !self.options.enable_copy {
            return Ok(None);
        }
        let Some(items) = self.selection_block_items() else {
            return Ok(None);
        };
        let block: Vec<Vec<String>> = items
            .iter()
            .map(|row| row.iter().map(|&item| self.copy_text(item)).collect())
            .collect();
        debug!(rows = block.len(), "copy");
        clipboard::encode(&block).map(Some)
    }

    /// Copy text of a display cell; merged-over cells copy as empty.
    fn copy_text(&self, item: Item) -> String {
        let Some(logical) = self.logical_item(item) else {
            return String::new();
        };
        if self.is_covered(logical) {
            return String::new();
        }
        self.data
            .get_cell(logical.col, logical.row)
            .map(|cell| self.registry.copy(cell))
            .unwrap_or_default()
    }

    /// Copy, then clear the copied cells as one undo step.
    pub fn cut_selection(&mut self) -> Result<Option<String>> {
        if !self.options.enable_copy || !self.options.enable_paste {
            return Ok(None);
        }
        let text = self.copy_selection()?;
        if text.is_some() {
            let targets: Vec<Item> = self
                .selection_block_items()
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .filter_map(|item| self.logical_item(item))
                .collect();
            self.clear_cells(&targets, EditSource::Cut);
        }
        Ok(text)
    }

    /// Paste tab-separated text at the selection. Returns the number of cells written.
    pub fn paste_text(&mut self, text: &str) -> usize {
        if !self.options.enable_paste {
            return 0;
        }
        let state = self.selection.state();
        let selection = state.primary_range();
        let Some(origin) = selection.map(|r| Item::new(r.x, r.y)).or(state.current) else {
            return 0;
        };
        let block = clipboard::decode(text);
        let placements = plan_paste(&block, selection, origin, self.columns.len(), self.order.len());

        let mut batch = EditBatch::new();
        let mut rejected = 0;
        for placement in placements {
            let Some(logical) = self.logical_item(placement.target) else {
                continue;
            };
            if self.is_covered(logical) {
                continue;
            }
            let Some(cell) = self.data.get_cell(logical.col, logical.row).cloned() else {
                continue;
            };
            match paste_cell(
                &self.registry,
                self.coercer.as_deref(),
                self.validator.as_deref(),
                logical,
                &placement.text,
                &cell,
            ) {
                PasteOutcome::Accepted(new) => batch.push(logical.col, logical.row, cell, new),
                PasteOutcome::Rejected(_) | PasteOutcome::Vetoed => rejected += 1,
            }
        }
        if rejected > 0 {
            debug!(rejected, "paste values rejected");
        }
        self.commit_batch(batch, EditSource::Paste)
    }

    /// Delete/Backspace: report the selection, then clear it as one undo step.
    pub fn delete_selection(&mut self) -> usize {
        let state = self.selection.state();
        let mut cells: Vec<Item> = state.ranges.iter().flat_map(|r| r.items().collect::<Vec<_>>()).collect();
        cells.extend(state.cells.iter().copied());
        if cells.is_empty() && state.rows.is_empty() && state.columns.is_empty() {
            cells.extend(state.current);
        }
        let cells: Vec<Item> = cells
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|item| self.logical_item(item))
            .collect();
        let rows = state.rows.clone();
        let columns = state.columns.iter().filter_map(|c| self.columns.logical(*c)).collect();
        self.emit(GridEvent::DeletePressed { cells, rows, columns });

        let targets = self.selected_logical_items();
        self.clear_cells(&targets, EditSource::Clear)
    }

    /// Clear logical cells through each kind's empty paste.
    fn clear_cells(&mut self, targets: &[Item], source: EditSource) -> usize {
        let mut batch = EditBatch::new();
        for &logical in targets {
            if self.is_covered(logical) {
                continue;
            }
            let Some(cell) = self.data.get_cell(logical.col, logical.row).cloned() else {
                continue;
            };
            if let Ok(new) = self.registry.paste("", &cell) {
                if self.validates(logical, &cell, &new) {
                    batch.push(logical.col, logical.row, cell, new);
                }
            }
        }
        self.commit_batch(batch, source)
    }

    // === Fill ===

    /// Fill the display rectangle `target` by repeating `source`, as one undo step.
    /// The selection grows to the filled area.
    pub fn fill(&mut self, source: Rect, target: Rect) -> usize {
        let target = target.clamp_to(self.columns.len(), self.order.len());
        let mut batch = EditBatch::new();
        for (dst, src) in plan_fill(source, target) {
            let (Some(dst), Some(src)) = (self.logical_item(dst), self.logical_item(src)) else {
                continue;
            };
            if self.is_covered(dst) {
                continue;
            }
            let text = if self.is_covered(src) {
                String::new()
            } else {
                self.data
                    .get_cell(src.col, src.row)
                    .map(|c| self.registry.copy(c))
                    .unwrap_or_default()
            };
            let Some(cell) = self.data.get_cell(dst.col, dst.row).cloned() else {
                continue;
            };
            if let PasteOutcome::Accepted(new) = paste_cell(
                &self.registry,
                self.coercer.as_deref(),
                self.validator.as_deref(),
                dst,
                &text,
                &cell,
            ) {
                batch.push(dst.col, dst.row, cell, new);
            }
        }
        let written = self.commit_batch(batch, EditSource::Fill);
        self.select_range(source.union(&target));
        written
    }

    /// Ctrl+D: copy the top row of the range into the rest of it. A one-row range copies
    /// the row above.
    pub fn fill_down(&mut self) -> usize {
        let Some(range) = self.selection.state().primary_range() else {
            return 0;
        };
        if range.height > 1 {
            self.fill(Rect::new(range.x, range.y, range.width, 1), range)
        } else if range.y > 0 {
            let source = Rect::new(range.x, range.y - 1, range.width, 1);
            self.fill(source, range)
        } else {
            0
        }
    }

    /// Ctrl+R: as [`DataGrid::fill_down`], left to right.
    pub fn fill_right(&mut self) -> usize {
        let Some(range) = self.selection.state().primary_range() else {
            return 0;
        };
        if range.width > 1 {
            self.fill(Rect::new(range.x, range.y, 1, range.height), range)
        } else if range.x > 0 {
            let source = Rect::new(range.x - 1, range.y, 1, range.height);
            self.fill(source, range)
        } else {
            0
        }
    }

    /// Fill-handle double-click: repeat the selection down as far as the column to its
    /// left has values.
    pub fn fill_handle_double_click(&mut self) -> usize {
        let Some(range) = self.selection.state().primary_range() else {
            return 0;
        };
        let target = double_click_fill_target(range, self.order.len(), |item| {
            self.cell_at(item).map_or(true, |cell| self.registry.is_empty(cell))
        });
        match target {
            Some(target) => self.fill(range, target),
            None => 0,
        }
    }

    // === Sort, filter, hidden rows ===

    pub fn sort_spec(&self) -> &[SortColumn] {
        &self.sort
    }

    /// Replace the sort. Keys on unsortable columns are dropped.
    pub fn set_sort(&mut self, spec: SortSpec) {
        let spec: SortSpec = spec
            .into_iter()
            .filter(|s| {
                let ok = column_is_sortable(&self.data, &self.registry, s.column);
                if !ok {
                    warn!(column = s.column, "dropping sort on unsortable column");
                }
                ok
            })
            .collect();
        if spec == self.sort {
            return;
        }
        self.sort = spec;
        self.emit(GridEvent::SortColumns {
            columns: self.sort.clone(),
        });
        self.refresh_order();
    }

    /// Header sort cycling on logical column `col`: ascending, descending, off.
    /// With `append` the column becomes (or stays) a secondary key.
    pub fn toggle_sort(&mut self, col: usize, append: bool) {
        if !self.options.sortable || !column_is_sortable(&self.data, &self.registry, col) {
            return;
        }
        let next = match self.sort.iter().find(|s| s.column == col).map(|s| s.direction) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        let mut spec: SortSpec = if append {
            self.sort.clone()
        } else {
            self.sort.iter().copied().filter(|s| s.column == col).collect()
        };
        match (spec.iter().position(|s| s.column == col), next) {
            (Some(i), Some(direction)) => spec[i].direction = direction,
            (Some(i), None) => {
                spec.remove(i);
            }
            (None, Some(direction)) => spec.push(SortColumn::new(col, direction)),
            (None, None) => {}
        }
        self.set_sort(spec);
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.refresh_order();
    }

    /// Allow only `values` in logical column `col`; `None` removes the column's filter.
    pub fn set_column_filter(&mut self, col: usize, values: Option<Vec<String>>) {
        match (self.data.column(col), values) {
            (Some(column), Some(_)) if !column.filterable => {
                warn!(column = %column.id, "column is not filterable, ignoring filter");
                return;
            }
            (Some(_), Some(values)) => self.filter.allow(col, values),
            (Some(_), None) => self.filter.clear_column(col),
            (None, _) => return,
        }
        self.refresh_order();
    }

    pub fn hidden_rows(&self) -> &BTreeSet<usize> {
        &self.hidden
    }

    /// Hide logical rows. Hidden rows keep their index and their row selection.
    pub fn set_hidden_rows(&mut self, hidden: BTreeSet<usize>) {
        if hidden == self.hidden {
            return;
        }
        self.hidden = hidden;
        self.refresh_order();
    }

    // === Columns and rows ===

    /// Move the column at display position `from` to `to`.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from == to || !self.columns.move_column(from, to) {
            return false;
        }
        let before = self.selection.state().clone();
        self.selection.column_moved(from, to);
        self.emit(GridEvent::ColumnMoved {
            start_index: from,
            end_index: to,
        });
        self.rebuild_layout();
        self.selection_changed(&before);
        self.scheduler.borrow_mut().redraw_all();
        true
    }

    /// Set the width of logical column `col`, clamped to the column and grid bounds.
    pub fn resize_column(&mut self, col: usize, width: f32) -> Option<f32> {
        let width = self.widths.set_width(&self.data, col, width, self.width_bounds())?;
        self.emit(GridEvent::ColumnResized { col, width });
        self.rebuild_layout();
        self.scheduler.borrow_mut().redraw_all();
        Some(width)
    }

    /// Re-measure auto-sized logical columns (all when `cols` is `None`).
    pub fn remeasure_columns(&mut self, cols: Option<&[usize]>) {
        self.widths.remeasure(cols);
        self.rebuild_layout();
        self.scheduler.borrow_mut().redraw_all();
    }

    /// Row drag between display positions. The host owns row order, so this only reports.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.order.len() || to >= self.order.len() {
            return false;
        }
        self.emit(GridEvent::RowMoved {
            start_index: from,
            end_index: to,
        });
        true
    }

    // === Search ===

    /// Find cells whose copy text matches `query` (case-insensitive regex, taken
    /// literally when it does not parse). Matches are display cells in reading order.
    pub fn search(&mut self, query: &str) -> usize {
        self.search_matches.clear();
        self.search_index = 0;
        if query.is_empty() {
            self.scheduler.borrow_mut().redraw_all();
            return 0;
        }
        let re = match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(re) => re,
            Err(_) => match RegexBuilder::new(&regex::escape(query)).case_insensitive(true).build() {
                Ok(re) => re,
                Err(err) => {
                    warn!(%err, "unusable search pattern");
                    return 0;
                }
            },
        };

        let grid = target!(self);
        let registry = &self.registry;
        let matches_in_row = |row: usize| -> Vec<Item> {
            (0..grid.columns.len())
                .map(|col| Item::new(col, row))
                .filter(|&item| search_hit(&grid, registry, &re, item))
                .collect()
        };
        let matches = if self.order.len() >= PARALLEL_THRESHOLD {
            (0..self.order.len()).into_par_iter().flat_map_iter(matches_in_row).collect()
        } else {
            (0..self.order.len()).flat_map(matches_in_row).collect()
        };
        self.search_matches = matches;
        info!(query, matches = self.search_matches.len(), "search");
        self.scheduler.borrow_mut().redraw_all();
        self.search_matches.len()
    }

    pub fn search_matches(&self) -> &[Item] {
        &self.search_matches
    }

    /// 1-based index of the last visited match and the match count
    pub fn search_position(&self) -> Option<(usize, usize)> {
        (!self.search_matches.is_empty()).then(|| (self.search_index + 1, self.search_matches.len()))
    }

    pub fn clear_search(&mut self) {
        self.search_matches.clear();
        self.search_index = 0;
        self.scheduler.borrow_mut().redraw_all();
    }

    /// Focus the next match after the focused cell, wrapping around.
    pub fn search_next(&mut self) -> Option<Item> {
        let current = self.selection.state().current.map(|c| (c.row, c.col));
        let index = self
            .search_matches
            .iter()
            .position(|m| current.map_or(true, |c| (m.row, m.col) > c))
            .unwrap_or(0);
        self.goto_match(index)
    }

    pub fn search_prev(&mut self) -> Option<Item> {
        let current = self.selection.state().current.map(|c| (c.row, c.col));
        let index = self
            .search_matches
            .iter()
            .rposition(|m| current.map_or(true, |c| (m.row, m.col) < c))
            .unwrap_or(self.search_matches.len().saturating_sub(1));
        self.goto_match(index)
    }

    fn goto_match(&mut self, index: usize) -> Option<Item> {
        let item = *self.search_matches.get(index)?;
        self.search_index = index;
        self.focus_cell(item);
        Some(item)
    }

    /// Move focus to a display cell and scroll it into view.
    pub fn focus_cell(&mut self, item: Item) {
        let before = self.selection.state().clone();
        self.selection.select_cell(item, &target!(self));
        self.selection_changed(&before);
        self.scroll_into_view(item);
    }

    // === Context menus ===

    pub fn cell_menu(&self) -> &Menu {
        &self.cell_menu
    }

    pub fn header_menu(&self) -> &Menu {
        &self.header_menu
    }

    /// Run the enabled menu item `id`. Copy results come back as [`KeyResult::Copy`];
    /// paste asks the host for clipboard text with [`KeyResult::PasteRequested`].
    pub fn run_menu_action(&mut self, at: MenuTarget, id: &str) -> KeyResult {
        let menu = match at {
            MenuTarget::Cell(_) => &self.cell_menu,
            MenuTarget::Header(_) => &self.header_menu,
        };
        let Some(action) = menu.resolve(id).cloned() else {
            debug!(id, "menu item missing or disabled");
            return KeyResult::Ignored;
        };
        let logical = match at {
            MenuTarget::Cell(item) => self.logical_item(item),
            MenuTarget::Header(col) => self.columns.logical(col).map(|c| Item::new(c, 0)),
        };
        let Some(logical) = logical else {
            return KeyResult::Ignored;
        };
        let row = match at {
            MenuTarget::Cell(_) => Some(logical.row),
            MenuTarget::Header(_) => None,
        };

        match action {
            MenuAction::Builtin(builtin) => self.run_builtin(builtin, logical.col),
            MenuAction::Host(name) => {
                self.emit(GridEvent::HostAction {
                    id: name,
                    col: logical.col,
                    row,
                });
                KeyResult::Handled
            }
            MenuAction::Custom(f) => {
                let Some(row) = row else {
                    return KeyResult::Ignored;
                };
                let Some(cell) = self.data.get_cell(logical.col, row).cloned() else {
                    return KeyResult::Ignored;
                };
                let ctx = ActionContext {
                    col: logical.col,
                    row,
                    cell,
                    selection: self.selection.state().clone(),
                };
                let outcome = f(&ctx);
                self.apply_action_edits(outcome.edits);
                KeyResult::Handled
            }
        }
    }

    fn run_builtin(&mut self, action: BuiltinAction, col: usize) -> KeyResult {
        match action {
            BuiltinAction::Copy => self.copy_result(),
            BuiltinAction::Cut => match self.cut_selection() {
                Ok(Some(text)) => KeyResult::Copy(text),
                Ok(None) => KeyResult::Ignored,
                Err(err) => {
                    warn!(%err, "cut failed");
                    KeyResult::Handled
                }
            },
            BuiltinAction::Paste if self.options.enable_paste => KeyResult::PasteRequested,
            BuiltinAction::Paste => KeyResult::Ignored,
            BuiltinAction::Clear => {
                let targets = self.selected_logical_items();
                self.clear_cells(&targets, EditSource::Clear);
                KeyResult::Handled
            }
            BuiltinAction::SortAscending => {
                self.set_sort(vec![SortColumn::new(col, SortDirection::Ascending)]);
                KeyResult::Handled
            }
            BuiltinAction::SortDescending => {
                self.set_sort(vec![SortColumn::new(col, SortDirection::Descending)]);
                KeyResult::Handled
            }
            BuiltinAction::ClearSort => {
                let spec = self.sort.iter().copied().filter(|s| s.column != col).collect();
                self.set_sort(spec);
                KeyResult::Handled
            }
        }
    }

    pub(crate) fn copy_result(&self) -> KeyResult {
        match self.copy_selection() {
            Ok(Some(text)) => KeyResult::Copy(text),
            Ok(None) => KeyResult::Ignored,
            Err(err) => {
                warn!(%err, "copy failed");
                KeyResult::Handled
            }
        }
    }

    /// Commit replacements from a custom action as one undo step.
    fn apply_action_edits(&mut self, edits: Vec<(Item, Cell)>) -> usize {
        let mut batch = EditBatch::new();
        for (logical, new) in edits {
            let Some(cell) = self.data.get_cell(logical.col, logical.row).cloned() else {
                warn!(col = logical.col, row = logical.row, "action edit outside the grid");
                continue;
            };
            if !cell.allow_overlay || self.is_covered(logical) || !self.validates(logical, &cell, &new) {
                continue;
            }
            batch.push(logical.col, logical.row, cell, new);
        }
        self.commit_batch(batch, EditSource::Action)
    }
}

fn cell_edits(changes: &[CellChange]) -> Vec<CellEdit> {
    changes
        .iter()
        .map(|c| CellEdit {
            item: c.item(),
            value: c.new.clone(),
        })
        .collect()
}

fn search_hit(grid: &GridTarget<'_>, registry: &CellRegistry, re: &Regex, item: Item) -> bool {
    let Some(logical) = grid.logical(item) else {
        return false;
    };
    let covered = matches!(grid.data.effective_span(logical.col, logical.row), Some((start, _)) if start != logical.col);
    !covered
        && grid
            .data
            .get_cell(logical.col, logical.row)
            .map_or(false, |cell| re.is_match(&registry.display_text(cell)))
}
