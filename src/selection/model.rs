use std::collections::BTreeSet;

use tracing::trace;

use super::{Blending, Category, RangeSelect, SelectCount, SelectionMode, SelectionState};
use crate::config::keys::Modifiers;
use crate::model::{Item, Rect};

/// What the selection model needs to know about the grid, in display coordinates.
pub trait SelectionTarget {
    fn col_count(&self) -> usize;
    /// Rows in display order (hidden and filtered rows excluded)
    fn row_count(&self) -> usize;
    fn logical_row(&self, display_row: usize) -> Option<usize>;
    fn is_selectable(&self, item: Item) -> bool;
    /// Inclusive display-column span of a merged cell
    fn span(&self, item: Item) -> Option<(usize, usize)>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionOptions {
    pub range_select: RangeSelect,
    pub row_select: SelectCount,
    pub column_select: SelectCount,
    pub row_selection_mode: SelectionMode,
    pub column_selection_mode: SelectionMode,
    pub row_select_on_cell_click: bool,
    pub range_selection_column_spanning: bool,
    pub blending: Blending,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            range_select: RangeSelect::Rect,
            row_select: SelectCount::Multi,
            column_select: SelectCount::Multi,
            row_selection_mode: SelectionMode::Auto,
            column_selection_mode: SelectionMode::Auto,
            row_select_on_cell_click: false,
            range_selection_column_spanning: true,
            blending: Blending::default(),
        }
    }
}

#[derive(Debug, Clone)]
enum Drag {
    Rect { anchor: Item },
    Freeform { last: Item, toggle: bool, base: BTreeSet<Item>, swept: BTreeSet<Item> },
}

/// Selection state machine driven by pointer and keyboard input.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    state: SelectionState,
    options: SelectionOptions,
    anchor: Option<Item>,
    row_anchor: Option<usize>,
    column_anchor: Option<usize>,
    drag: Option<Drag>,
}

impl SelectionModel {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            state: SelectionState::default(),
            options,
            anchor: None,
            row_anchor: None,
            column_anchor: None,
            drag: None,
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SelectionOptions) {
        self.options = options;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replace the state wholesale (host-driven selection).
    pub fn set_state(&mut self, state: SelectionState) {
        self.anchor = state.current;
        self.drag = None;
        self.state = state;
    }

    /// Pointer pressed on a cell.
    pub fn cell_down(&mut self, item: Item, mods: Modifiers, target: &dyn SelectionTarget) {
        let Some(item) = clamp_item(item, target) else {
            return;
        };
        if !target.is_selectable(item) {
            return;
        }

        if self.options.row_select_on_cell_click {
            self.row_click(item.row, mods, target);
            self.state.current = Some(item);
            self.anchor = Some(item);
            return;
        }

        match self.options.range_select {
            RangeSelect::None => {}
            RangeSelect::Cell => self.select_cell(item, target),
            RangeSelect::Freeform => self.freeform_down(item, mods),
            mode => {
                if mods.shift && self.anchor.is_some() {
                    self.extend_to(item, target);
                } else if mods.ctrl && mode == RangeSelect::MultiRect {
                    self.state.activate(Category::Range, &self.options.blending);
                    self.state.ranges.push(expand_to_spans(Rect::single(item), target));
                    self.state.current = Some(item);
                    self.anchor = Some(item);
                } else {
                    self.select_cell(item, target);
                }
                self.drag = Some(Drag::Rect {
                    anchor: self.anchor.unwrap_or(item),
                });
            }
        }
    }

    /// Pointer moved to `item` while pressed.
    pub fn drag_to(&mut self, item: Item, target: &dyn SelectionTarget) {
        let Some(item) = clamp_item(item, target) else {
            return;
        };
        match self.drag.take() {
            Some(Drag::Rect { anchor }) => {
                let item = if self.options.range_selection_column_spanning {
                    item
                } else {
                    Item::new(anchor.col, item.row)
                };
                let rect = expand_to_spans(Rect::spanning(anchor, item), target);
                match self.state.ranges.last_mut() {
                    Some(last) => *last = rect,
                    None => self.state.ranges.push(rect),
                }
                self.drag = Some(Drag::Rect { anchor });
            }
            Some(Drag::Freeform { last, toggle, base, mut swept }) => {
                let item = if self.options.range_selection_column_spanning {
                    item
                } else {
                    Item::new(last.col, item.row)
                };
                for cell in line_cells(last, item) {
                    if target.is_selectable(cell) {
                        swept.insert(cell);
                    }
                }
                self.state.cells = if toggle {
                    base.symmetric_difference(&swept).copied().collect()
                } else {
                    base.union(&swept).copied().collect()
                };
                self.drag = Some(Drag::Freeform {
                    last: item,
                    toggle,
                    base,
                    swept,
                });
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Focus a single cell, replacing the range selection.
    pub fn select_cell(&mut self, item: Item, target: &dyn SelectionTarget) {
        let Some(item) = clamp_item(item, target) else {
            return;
        };
        self.state.activate(Category::Range, &self.options.blending);
        self.state.current = Some(item);
        self.anchor = Some(item);
        self.state.ranges.clear();
        self.state.cells.clear();
        match self.options.range_select {
            RangeSelect::None => {}
            RangeSelect::Freeform => {
                if target.is_selectable(item) {
                    self.state.cells.insert(item);
                }
            }
            _ => self.state.ranges.push(expand_to_spans(Rect::single(item), target)),
        }
    }

    /// Grow the active range from the anchor to `item` (shift-click, shift-arrows).
    pub fn extend_to(&mut self, item: Item, target: &dyn SelectionTarget) {
        let Some(item) = clamp_item(item, target) else {
            return;
        };
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => return self.select_cell(item, target),
        };
        let item = if self.options.range_selection_column_spanning {
            item
        } else {
            Item::new(anchor.col, item.row)
        };
        let rect = expand_to_spans(Rect::spanning(anchor, item), target);

        match self.options.range_select {
            RangeSelect::None | RangeSelect::Cell => return self.select_cell(item, target),
            RangeSelect::Freeform => {
                self.state.activate(Category::Range, &self.options.blending);
                self.state
                    .cells
                    .extend(rect.items().filter(|c| target.is_selectable(*c)));
            }
            RangeSelect::Rect | RangeSelect::MultiRect => {
                self.state.activate(Category::Range, &self.options.blending);
                match self.state.ranges.last_mut() {
                    Some(last) => *last = rect,
                    None => self.state.ranges.push(rect),
                }
            }
        }
        self.state.current = Some(item);
    }

    /// Keyboard navigation: focus `item`, or grow the range to it when `extend`.
    pub fn move_to(&mut self, item: Item, extend: bool, target: &dyn SelectionTarget) {
        if extend {
            self.extend_to(item, target);
        } else {
            self.select_cell(item, target);
        }
    }

    fn freeform_down(&mut self, item: Item, mods: Modifiers) {
        self.state.activate(Category::Range, &self.options.blending);
        let base = if mods.ctrl { self.state.cells.clone() } else { BTreeSet::new() };
        let mut swept = BTreeSet::new();
        swept.insert(item);
        self.state.cells = if mods.ctrl {
            base.symmetric_difference(&swept).copied().collect()
        } else {
            swept.clone()
        };
        self.state.ranges.clear();
        self.state.current = Some(item);
        self.anchor = Some(item);
        self.drag = Some(Drag::Freeform {
            last: item,
            toggle: mods.ctrl,
            base,
            swept,
        });
    }

    /// Column header click at display column `col`.
    pub fn header_click(&mut self, col: usize, mods: Modifiers, target: &dyn SelectionTarget) {
        if col >= target.col_count() {
            return;
        }
        let (count, mode) = (self.options.column_select, self.options.column_selection_mode);
        let range = self
            .column_anchor
            .filter(|_| mods.shift && count == SelectCount::Multi)
            .map(|anchor| (anchor.min(col)..=anchor.max(col)).collect::<Vec<_>>());

        self.state.activate(Category::Column, &self.options.blending);
        if apply_toggle(&mut self.state.columns, col, range, count, mode, mods) {
            self.column_anchor = Some(col);
        }
        trace!(col, selected = self.state.columns.len(), "column selection");
    }

    /// Row marker click (or row click via `row_select_on_cell_click`) at display row `row`.
    pub fn row_click(&mut self, row: usize, mods: Modifiers, target: &dyn SelectionTarget) {
        let Some(logical) = target.logical_row(row) else {
            return;
        };
        let (count, mode) = (self.options.row_select, self.options.row_selection_mode);
        let range = self
            .row_anchor
            .filter(|_| mods.shift && count == SelectCount::Multi)
            .map(|anchor| {
                (anchor.min(row)..=anchor.max(row))
                    .filter_map(|r| target.logical_row(r))
                    .collect::<Vec<_>>()
            });

        self.state.activate(Category::Row, &self.options.blending);
        if apply_toggle(&mut self.state.rows, logical, range, count, mode, mods) {
            self.row_anchor = Some(row);
        }
        trace!(row, logical, selected = self.state.rows.len(), "row selection");
    }

    /// Select the row of the focused cell (keyboard)
    pub fn select_current_row(&mut self, target: &dyn SelectionTarget) {
        if let Some(current) = self.state.current {
            self.row_click(current.row, Modifiers::NONE, target);
        }
    }

    pub fn select_current_column(&mut self, target: &dyn SelectionTarget) {
        if let Some(current) = self.state.current {
            self.header_click(current.col, Modifiers::NONE, target);
        }
    }

    /// Every cell as one range
    pub fn select_all(&mut self, target: &dyn SelectionTarget) {
        if target.col_count() == 0 || target.row_count() == 0 {
            return;
        }
        let all = Rect::new(0, 0, target.col_count(), target.row_count());
        self.state.activate(Category::Range, &self.options.blending);
        match self.options.range_select {
            RangeSelect::None | RangeSelect::Cell => return,
            RangeSelect::Freeform => {
                self.state.cells = all.items().filter(|c| target.is_selectable(*c)).collect();
            }
            _ => self.state.ranges = vec![all],
        }
        if self.state.current.is_none() {
            self.state.current = Some(Item::new(0, 0));
            self.anchor = self.state.current;
        }
    }

    /// Escape: drop range and freeform selections, keep rows, columns and focus.
    pub fn escape(&mut self) {
        self.drag = None;
        self.state.clear(Category::Range);
    }

    pub fn clear_rows(&mut self) {
        self.state.rows.clear();
    }

    pub fn clear_columns(&mut self) {
        self.state.columns.clear();
    }

    /// Display order changed: display-addressed ranges no longer describe the same cells.
    pub fn display_order_changed(&mut self, current: Option<Item>) {
        self.drag = None;
        self.state.clear(Category::Range);
        self.state.current = current;
        self.anchor = current;
        self.row_anchor = None;
    }

    /// Keep column selections on the same columns after a display move.
    pub fn column_moved(&mut self, from: usize, to: usize) {
        let remap = |c: usize| {
            if c == from {
                to
            } else if from < to && c > from && c <= to {
                c - 1
            } else if to < from && c >= to && c < from {
                c + 1
            } else {
                c
            }
        };
        self.state.columns = self.state.columns.iter().map(|c| remap(*c)).collect();
        self.state.current = self.state.current.map(|i| Item::new(remap(i.col), i.row));
        self.anchor = self.state.current;
        self.column_anchor = None;
        self.drag = None;
        self.state.clear(Category::Range);
    }

    /// Clamp everything display-addressed to a grid of the given size.
    pub fn clamp(&mut self, target: &dyn SelectionTarget) {
        let (cols, rows) = (target.col_count(), target.row_count());
        self.state.current = self.state.current.filter(|i| i.col < cols && i.row < rows);
        self.state.columns.retain(|c| *c < cols);
        self.state.ranges = self
            .state
            .ranges
            .iter()
            .map(|r| r.clamp_to(cols, rows))
            .filter(|r| !r.is_empty())
            .collect();
        self.state.cells.retain(|i| i.col < cols && i.row < rows);
        self.anchor = self.anchor.filter(|i| i.col < cols && i.row < rows);
    }
}

/// Apply a row/column click to `set`. Returns whether `key` is now the click anchor.
fn apply_toggle(
    set: &mut BTreeSet<usize>,
    key: usize,
    range: Option<Vec<usize>>,
    count: SelectCount,
    mode: SelectionMode,
    mods: Modifiers,
) -> bool {
    match count {
        SelectCount::None => false,
        SelectCount::Single => {
            let was_only = set.len() == 1 && set.contains(&key);
            set.clear();
            if !was_only {
                set.insert(key);
            }
            true
        }
        SelectCount::Multi => {
            if let Some(range) = range {
                set.extend(range);
                return false;
            }
            let additive = mode == SelectionMode::Multi || mods.ctrl;
            if additive {
                if !set.remove(&key) {
                    set.insert(key);
                }
            } else {
                let was_only = set.len() == 1 && set.contains(&key);
                set.clear();
                if !was_only {
                    set.insert(key);
                }
            }
            true
        }
    }
}

fn clamp_item(item: Item, target: &dyn SelectionTarget) -> Option<Item> {
    let (cols, rows) = (target.col_count(), target.row_count());
    if cols == 0 || rows == 0 {
        return None;
    }
    Some(Item::new(item.col.min(cols - 1), item.row.min(rows - 1)))
}

/// Widen `rect` until no merged cell straddles its left or right edge.
pub fn expand_to_spans(rect: Rect, target: &dyn SelectionTarget) -> Rect {
    let mut rect = rect;
    loop {
        let mut grown = rect;
        for row in rect.y..rect.bottom() {
            for col in [rect.x, rect.right().saturating_sub(1)] {
                if let Some((start, end)) = target.span(Item::new(col, row)) {
                    grown = grown.union(&Rect::new(start, row, end - start + 1, 1));
                }
            }
        }
        if grown == rect {
            return rect.clamp_to(target.col_count(), target.row_count());
        }
        rect = grown;
    }
}

/// Cells on the line from `a` to `b` (Bresenham), both ends included.
pub fn line_cells(a: Item, b: Item) -> Vec<Item> {
    let (mut x, mut y) = (a.col as i64, a.row as i64);
    let (x1, y1) = (b.col as i64, b.row as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut out = Vec::with_capacity((dx - dy) as usize + 1);

    loop {
        out.push(Item::new(x as usize, y as usize));
        if x == x1 && y == y1 {
            return out;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
