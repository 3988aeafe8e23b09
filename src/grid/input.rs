//! Pointer, keyboard and scroll input.

use tracing::{trace, warn};

use super::{target, DataGrid, Drag};
use crate::config::keys::{KeyCode, KeyPress, Modifiers, Shortcut};
use crate::config::RowMarkers;
use crate::edit::batch::fill_handle_target;
use crate::edit::editor::{on_scroll, should_activate, ClickKind, ScrollResponse};
use crate::events::{GridEvent, HoverKind};
use crate::model::{Item, Rect};
use crate::selection::Category;
use crate::viewport::HitTarget;

/// Distance from a header's right edge that grabs the resize handle
const RESIZE_GRIP: f32 = 4.0;

/// Result of handling a key or menu action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult {
    /// Not for the grid
    Ignored,
    Handled,
    /// Put this text on the clipboard
    Copy(String),
    /// The host should read its clipboard and call [`DataGrid::paste_text`]
    PasteRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// A pointer press in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub x: f32,
    pub y: f32,
    pub button: MouseButton,
    pub mods: Modifiers,
    pub click: ClickKind,
}

impl PointerInput {
    pub fn left(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            button: MouseButton::Left,
            mods: Modifiers::NONE,
            click: ClickKind::Single,
        }
    }

    pub fn with_mods(mut self, mods: Modifiers) -> Self {
        self.mods = mods;
        self
    }

    pub fn double(mut self) -> Self {
        self.click = ClickKind::Double;
        self
    }

    pub fn right(mut self) -> Self {
        self.button = MouseButton::Right;
        self
    }
}

impl DataGrid {
    // === Viewport ===

    /// Set the viewport size in pixels.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = (width.max(0.0), height.max(0.0));
        self.rebuild_layout();
    }

    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> bool {
        self.scroll_to(self.region.tx + dx, self.region.ty + dy)
    }

    /// Scroll to a pixel offset (clamped). An open editor is kept, discarded or blocks
    /// the scroll according to `editor_scroll_behavior`. Returns whether the view moved.
    pub fn scroll_to(&mut self, tx: f32, ty: f32) -> bool {
        let (tx, ty) = self.layout.clamp_scroll(tx, ty);
        if (tx, ty) == (self.region.tx, self.region.ty) {
            return false;
        }
        if let Some(session) = self.editor.session() {
            match on_scroll(self.options.editor_scroll_behavior, session.presentation()) {
                ScrollResponse::Allow => {}
                ScrollResponse::Close => {
                    self.cancel_edit();
                }
                ScrollResponse::Block => return false,
            }
        }
        self.update_region(tx, ty);
        true
    }

    /// Scroll just enough to show a display cell.
    pub fn scroll_into_view(&mut self, item: Item) {
        let (tx, ty) = self.layout.scroll_to(item, self.region.tx, self.region.ty);
        self.update_region(tx, ty);
    }

    // === Keyboard ===

    pub fn handle_key(&mut self, key: KeyPress) -> KeyResult {
        if self.editor.is_open() {
            return self.editor_key(key);
        }
        if let Some(shortcut) = self.shortcuts.resolve(key, &self.options.keybindings) {
            trace!(?shortcut, "shortcut");
            return self.run_shortcut(shortcut);
        }
        if self.options.edit_on_type {
            if let (Some(c), Some(current)) = (key.printable(), self.selection.state().current) {
                if self.begin_edit(current, Some(c)) {
                    return KeyResult::Handled;
                }
            }
        }
        KeyResult::Ignored
    }

    fn editor_key(&mut self, key: KeyPress) -> KeyResult {
        match key.code {
            KeyCode::Escape => {
                self.cancel_edit();
            }
            KeyCode::Enter => {
                self.commit_edit();
                self.move_focus(0, 1, false);
            }
            KeyCode::Tab => {
                self.commit_edit();
                let dc = if key.mods.shift { -1 } else { 1 };
                self.move_focus(dc, 0, false);
            }
            KeyCode::Backspace => {
                if let Some(session) = self.editor.session_mut() {
                    session.backspace();
                }
            }
            _ => match (key.printable(), self.editor.session_mut()) {
                (Some(c), Some(session)) => session.push_char(c),
                _ => return KeyResult::Ignored,
            },
        }
        if let Some(session) = self.editor.session() {
            self.scheduler.borrow_mut().damage_cells([session.logical]);
        }
        KeyResult::Handled
    }

    fn run_shortcut(&mut self, shortcut: Shortcut) -> KeyResult {
        let last_col = self.columns.len().saturating_sub(1);
        let last_row = self.order.len().saturating_sub(1);
        let current = self.selection.state().current.unwrap_or_default();
        let page = self.region.height.max(1);

        match shortcut {
            Shortcut::MoveUp => self.move_focus(0, -1, false),
            Shortcut::MoveDown => self.move_focus(0, 1, false),
            Shortcut::MoveLeft => self.move_focus(-1, 0, false),
            Shortcut::MoveRight => self.move_focus(1, 0, false),
            Shortcut::ExtendUp => self.move_focus(0, -1, true),
            Shortcut::ExtendDown => self.move_focus(0, 1, true),
            Shortcut::ExtendLeft => self.move_focus(-1, 0, true),
            Shortcut::ExtendRight => self.move_focus(1, 0, true),
            Shortcut::JumpUp => self.navigate(Item::new(current.col, 0), false),
            Shortcut::JumpDown => self.navigate(Item::new(current.col, last_row), false),
            Shortcut::JumpLeft => self.navigate(Item::new(0, current.row), false),
            Shortcut::JumpRight => self.navigate(Item::new(last_col, current.row), false),
            Shortcut::RowStart => self.navigate(Item::new(0, current.row), false),
            Shortcut::RowEnd => self.navigate(Item::new(last_col, current.row), false),
            Shortcut::FirstCell => self.navigate(Item::new(0, 0), false),
            Shortcut::LastCell => self.navigate(Item::new(last_col, last_row), false),
            Shortcut::PageUp => {
                let row = self.order.jump_up(current.row, page);
                self.navigate(Item::new(current.col, row), false)
            }
            Shortcut::PageDown => {
                let row = self.order.jump_down(current.row, page);
                self.navigate(Item::new(current.col, row), false)
            }
            Shortcut::NextCell => self.step_cell(true),
            Shortcut::PrevCell => self.step_cell(false),
            Shortcut::Activate => match self.selection.state().current {
                Some(item) => {
                    self.activate_cell(item);
                }
                None => return KeyResult::Ignored,
            },
            Shortcut::Cancel => {
                let before = self.selection.state().clone();
                self.selection.escape();
                self.selection_changed(&before);
            }
            Shortcut::SelectAll => {
                let before = self.selection.state().clone();
                self.selection.select_all(&target!(self));
                self.selection_changed(&before);
            }
            Shortcut::SelectRow => {
                let before = self.selection.state().clone();
                self.selection.select_current_row(&target!(self));
                self.selection_changed(&before);
            }
            Shortcut::SelectColumn => {
                let before = self.selection.state().clone();
                self.selection.select_current_column(&target!(self));
                self.selection_changed(&before);
            }
            Shortcut::Clear => {
                self.delete_selection();
            }
            Shortcut::Copy => return self.copy_result(),
            Shortcut::Cut => {
                return match self.cut_selection() {
                    Ok(Some(text)) => KeyResult::Copy(text),
                    Ok(None) => KeyResult::Ignored,
                    Err(err) => {
                        warn!(%err, "cut failed");
                        KeyResult::Handled
                    }
                }
            }
            Shortcut::Paste if self.options.enable_paste => return KeyResult::PasteRequested,
            Shortcut::Paste => return KeyResult::Ignored,
            Shortcut::Undo => {
                self.undo();
            }
            Shortcut::Redo => {
                self.redo();
            }
            Shortcut::FillDown => {
                self.fill_down();
            }
            Shortcut::FillRight => {
                self.fill_right();
            }
            Shortcut::Search => self.emit(GridEvent::SearchRequested),
        }
        KeyResult::Handled
    }

    /// Arrow navigation from the focused cell. Merged cells are stepped over as one.
    fn move_focus(&mut self, dc: isize, dr: isize, extend: bool) {
        let state = self.selection.state();
        let Some(current) = state.current else {
            if !self.columns.is_empty() && !self.order.is_empty() {
                self.navigate(Item::new(0, 0), false);
            }
            return;
        };
        let mut col = current.col;
        if let Some((start, end)) = self.display_span(current) {
            col = if dc > 0 { end } else { start };
        }
        let col = col.saturating_add_signed(dc).min(self.columns.len().saturating_sub(1));
        let row = current
            .row
            .saturating_add_signed(dr)
            .min(self.order.len().saturating_sub(1));
        let mut item = Item::new(col, row);
        if let Some((start, _)) = self.display_span(item) {
            item.col = start;
        }
        self.navigate(item, extend);
    }

    /// Tab / Shift+Tab: next or previous cell, wrapping across rows.
    fn step_cell(&mut self, forward: bool) {
        let Some(current) = self.selection.state().current else {
            return self.move_focus(0, 0, false);
        };
        let cols = self.columns.len();
        let rows = self.order.len();
        let item = match (forward, current.col + 1 < cols, current.col > 0) {
            (true, true, _) => Item::new(current.col + 1, current.row),
            (true, false, _) if current.row + 1 < rows => Item::new(0, current.row + 1),
            (false, _, true) => Item::new(current.col - 1, current.row),
            (false, _, false) if current.row > 0 => Item::new(cols.saturating_sub(1), current.row - 1),
            _ => return,
        };
        self.navigate(item, false);
    }

    fn navigate(&mut self, item: Item, extend: bool) {
        let before = self.selection.state().clone();
        self.selection.move_to(item, extend, &target!(self));
        self.selection_changed(&before);
        if let Some(current) = self.selection.state().current {
            self.scroll_into_view(current);
        }
    }

    // === Pointer ===

    pub fn pointer_down(&mut self, input: PointerInput) {
        // Clicking anywhere else blurs the editor, which commits it.
        self.commit_edit();
        let (tx, ty) = (self.region.tx, self.region.ty);

        if input.button == MouseButton::Left && self.on_fill_handle(input.x, input.y) {
            if input.click == ClickKind::Double {
                self.fill_handle_double_click();
            } else if let Some(source) = self.selection.state().primary_range() {
                self.drag = Some(Drag::FillHandle { source, target: None });
            }
            return;
        }

        match self.layout.hit_test(input.x, input.y, tx, ty) {
            HitTarget::Cell { item } => self.cell_down(item, input),
            HitTarget::Header { col } => self.header_down(col, input),
            HitTarget::GroupHeader { col } => self.group_header_down(col, input),
            HitTarget::RowMarker { row } => self.row_marker_down(row, input),
            HitTarget::Corner => self.corner_down(),
            HitTarget::OutOfBounds => {}
        }
    }

    fn on_fill_handle(&self, x: f32, y: f32) -> bool {
        if !self.options.fill_handle {
            return false;
        }
        self.selection
            .state()
            .primary_range()
            .and_then(|rect| self.layout.fill_handle_bounds(rect, self.region.tx, self.region.ty))
            .map_or(false, |b| b.contains(x, y))
    }

    fn cell_down(&mut self, item: Item, input: PointerInput) {
        let Some(logical) = self.logical_item(item) else {
            return;
        };
        let before = self.selection.state().clone();

        if input.button == MouseButton::Right {
            if !before.is_selected(item, logical.row) {
                self.selection.select_cell(item, &target!(self));
                self.selection_changed(&before);
            }
            self.emit(GridEvent::CellContextMenu {
                col: logical.col,
                row: logical.row,
            });
            return;
        }

        let focused = before.current == Some(item);
        self.selection.cell_down(item, input.mods, &target!(self));
        self.drag = Some(Drag::Cells);
        self.emit(GridEvent::CellClicked {
            col: logical.col,
            row: logical.row,
        });
        self.selection_changed(&before);

        if !input.mods.any() && should_activate(self.options.cell_activation_behavior, focused, input.click) {
            self.activate_cell(item);
        }
    }

    fn header_down(&mut self, col: usize, input: PointerInput) {
        let Some(logical) = self.columns.logical(col) else {
            return;
        };
        if input.button == MouseButton::Right {
            self.emit(GridEvent::HeaderMenuClicked { col: logical });
            return;
        }
        let right = self.layout.col_x(col, self.region.tx) + self.layout.col_width(col);
        if (right - input.x).abs() <= RESIZE_GRIP {
            self.drag = Some(Drag::ColumnResize {
                col: logical,
                start_x: input.x,
                start_width: self.layout.col_width(col),
            });
            return;
        }
        if input.click == ClickKind::Double {
            self.toggle_sort(logical, input.mods.shift);
            return;
        }

        let before = self.selection.state().clone();
        self.selection.header_click(col, input.mods, &target!(self));
        self.emit(GridEvent::HeaderClicked { col: logical });
        self.selection_changed(&before);
        self.drag = Some(Drag::ColumnMove { from: col });
    }

    /// Group header: select the run of adjacent columns in the group.
    fn group_header_down(&mut self, col: usize, input: PointerInput) {
        let group = |c: usize| {
            self.columns
                .logical(c)
                .and_then(|l| self.data.column(l))
                .and_then(|column| column.group.clone())
        };
        let Some(name) = group(col) else {
            return;
        };
        let first = (0..=col).rev().take_while(|&c| group(c).as_ref() == Some(&name)).last().unwrap_or(col);
        let last = (col..self.columns.len())
            .take_while(|&c| group(c).as_ref() == Some(&name))
            .last()
            .unwrap_or(col);

        let before = self.selection.state().clone();
        let t = target!(self);
        self.selection.header_click(first, input.mods, &t);
        if last > first {
            let mods = Modifiers {
                shift: true,
                ..input.mods
            };
            self.selection.header_click(last, mods, &t);
        }
        self.selection_changed(&before);
    }

    fn row_marker_down(&mut self, row: usize, input: PointerInput) {
        if self.options.row_markers == RowMarkers::Number {
            return;
        }
        let before = self.selection.state().clone();
        self.selection.row_click(row, input.mods, &target!(self));
        self.selection_changed(&before);
        self.drag = Some(Drag::RowMove { from: row });
    }

    /// Corner checkbox: select every visible row, or clear when all already are.
    fn corner_down(&mut self) {
        if !matches!(self.options.row_markers, RowMarkers::Checkbox | RowMarkers::Both) {
            return;
        }
        let before = self.selection.state().clone();
        let mut state = before.clone();
        let visible: Vec<usize> = self.order.rows().to_vec();
        if visible.iter().all(|r| state.rows.contains(r)) {
            state.rows.clear();
        } else {
            state.activate(Category::Row, &self.selection.options().blending);
            state.rows.extend(visible);
        }
        self.selection.set_state(state);
        self.selection_changed(&before);
    }

    /// Pointer moved: continues a drag, or reports hover.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let (tx, ty) = (self.region.tx, self.region.ty);
        let hit = self.layout.hit_test(x, y, tx, ty);
        match self.drag {
            Some(Drag::Cells) => {
                let item = match hit {
                    HitTarget::Cell { item } => item,
                    _ => self.clamped_item(x, y),
                };
                let before = self.selection.state().clone();
                self.selection.drag_to(item, &target!(self));
                self.selection_changed(&before);
            }
            Some(Drag::FillHandle { source, .. }) => {
                let pointer = self.clamped_item(x, y);
                let target = fill_handle_target(source, pointer, self.options.allowed_fill_directions);
                self.drag = Some(Drag::FillHandle { source, target });
                self.scheduler.borrow_mut().redraw_all();
            }
            Some(Drag::ColumnResize { col, start_x, start_width }) => {
                self.resize_column(col, start_width + x - start_x);
            }
            Some(Drag::ColumnMove { .. }) | Some(Drag::RowMove { .. }) => {}
            None => self.hover(hit, x, y),
        }
    }

    /// Display cell nearest to a pixel point, for drags leaving the cell area.
    fn clamped_item(&self, x: f32, y: f32) -> Item {
        let (tx, ty) = (self.region.tx, self.region.ty);
        let col = self.layout.col_at(x, tx).unwrap_or(if x <= self.layout.row_marker_width {
            0
        } else {
            self.columns.len().saturating_sub(1)
        });
        let row = self.layout.row_at(y, ty).unwrap_or(if y <= self.layout.header_total() {
            0
        } else {
            self.order.len().saturating_sub(1)
        });
        Item::new(col, row)
    }

    fn hover(&mut self, hit: HitTarget, x: f32, y: f32) {
        let is_fill_handle = self.on_fill_handle(x, y);
        let (kind, col, row) = match hit {
            HitTarget::Cell { item } => match self.logical_item(item) {
                Some(l) => (HoverKind::Cell, Some(l.col), Some(l.row)),
                None => (HoverKind::OutOfBounds, None, None),
            },
            HitTarget::Header { col } => (HoverKind::Header, self.columns.logical(col), None),
            HitTarget::GroupHeader { col } => (HoverKind::GroupHeader, self.columns.logical(col), None),
            HitTarget::RowMarker { row } => (HoverKind::RowMarker, None, self.order.logical(row)),
            HitTarget::Corner => (HoverKind::Header, None, None),
            HitTarget::OutOfBounds => (HoverKind::OutOfBounds, None, None),
        };
        let event = GridEvent::ItemHovered {
            kind,
            col,
            row,
            is_fill_handle,
        };
        if self.hover.as_ref() != Some(&event) {
            self.hover = Some(event.clone());
            self.pointer_at = Some((x, y));
            self.emit(event);
            self.scheduler.borrow_mut().redraw_all();
        }
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let (tx, ty) = (self.region.tx, self.region.ty);
        match self.drag.take() {
            Some(Drag::Cells) => self.selection.pointer_up(),
            Some(Drag::FillHandle {
                source,
                target: Some(target),
            }) => {
                self.fill(source, target);
            }
            Some(Drag::ColumnMove { from }) => {
                if let HitTarget::Header { col } = self.layout.hit_test(x, y, tx, ty) {
                    self.move_column(from, col);
                }
            }
            Some(Drag::RowMove { from }) => {
                if let HitTarget::RowMarker { row } | HitTarget::Cell { item: Item { row, .. } } =
                    self.layout.hit_test(x, y, tx, ty)
                {
                    self.move_row(from, row);
                }
            }
            Some(Drag::FillHandle { target: None, .. }) | Some(Drag::ColumnResize { .. }) | None => {}
        }
        self.scheduler.borrow_mut().redraw_all();
    }

    /// The fill target being dragged, for painting its outline
    pub fn fill_preview(&self) -> Option<Rect> {
        match self.drag {
            Some(Drag::FillHandle { target, .. }) => target,
            _ => None,
        }
    }
}
