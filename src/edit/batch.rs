//! Paste, fill and the collaborators that may reshape or veto values.

use crate::config::FillDirections;
use crate::kinds::{CellRegistry, EditError};
use crate::model::cell::{Cell, KindTag};
use crate::model::{Item, Rect};

/// Rewrites pasted text before the cell kind parses it.
pub trait Coercer {
    /// Replacement text for `text` landing in `target`, or `None` to leave it alone.
    fn coerce(&self, text: &str, target: &Cell) -> Option<String>;
}

/// Maps yes/no style words onto boolean cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanWords;

impl Coercer for BooleanWords {
    fn coerce(&self, text: &str, target: &Cell) -> Option<String> {
        if target.kind() != KindTag::Boolean {
            return None;
        }
        match text.trim().to_lowercase().as_str() {
            "yes" | "y" | "on" | "1" | "checked" | "x" => Some("true".to_string()),
            "no" | "n" | "off" | "0" | "unchecked" => Some("false".to_string()),
            _ => None,
        }
    }
}

/// Final veto over a new cell value. `item` is the logical address.
pub trait Validator {
    fn validate(&self, item: Item, previous: &Cell, new: &Cell) -> bool;
}

impl<F> Validator for F
where
    F: Fn(Item, &Cell, &Cell) -> bool,
{
    fn validate(&self, item: Item, previous: &Cell, new: &Cell) -> bool {
        self(item, previous, new)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    Accepted(Cell),
    Rejected(EditError),
    /// The validator refused the parsed value
    Vetoed,
}

/// Run one pasted value through coercion, the kind's parser and the validator.
pub fn paste_cell(
    registry: &CellRegistry,
    coercer: Option<&dyn Coercer>,
    validator: Option<&dyn Validator>,
    item: Item,
    text: &str,
    cell: &Cell,
) -> PasteOutcome {
    let coerced = coercer.and_then(|c| c.coerce(text, cell));
    let text = coerced.as_deref().unwrap_or(text);
    match registry.paste(text, cell) {
        Ok(new) => {
            if validator.map_or(true, |v| v.validate(item, cell, &new)) {
                PasteOutcome::Accepted(new)
            } else {
                PasteOutcome::Vetoed
            }
        }
        Err(err) => PasteOutcome::Rejected(err),
    }
}

/// A pasted value bound to a display cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub target: Item,
    pub text: String,
}

/// Where each value of a pasted block lands.
///
/// When `selection` is an exact multiple of the block's shape the block is tiled across
/// it. Otherwise it is pasted once at `origin` and clipped to the grid.
pub fn plan_paste(block: &[Vec<String>], selection: Option<Rect>, origin: Item, cols: usize, rows: usize) -> Vec<Placement> {
    let height = block.len();
    let width = block.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let area = match selection {
        Some(sel) if sel.width % width == 0 && sel.height % height == 0 && !sel.is_empty() => sel,
        Some(sel) => Rect::new(sel.x, sel.y, width, height),
        None => Rect::new(origin.col, origin.row, width, height),
    }
    .clamp_to(cols, rows);

    area.items()
        .filter_map(|target| {
            let r = (target.row - area.y) % height;
            let c = (target.col - area.x) % width;
            block[r].get(c).map(|text| Placement {
                target,
                text: text.clone(),
            })
        })
        .collect()
}

/// Pair every cell of `target` with the `source` cell whose value it receives.
/// The source pattern repeats in all directions from its own origin.
pub fn plan_fill(source: Rect, target: Rect) -> Vec<(Item, Item)> {
    if source.is_empty() {
        return Vec::new();
    }
    target
        .items()
        .filter(|item| !source.contains(*item))
        .map(|item| {
            let dc = (item.col as i64 - source.x as i64).rem_euclid(source.width as i64) as usize;
            let dr = (item.row as i64 - source.y as i64).rem_euclid(source.height as i64) as usize;
            (item, Item::new(source.x + dc, source.y + dr))
        })
        .collect()
}

/// Fill-handle double-click: the rows to fill, found by walking the column left of
/// `selection` down from its top row until the first empty cell.
///
/// Returns `None` when the selection touches column 0 or nothing would change.
pub fn double_click_fill_target(selection: Rect, rows: usize, is_empty: impl Fn(Item) -> bool) -> Option<Rect> {
    if selection.x == 0 || selection.is_empty() {
        return None;
    }
    let left = selection.x - 1;
    let end = (selection.y..rows)
        .find(|&row| is_empty(Item::new(left, row)))
        .unwrap_or(rows);
    if end <= selection.bottom() {
        return None;
    }
    Some(Rect::new(selection.x, selection.y, selection.width, end - selection.y))
}

/// Rectangle covered by dragging the fill handle of `source` to `pointer`.
pub fn fill_handle_target(source: Rect, pointer: Item, directions: FillDirections) -> Option<Rect> {
    if source.is_empty() || source.contains(pointer) {
        return None;
    }
    let down = pointer.row.saturating_sub(source.bottom().saturating_sub(1));
    let up = source.y.saturating_sub(pointer.row);
    let right = pointer.col.saturating_sub(source.right().saturating_sub(1));
    let left = source.x.saturating_sub(pointer.col);
    let vertical = down.max(up);
    let horizontal = right.max(left);

    let extend_rows = |r: Rect| {
        if down > 0 {
            Rect::new(r.x, r.y, r.width, r.height + down)
        } else {
            Rect::new(r.x, pointer.row, r.width, r.bottom() - pointer.row)
        }
    };
    let extend_cols = |r: Rect| {
        if right > 0 {
            Rect::new(r.x, r.y, r.width + right, r.height)
        } else {
            Rect::new(pointer.col, r.y, r.right() - pointer.col, r.height)
        }
    };

    let target = match directions {
        FillDirections::Vertical if vertical > 0 => extend_rows(source),
        FillDirections::Horizontal if horizontal > 0 => extend_cols(source),
        FillDirections::Orthogonal if vertical >= horizontal && vertical > 0 => extend_rows(source),
        FillDirections::Orthogonal if horizontal > 0 => extend_cols(source),
        FillDirections::Any => {
            let rows = if vertical > 0 { extend_rows(source) } else { source };
            if horizontal > 0 {
                extend_cols(rows)
            } else {
                rows
            }
        }
        _ => return None,
    };
    Some(target)
}
