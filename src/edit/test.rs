use super::batch::{double_click_fill_target, fill_handle_target, paste_cell, plan_fill, plan_paste, Placement};
use super::*;
use crate::config::FillDirections;
use crate::kinds::{CellRegistry, EditError};
use crate::model::cell::Cell;
use crate::model::column::Column;
use crate::model::data::GridData;
use crate::model::{Item, Rect};

fn make_data(rows: usize, cols: usize) -> GridData {
    let columns = (0..cols).map(|c| Column::new(format!("c{}", c))).collect();
    let rows = (0..rows)
        .map(|r| (0..cols).map(|c| Cell::text(format!("{}-{}", r, c))).collect())
        .collect();
    GridData::new(columns, rows).unwrap()
}

fn text_at(data: &GridData, col: usize, row: usize) -> String {
    CellRegistry::new().copy(data.get_cell(col, row).unwrap())
}

fn set_entry(data: &GridData, cells: &[(usize, usize, &str)]) -> UndoEntry {
    let mut batch = EditBatch::new();
    for &(col, row, text) in cells {
        let previous = data.get_cell(col, row).unwrap().clone();
        batch.push(col, row, previous, Cell::text(text));
    }
    batch.finish(EditSource::Edit).unwrap()
}

fn block(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect()).collect()
}

// === Entries ===

#[test]
fn test_apply_and_revert_entry() {
    let mut data = make_data(2, 2);
    let entry = set_entry(&data, &[(0, 0, "a"), (1, 1, "b")]);
    entry.apply(&mut data);
    assert_eq!(text_at(&data, 0, 0), "a");
    assert_eq!(text_at(&data, 1, 1), "b");

    entry.revert(&mut data);
    assert_eq!(text_at(&data, 0, 0), "0-0");
    assert_eq!(text_at(&data, 1, 1), "1-1");
}

#[test]
fn test_inverse_unwinds_repeated_writes() {
    let mut data = make_data(1, 1);
    let changes = vec![
        CellChange {
            col: 0,
            row: 0,
            previous: Cell::text("0-0"),
            new: Cell::text("first"),
        },
        CellChange {
            col: 0,
            row: 0,
            previous: Cell::text("first"),
            new: Cell::text("second"),
        },
    ];
    let entry = UndoEntry::new(EditSource::Fill, changes).unwrap();
    entry.apply(&mut data);
    assert_eq!(text_at(&data, 0, 0), "second");
    entry.inverse().apply(&mut data);
    assert_eq!(text_at(&data, 0, 0), "0-0");
}

#[test]
fn test_batch_skips_noops() {
    let mut batch = EditBatch::new();
    batch.push(0, 0, Cell::text("same"), Cell::text("same"));
    assert!(batch.is_empty());
    assert!(batch.finish(EditSource::Paste).is_none());
}

#[test]
fn test_entry_does_not_touch_earlier_snapshot() {
    let mut data = make_data(2, 1);
    let before = data.clone();
    set_entry(&data, &[(0, 1, "x")]).apply(&mut data);
    assert_eq!(text_at(&before, 0, 1), "1-0");
    assert!(data.shares_row(&before, 0));
    assert!(!data.shares_row(&before, 1));
}

// === History ===

#[test]
fn test_undo_redo_roundtrip() {
    let mut data = make_data(2, 2);
    let original = data.clone();
    let mut history = History::new(10);

    let entry = set_entry(&data, &[(0, 0, "x"), (1, 0, "y")]);
    entry.apply(&mut data);
    history.record(entry);
    let edited = data.clone();

    history.undo().unwrap().apply(&mut data);
    assert_eq!(text_at(&data, 0, 0), text_at(&original, 0, 0));
    assert!(history.can_redo());

    history.redo().unwrap().apply(&mut data);
    assert_eq!(text_at(&data, 0, 0), text_at(&edited, 0, 0));
    assert_eq!(text_at(&data, 1, 0), "y");
    assert!(!history.can_redo());
}

#[test]
fn test_history_is_bounded() {
    let data = make_data(1, 1);
    let mut history = History::new(3);
    for i in 0..5 {
        history.record(set_entry(&data, &[(0, 0, &format!("v{}", i))]));
    }
    assert_eq!(history.len(), 3);

    let mut undone = Vec::new();
    while let Some(entry) = history.undo() {
        undone.push(entry.changes()[0].previous.clone());
    }
    assert_eq!(undone, vec![Cell::text("v4"), Cell::text("v3"), Cell::text("v2")]);
}

#[test]
fn test_new_edit_discards_redo_tail() {
    let data = make_data(1, 1);
    let mut history = History::new(10);
    history.record(set_entry(&data, &[(0, 0, "a")]));
    history.undo();
    assert!(history.can_redo());
    history.record(set_entry(&data, &[(0, 0, "b")]));
    assert!(!history.can_redo());
    assert_eq!(history.len(), 1);
}

#[test]
fn test_zero_steps_records_nothing() {
    let data = make_data(1, 1);
    let mut history = History::new(0);
    history.record(set_entry(&data, &[(0, 0, "a")]));
    assert!(!history.can_undo());

    let mut history = History::new(5);
    for _ in 0..4 {
        history.record(set_entry(&data, &[(0, 0, "a")]));
    }
    history.set_max_steps(2);
    assert_eq!(history.len(), 2);
}

// === Paste ===

#[test]
fn test_paste_block_into_matching_selection() {
    let placements = plan_paste(&block(&[&["X", "Y"], &["A", "B"]]), Some(Rect::new(1, 0, 2, 2)), Item::new(1, 0), 5, 5);
    let expected = vec![
        Placement {
            target: Item::new(1, 0),
            text: "X".into(),
        },
        Placement {
            target: Item::new(2, 0),
            text: "Y".into(),
        },
        Placement {
            target: Item::new(1, 1),
            text: "A".into(),
        },
        Placement {
            target: Item::new(2, 1),
            text: "B".into(),
        },
    ];
    assert_eq!(placements, expected);
}

#[test]
fn test_paste_tiles_over_multiple_selection() {
    let placements = plan_paste(&block(&[&["1", "2"]]), Some(Rect::new(0, 0, 4, 2)), Item::new(0, 0), 10, 10);
    let texts: Vec<&str> = placements.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(texts, vec!["1", "2", "1", "2", "1", "2", "1", "2"]);
}

#[test]
fn test_paste_clips_at_grid_edge() {
    let placements = plan_paste(&block(&[&["a", "b", "c"], &["d", "e", "f"]]), Some(Rect::new(3, 4, 1, 1)), Item::new(3, 4), 5, 5);
    let targets: Vec<Item> = placements.iter().map(|p| p.target).collect();
    assert_eq!(targets, vec![Item::new(3, 4), Item::new(4, 4)]);
}

#[test]
fn test_paste_ragged_rows() {
    let placements = plan_paste(&block(&[&["a", "b"], &["c"]]), None, Item::new(0, 0), 5, 5);
    assert_eq!(placements.len(), 3);
}

#[test]
fn test_paste_cell_coerces_and_validates() {
    let registry = CellRegistry::new();
    let coercer = BooleanWords;
    let outcome = paste_cell(&registry, Some(&coercer), None, Item::new(0, 0), "yes", &Cell::boolean(false));
    assert_eq!(outcome, PasteOutcome::Accepted(Cell::boolean(true)));

    let outcome = paste_cell(&registry, None, None, Item::new(0, 0), "yes", &Cell::boolean(false));
    assert!(matches!(outcome, PasteOutcome::Rejected(EditError::Parse(_))));

    let no_negatives = |_: Item, _: &Cell, new: &Cell| new.data != crate::model::cell::CellData::Number(Some(-1.0));
    let outcome = paste_cell(&registry, None, Some(&no_negatives), Item::new(0, 0), "-1", &Cell::number(3.0));
    assert_eq!(outcome, PasteOutcome::Vetoed);
}

#[test]
fn test_boolean_words_ignore_other_kinds() {
    assert_eq!(BooleanWords.coerce("yes", &Cell::text("")), None);
    assert_eq!(BooleanWords.coerce(" Off ", &Cell::boolean(true)), Some("false".into()));
}

// === Fill ===

#[test]
fn test_fill_tiles_pattern_down() {
    let pairs = plan_fill(Rect::new(1, 0, 2, 1), Rect::new(1, 0, 2, 3));
    assert_eq!(pairs.len(), 4);
    assert!(pairs.contains(&(Item::new(1, 2), Item::new(1, 0))));
    assert!(pairs.contains(&(Item::new(2, 1), Item::new(2, 0))));
}

#[test]
fn test_fill_upward_keeps_pattern_phase() {
    let pairs = plan_fill(Rect::new(0, 2, 1, 2), Rect::new(0, 0, 1, 4));
    assert_eq!(pairs, vec![(Item::new(0, 0), Item::new(0, 2)), (Item::new(0, 1), Item::new(0, 3))]);
}

#[test]
fn test_double_click_fill_stops_at_first_empty_left_cell() {
    let populated_through = 9;
    let target = double_click_fill_target(Rect::new(1, 0, 2, 1), 20, |item| item.row > populated_through).unwrap();
    assert_eq!(target, Rect::new(1, 0, 2, 10));

    assert_eq!(double_click_fill_target(Rect::new(0, 0, 2, 1), 20, |_| false), None);
    assert_eq!(double_click_fill_target(Rect::new(1, 0, 1, 1), 20, |item| item.row >= 1), None);
}

#[test]
fn test_fill_handle_directions() {
    let source = Rect::new(2, 2, 1, 1);
    assert_eq!(
        fill_handle_target(source, Item::new(2, 5), FillDirections::Vertical),
        Some(Rect::new(2, 2, 1, 4))
    );
    assert_eq!(fill_handle_target(source, Item::new(5, 2), FillDirections::Vertical), None);
    assert_eq!(
        fill_handle_target(source, Item::new(0, 2), FillDirections::Horizontal),
        Some(Rect::new(0, 2, 3, 1))
    );
    assert_eq!(
        fill_handle_target(source, Item::new(3, 6), FillDirections::Orthogonal),
        Some(Rect::new(2, 2, 1, 5))
    );
    assert_eq!(
        fill_handle_target(source, Item::new(4, 4), FillDirections::Any),
        Some(Rect::new(2, 2, 3, 3))
    );
    assert_eq!(fill_handle_target(source, Item::new(2, 2), FillDirections::Any), None);
}

#[test]
fn test_flash_triggers_by_source() {
    use crate::config::FlashTrigger;
    assert_eq!(EditSource::Fill.flash_trigger(), FlashTrigger::Paste);
    assert_eq!(EditSource::Clear.flash_trigger(), FlashTrigger::Edit);
}
