use super::cell::{Cell, CellData, KindTag};
use super::column::Column;
use super::data::GridData;
use super::*;
use crate::error::GridError;

fn row(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::text(*v)).collect()
}

fn columns(ids: &[&str]) -> Vec<Column> {
    ids.iter().map(|id| Column::new(*id)).collect()
}

#[test]
fn test_rect_geometry() {
    let rect = Rect::new(1, 2, 3, 2);
    assert_eq!(rect.right(), 4);
    assert_eq!(rect.bottom(), 4);
    assert!(rect.contains(Item::new(3, 3)));
    assert!(!rect.contains(Item::new(4, 3)));
    assert!(!rect.contains(Item::new(1, 4)));

    let items: Vec<Item> = Rect::new(0, 0, 2, 2).items().collect();
    assert_eq!(
        items,
        vec![Item::new(0, 0), Item::new(1, 0), Item::new(0, 1), Item::new(1, 1)]
    );
}

#[test]
fn test_rect_spanning_and_union() {
    let rect = Rect::spanning(Item::new(3, 4), Item::new(1, 2));
    assert_eq!(rect, Rect::new(1, 2, 3, 3));

    let union = Rect::new(0, 0, 1, 1).union(&Rect::new(2, 3, 1, 1));
    assert_eq!(union, Rect::new(0, 0, 3, 4));
    assert_eq!(Rect::default().union(&rect), rect);
}

#[test]
fn test_rect_clamp_to_grid() {
    assert_eq!(Rect::new(1, 1, 5, 5).clamp_to(3, 4), Rect::new(1, 1, 2, 3));
    assert!(Rect::new(5, 0, 2, 2).clamp_to(3, 3).is_empty());
}

#[test]
fn test_bounds_contains_and_inset() {
    let b = Bounds::new(10.0, 10.0, 20.0, 10.0);
    assert!(b.contains(10.0, 10.0));
    assert!(!b.contains(30.0, 15.0));
    assert_eq!(b.inset(2.0, 1.0), Bounds::new(12.0, 11.0, 16.0, 8.0));
    assert_eq!(b.inset(20.0, 0.0).width, 0.0);
}

#[test]
fn test_data_rejects_bad_shapes() {
    assert!(matches!(GridData::new(vec![], vec![]), Err(GridError::NoColumns)));
    assert!(matches!(
        GridData::new(columns(&["a", "a"]), vec![]),
        Err(GridError::DuplicateColumnId(id)) if id == "a"
    ));
    assert!(matches!(
        GridData::new(columns(&["a", "b"]), vec![row(&["1", "2"]), row(&["3"])]),
        Err(GridError::RowShape { row: 1, expected: 2, found: 1 })
    ));
}

#[test]
fn test_set_cell_copies_only_written_row() {
    let mut data = GridData::new(columns(&["a"]), vec![row(&["x"]), row(&["y"])]).unwrap();
    let snapshot = data.clone();

    data.set_cell(0, 1, Cell::text("z"));
    data.set_cell(5, 5, Cell::text("ignored"));

    assert_eq!(data.get_cell(0, 1), Some(&Cell::text("z")));
    assert_eq!(snapshot.get_cell(0, 1), Some(&Cell::text("y")));
    assert!(data.shares_row(&snapshot, 0));
    assert!(!data.shares_row(&snapshot, 1));
}

#[test]
fn test_effective_span_requires_consistent_cells() {
    let good = vec![
        Cell::text("merged").with_span(0, 1),
        Cell::text("").with_span(0, 1),
        Cell::text("solo"),
    ];
    let broken = vec![
        Cell::text("half").with_span(0, 1),
        Cell::text(""),
        Cell::text("outside").with_span(2, 4),
    ];
    let data = GridData::new(columns(&["a", "b", "c"]), vec![good, broken]).unwrap();

    assert_eq!(data.effective_span(0, 0), Some((0, 1)));
    assert_eq!(data.effective_span(1, 0), Some((0, 1)));
    assert_eq!(data.effective_span(2, 0), None);
    assert_eq!(data.effective_span(0, 1), None);
    assert_eq!(data.effective_span(2, 1), None);
    assert_eq!(data.span_violations(), vec![Item::new(0, 1), Item::new(2, 1)]);
}

#[test]
fn test_with_data_keeps_presentation_settings() {
    let cell = Cell::text("old").with_display("OLD").with_span(0, 1).read_only();
    let new = cell.with_data(CellData::Text("new".into()));
    assert_eq!(new.display_data, None);
    assert!(!new.allow_overlay);
    assert_eq!(new.span, Some((0, 1)));
}

#[test]
fn test_kind_names_round_trip() {
    for tag in KindTag::ALL {
        assert_eq!(KindTag::parse(tag.as_str()), tag);
    }
    assert_eq!(KindTag::parse("hologram"), KindTag::Unknown);
    assert!(!Cell::loading().allow_overlay);
    assert!(Cell::text("").is_selectable());
}
