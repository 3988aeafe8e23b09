use std::collections::BTreeSet;

use super::sort::{column_is_sortable, SortColumn, SortDirection};
use super::*;
use crate::model::cell::{Cell, CellData, GraphKind};
use crate::model::column::Column;

fn make_data(ids: &[&str], rows: Vec<Vec<Cell>>) -> GridData {
    GridData::new(ids.iter().map(|id| Column::new(*id)).collect(), rows).unwrap()
}

fn numbers(rows: &[&[f64]]) -> Vec<Vec<Cell>> {
    rows.iter()
        .map(|r| r.iter().map(|n| Cell::number(*n)).collect())
        .collect()
}

fn order(data: &GridData, sort: &[SortColumn], filter: &FilterSpec, hidden: &[usize]) -> Vec<usize> {
    let hidden: BTreeSet<usize> = hidden.iter().copied().collect();
    DisplayOrder::compute(data, &CellRegistry::new(), sort, filter, &hidden).rows().to_vec()
}

#[test]
fn test_sort_on_second_column() {
    let data = make_data(&["a", "b"], numbers(&[&[1.0, 2.0], &[3.0, 4.0]]));
    let none = FilterSpec::new();

    let asc = [SortColumn::new(1, SortDirection::Ascending)];
    assert_eq!(order(&data, &asc, &none, &[]), vec![0, 1]);

    let desc = [SortColumn::new(1, SortDirection::Descending)];
    assert_eq!(order(&data, &desc, &none, &[]), vec![1, 0]);
}

#[test]
fn test_resort_is_idempotent() {
    let data = make_data(&["a"], numbers(&[&[3.0], &[1.0], &[2.0], &[1.0]]));
    let spec = [SortColumn::new(0, SortDirection::Ascending)];
    let first = order(&data, &spec, &FilterSpec::new(), &[]);
    let second = order(&data, &spec, &FilterSpec::new(), &[]);
    assert_eq!(first, vec![1, 3, 2, 0]);
    assert_eq!(first, second);
}

#[test]
fn test_ties_use_secondary_key_then_logical_index() {
    let data = make_data(
        &["group", "value"],
        numbers(&[&[1.0, 5.0], &[0.0, 9.0], &[1.0, 2.0], &[0.0, 9.0]]),
    );
    let spec = [
        SortColumn::new(0, SortDirection::Ascending),
        SortColumn::new(1, SortDirection::Descending),
    ];
    assert_eq!(order(&data, &spec, &FilterSpec::new(), &[]), vec![1, 3, 0, 2]);
}

#[test]
fn test_empty_cells_sort_last_in_both_directions() {
    let rows = vec![
        vec![Cell::new(CellData::Number(None))],
        vec![Cell::number(2.0)],
        vec![Cell::number(1.0)],
    ];
    let data = make_data(&["n"], rows);
    let none = FilterSpec::new();
    assert_eq!(order(&data, &[SortColumn::new(0, SortDirection::Ascending)], &none, &[]), vec![2, 1, 0]);
    assert_eq!(order(&data, &[SortColumn::new(0, SortDirection::Descending)], &none, &[]), vec![1, 2, 0]);
}

#[test]
fn test_sparkline_sorts_by_mean() {
    let spark = |values: Vec<f64>| {
        Cell::new(CellData::Sparkline {
            values,
            y_axis: None,
            graph: GraphKind::Line,
        })
    };
    let data = make_data(
        &["trend"],
        vec![vec![spark(vec![10.0, 0.0])], vec![spark(vec![1.0, 2.0])], vec![spark(vec![9.0, 9.0])]],
    );
    let spec = [SortColumn::new(0, SortDirection::Ascending)];
    assert_eq!(order(&data, &spec, &FilterSpec::new(), &[]), vec![1, 0, 2]);
}

#[test]
fn test_button_columns_are_not_sortable() {
    let buttons = vec![
        vec![Cell::new(CellData::Button { title: "b".into() })],
        vec![Cell::new(CellData::Button { title: "a".into() })],
    ];
    let data = make_data(&["action"], buttons);
    let registry = CellRegistry::new();
    assert!(!column_is_sortable(&data, &registry, 0));

    let spec = [SortColumn::new(0, SortDirection::Ascending)];
    assert_eq!(order(&data, &spec, &FilterSpec::new(), &[]), vec![0, 1]);
}

#[test]
fn test_unsortable_flag_is_respected() {
    let columns = vec![Column::new("n").unsortable()];
    let data = GridData::new(columns, numbers(&[&[2.0], &[1.0]])).unwrap();
    let spec = [SortColumn::new(0, SortDirection::Ascending)];
    assert_eq!(order(&data, &spec, &FilterSpec::new(), &[]), vec![0, 1]);
}

#[test]
fn test_filter_keeps_matching_rows() {
    let rows = vec![
        vec![Cell::text("red"), Cell::number(1.0)],
        vec![Cell::text("blue"), Cell::number(2.0)],
        vec![Cell::text("red"), Cell::number(3.0)],
    ];
    let data = make_data(&["color", "n"], rows);
    let mut filter = FilterSpec::new();
    filter.allow(0, ["red"]);
    assert_eq!(order(&data, &[], &filter, &[]), vec![0, 2]);

    filter.allow(1, ["3"]);
    assert_eq!(order(&data, &[], &filter, &[]), vec![2]);

    filter.clear_column(0);
    filter.clear_column(1);
    assert!(filter.is_empty());
    assert_eq!(order(&data, &[], &filter, &[]), vec![0, 1, 2]);
}

#[test]
fn test_filter_ignores_display_data() {
    let rows = vec![vec![Cell::text("raw").with_display("shown")]];
    let data = make_data(&["a"], rows);
    let mut filter = FilterSpec::new();
    filter.allow(0, ["shown"]);
    assert!(order(&data, &[], &filter, &[]).is_empty());
    filter.allow(0, ["raw"]);
    assert_eq!(order(&data, &[], &filter, &[]), vec![0]);
}

#[test]
fn test_display_order_is_permutation_of_passing_rows() {
    let data = make_data(&["n"], numbers(&[&[4.0], &[2.0], &[5.0], &[1.0], &[3.0]]));
    let spec = [SortColumn::new(0, SortDirection::Descending)];
    let hidden: BTreeSet<usize> = [2].into_iter().collect();
    let display = DisplayOrder::compute(&data, &CellRegistry::new(), &spec, &FilterSpec::new(), &hidden);

    assert_eq!(display.rows(), &[0, 4, 1, 3]);
    assert_eq!(display.len(), 4);
    assert!(!display.is_visible(2));
    assert_eq!(display.display(2), None);
    for (pos, &logical) in display.rows().iter().enumerate() {
        assert_eq!(display.display(logical), Some(pos));
        assert_eq!(display.logical(pos), Some(logical));
    }
}

#[test]
fn test_hidden_rows_keep_logical_numbering() {
    let data = make_data(&["n"], numbers(&[&[0.0], &[1.0], &[2.0], &[3.0], &[4.0]]));
    let hidden: BTreeSet<usize> = [2].into_iter().collect();
    let display = DisplayOrder::compute(&data, &CellRegistry::new(), &[], &FilterSpec::new(), &hidden);
    assert_eq!(display.rows(), &[0, 1, 3, 4]);
    assert_eq!(display.logical(2), Some(3));

    let shown = DisplayOrder::compute(&data, &CellRegistry::new(), &[], &FilterSpec::new(), &BTreeSet::new());
    assert_eq!(shown.display(2), Some(2));
}

#[test]
fn test_jump_clamps() {
    let display = DisplayOrder::identity(10);
    assert_eq!(display.jump_down(8, 5), 9);
    assert_eq!(display.jump_up(2, 5), 0);
    assert_eq!(display.last(), Some(9));
    assert_eq!(DisplayOrder::identity(0).last(), None);
}

#[test]
fn test_large_grid_sorts_in_parallel_path() {
    let rows: Vec<Vec<Cell>> = (0..sort::PARALLEL_THRESHOLD + 10)
        .map(|i| vec![Cell::number(((i * 7919) % 1000) as f64)])
        .collect();
    let data = make_data(&["n"], rows);
    let spec = [SortColumn::new(0, SortDirection::Ascending)];
    let display = DisplayOrder::compute(&data, &CellRegistry::new(), &spec, &FilterSpec::new(), &BTreeSet::new());

    assert_eq!(display.len(), data.row_count());
    let registry = CellRegistry::new();
    let values: Vec<String> = display
        .rows()
        .iter()
        .map(|&r| registry.copy(data.get_cell(0, r).unwrap()))
        .collect();
    let parsed: Vec<f64> = values.iter().map(|v| v.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_column_order_moves() {
    let mut cols = ColumnOrder::identity(4);
    assert!(cols.move_column(0, 2));
    assert_eq!(cols.as_slice(), &[1, 2, 0, 3]);
    assert_eq!(cols.display(0), Some(2));
    assert_eq!(cols.logical(0), Some(1));
    assert!(!cols.move_column(0, 4));
    assert_eq!(cols.as_slice(), &[1, 2, 0, 3]);
}
