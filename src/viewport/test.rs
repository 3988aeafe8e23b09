use super::*;

/// 5 columns of 100px, 10 rows of 30px, 250x160 viewport with a 40px header
fn basic() -> Layout {
    Layout::new(&[100.0; 5], RowHeights::uniform(30.0, 10), 250.0, 160.0).with_headers(40.0, 0.0)
}

fn frozen() -> Layout {
    basic().with_frozen(1, 2)
}

// === Visible region ===

#[test]
fn test_region_at_origin() {
    let region = visible_region(&basic(), 0.0, 0.0);
    assert_eq!((region.x, region.y, region.width, region.height), (0, 0, 3, 4));
}

#[test]
fn test_region_counts_partial_cells() {
    let region = visible_region(&basic(), 150.0, 45.0);
    assert_eq!((region.x, region.y, region.width, region.height), (1, 1, 3, 5));
    assert_eq!((region.tx, region.ty), (150.0, 45.0));
}

#[test]
fn test_region_clamps_scroll() {
    let layout = basic();
    assert_eq!(layout.max_scroll(), (250.0, 180.0));
    let region = visible_region(&layout, 1000.0, 1000.0);
    assert_eq!((region.tx, region.ty), (250.0, 180.0));
    assert_eq!((region.x, region.y, region.width, region.height), (2, 6, 3, 4));

    let region = visible_region(&layout, -50.0, f32::NAN);
    assert_eq!((region.tx, region.ty), (0.0, 0.0));
}

#[test]
fn test_frozen_columns_and_trailing_rows_always_visible() {
    let layout = frozen();
    assert_eq!(layout.scroll_area(), (150.0, 60.0));

    let region = visible_region(&layout, 0.0, 0.0);
    assert_eq!((region.x, region.width), (1, 2));
    assert_eq!(layout.visible_columns(&region), vec![0, 1, 2]);
    assert_eq!(layout.visible_rows(&region), vec![0, 1, 8, 9]);

    let region = visible_region(&layout, 100.0, 0.0);
    assert_eq!(layout.visible_columns(&region), vec![0, 2, 3]);
    assert_eq!(layout.col_x(0, 100.0), 0.0);
    assert_eq!(layout.col_x(2, 100.0), 100.0);
}

#[test]
fn test_trailing_rows_pinned_to_bottom() {
    let layout = frozen();
    assert_eq!(layout.row_y(8, 0.0), 100.0);
    assert_eq!(layout.row_y(9, 500.0), 130.0);
    assert_eq!(layout.row_y(0, 0.0), 40.0);
}

#[test]
fn test_zero_height_rows_are_skipped() {
    let rows = RowHeights::variable([30.0, 0.0, 30.0, 30.0]);
    assert_eq!(rows.height(1), 0.0);
    assert_eq!(rows.row_at(29.0), Some(0));
    assert_eq!(rows.row_at(30.0), Some(2));
    assert_eq!(rows.row_at(90.0), None);

    let layout = Layout::new(&[100.0], rows, 100.0, 500.0);
    let region = visible_region(&layout, 0.0, 0.0);
    assert_eq!(layout.visible_rows(&region), vec![0, 2, 3]);
}

#[test]
fn test_empty_scroll_area() {
    let layout = Layout::new(&[100.0; 3], RowHeights::uniform(30.0, 3), 0.0, 0.0);
    let region = visible_region(&layout, 0.0, 0.0);
    assert_eq!((region.width, region.height), (0, 0));
}

// === Geometry ===

#[test]
fn test_cell_bounds_follow_scroll() {
    let bounds = basic().cell_bounds(Item::new(2, 3), 150.0, 45.0).unwrap();
    assert_eq!(bounds, Bounds::new(50.0, 85.0, 100.0, 30.0));
    assert!(basic().cell_bounds(Item::new(5, 0), 0.0, 0.0).is_none());
}

#[test]
fn test_span_and_fill_handle_bounds() {
    let layout = basic();
    assert_eq!(layout.span_bounds(0, 1, 2, 0.0, 0.0), Some(Bounds::new(100.0, 40.0, 200.0, 30.0)));
    assert_eq!(
        layout.fill_handle_bounds(Rect::new(0, 0, 1, 1), 0.0, 0.0),
        Some(Bounds::new(96.0, 66.0, 8.0, 8.0))
    );
}

#[test]
fn test_hit_test() {
    let layout = Layout::new(&[100.0; 3], RowHeights::uniform(30.0, 5), 400.0, 300.0)
        .with_headers(30.0, 20.0)
        .with_row_markers(40.0);

    assert_eq!(layout.hit_test(10.0, 10.0, 0.0, 0.0), HitTarget::Corner);
    assert_eq!(layout.hit_test(50.0, 10.0, 0.0, 0.0), HitTarget::GroupHeader { col: 0 });
    assert_eq!(layout.hit_test(150.0, 30.0, 0.0, 0.0), HitTarget::Header { col: 1 });
    assert_eq!(layout.hit_test(10.0, 60.0, 0.0, 0.0), HitTarget::RowMarker { row: 0 });
    assert_eq!(
        layout.hit_test(45.0, 85.0, 0.0, 0.0),
        HitTarget::Cell {
            item: Item::new(0, 1)
        }
    );
    assert_eq!(layout.hit_test(360.0, 60.0, 0.0, 0.0), HitTarget::OutOfBounds);
    assert_eq!(layout.hit_test(50.0, 250.0, 0.0, 0.0), HitTarget::OutOfBounds);
    assert_eq!(layout.hit_test(-1.0, 0.0, 0.0, 0.0), HitTarget::OutOfBounds);
}

#[test]
fn test_hit_test_frozen_band() {
    let layout = frozen();
    assert_eq!(
        layout.hit_test(50.0, 110.0, 200.0, 90.0),
        HitTarget::Cell {
            item: Item::new(0, 8)
        }
    );
    assert_eq!(
        layout.hit_test(150.0, 50.0, 100.0, 30.0),
        HitTarget::Cell {
            item: Item::new(2, 1)
        }
    );
}

#[test]
fn test_scroll_to_reveals_cell() {
    let layout = basic();
    assert_eq!(layout.scroll_to(Item::new(4, 9), 0.0, 0.0), (250.0, 180.0));
    assert_eq!(layout.scroll_to(Item::new(0, 0), 250.0, 180.0), (0.0, 0.0));
    assert_eq!(layout.scroll_to(Item::new(1, 1), 0.0, 0.0), (0.0, 0.0));

    let layout = frozen();
    assert_eq!(layout.scroll_to(Item::new(0, 9), 100.0, 30.0), (100.0, 30.0));
}
