use std::io::Write;

use super::keys::{KeyCode, KeyPress, Modifiers, Shortcut, ShortcutTable};
use super::*;

#[test]
fn test_defaults() {
    let options = GridOptions::default();
    assert_eq!(options.cell_activation_behavior, ActivationBehavior::SecondClick);
    assert!(options.edit_on_type);
    assert_eq!(options.max_undo_steps, 50);
    assert_eq!(options.max_auto_width(), options.max_column_width);
    assert!(options.validate(3).is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let options = GridOptions::from_toml_str(
        r#"
        row_markers = "clickable-number"
        range_select = "freeform"
        freeze_columns = 1
        flash_triggers = ["edit", "undo"]
        hidden_rows = [2, 4]
        allowed_fill_directions = "any"

        [blending]
        row = "mixed"

        [column_filters]
        status = ["open", "closed"]

        [keybindings]
        fill-down = false

        [[highlight_regions]]
        range = { x = 1, y = 2, width = 3, height = 4 }
        color = [255, 0, 0]
        style = "solid-outline"
        "#,
    )
    .unwrap();

    assert_eq!(options.row_markers, RowMarkers::ClickableNumber);
    assert_eq!(options.range_select, RangeSelect::Freeform);
    assert_eq!(options.freeze_columns, 1);
    assert!(options.flashes_on(FlashTrigger::Edit));
    assert!(!options.flashes_on(FlashTrigger::Paste));
    assert!(options.hidden_rows.contains(&4));
    assert_eq!(options.blending.row, crate::selection::Blend::Mixed);
    assert_eq!(options.blending.range, crate::selection::Blend::Exclusive);
    assert_eq!(options.column_filters["status"], vec!["open", "closed"]);
    assert!(!options.keybindings.enabled(Shortcut::FillDown));
    assert!(options.keybindings.enabled(Shortcut::FillRight));
    assert_eq!(options.highlight_regions[0].range, Rect::new(1, 2, 3, 4));
    assert_eq!(options.highlight_regions[0].style, HighlightStyle::SolidOutline);
    assert_eq!(options.row_height, 34.0);
}

#[test]
fn test_bad_toml_is_config_error() {
    let err = GridOptions::from_toml_str("range_select = \"sideways\"").unwrap_err();
    assert!(matches!(err, GridError::Config(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_undo_steps = 3\ntheme = \"dark\"").unwrap();
    let options = GridOptions::from_file(file.path()).unwrap();
    assert_eq!(options.max_undo_steps, 3);
    assert_eq!(options.resolve_theme().name, "dark");

    let missing = GridOptions::from_file(Path::new("/definitely/not/here.toml"));
    assert!(matches!(missing, Err(GridError::Io { .. })));
}

#[test]
fn test_validate_contradictions() {
    let options = GridOptions::default();
    assert!(matches!(options.validate(0), Err(GridError::NoColumns)));

    let frozen = GridOptions {
        freeze_columns: 4,
        ..GridOptions::default()
    };
    assert!(matches!(
        frozen.validate(3),
        Err(GridError::FrozenColumns { frozen: 4, columns: 3 })
    ));

    let widths = GridOptions {
        min_column_width: 300.0,
        max_column_width: 100.0,
        ..GridOptions::default()
    };
    assert!(matches!(widths.validate(3), Err(GridError::ColumnWidthBounds { .. })));
}

#[test]
fn test_unknown_theme_falls_back() {
    let options = GridOptions {
        theme: "neon".into(),
        ..GridOptions::default()
    };
    assert_eq!(options.resolve_theme(), Theme::light());
}

#[test]
fn test_fill_directions() {
    assert!(FillDirections::Vertical.allows_vertical());
    assert!(!FillDirections::Vertical.allows_horizontal());
    assert!(FillDirections::Orthogonal.allows_horizontal());
    assert!(!FillDirections::Horizontal.allows_vertical());
}

#[test]
fn test_shortcut_table_respects_bindings() {
    let table = ShortcutTable::default();
    let ctrl_d = KeyPress::new(KeyCode::Char('d'), Modifiers::CTRL);
    let mut bindings = Keybindings::default();
    assert_eq!(table.resolve(ctrl_d, &bindings), Some(Shortcut::FillDown));

    bindings.set(Shortcut::FillDown, false);
    assert_eq!(table.resolve(ctrl_d, &bindings), None);
    assert_eq!(table.get(KeyPress::plain(KeyCode::F(2))), Some(Shortcut::Activate));
}

#[test]
fn test_printable_keys() {
    assert_eq!(KeyPress::plain(KeyCode::Char('q')).printable(), Some('q'));
    assert_eq!(KeyPress::new(KeyCode::Char('Q'), Modifiers::SHIFT).printable(), Some('Q'));
    assert_eq!(KeyPress::new(KeyCode::Char('q'), Modifiers::CTRL).printable(), None);
    assert_eq!(KeyPress::plain(KeyCode::Enter).printable(), None);
}
