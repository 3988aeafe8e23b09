use chrono::NaiveDate;

use super::*;
use crate::draw::DrawList;
use crate::model::cell::{DrilldownItem, GraphKind, Link, TagOption};

fn roundtrip(registry: &CellRegistry, cell: &Cell) -> Cell {
    let text = registry.copy(cell);
    registry.paste(&text, cell).unwrap()
}

fn dropdown(value: Option<&str>, allow_creation: bool) -> Cell {
    Cell::new(CellData::Dropdown {
        value: value.map(String::from),
        allowed_values: vec!["low".into(), "high".into()],
        allow_creation,
    })
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// === Registry ===

#[test]
fn test_unknown_kind_fails_closed() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::Unknown("hologram".into()));

    assert!(!cell.is_selectable());
    assert_eq!(registry.copy(&cell), "");
    assert!(registry.begin_edit(&cell).is_none());
    assert_eq!(registry.sort_key(&cell), SortKey::Unsortable);
    assert_eq!(registry.measure(&cell, &Theme::light()), Measure::default());

    let mut list = DrawList::new();
    registry.draw(&mut list, &cell, Bounds::new(0.0, 0.0, 100.0, 20.0), &Theme::light(), HoverState::default());
    assert!(list.ops.is_empty());
}

#[test]
fn test_unregistered_kind_is_rejected() {
    let registry = CellRegistry::empty();
    let cell = Cell::text("x");
    assert_eq!(registry.paste("y", &cell), Err(EditError::Unregistered(KindTag::Text)));
    assert_eq!(registry.copy(&cell), "");
}

#[test]
fn test_every_known_kind_is_registered() {
    let registry = CellRegistry::new();
    for tag in KindTag::ALL.iter().copied().filter(|t| *t != KindTag::Unknown) {
        assert!(registry.get(tag).is_some(), "missing {}", tag);
    }
}

#[test]
fn test_read_only_cell_rejects_edits() {
    let registry = CellRegistry::new();
    let cell = Cell::text("locked").read_only();
    assert!(registry.begin_edit(&cell).is_none());
    assert_eq!(registry.paste("new", &cell), Err(EditError::ReadOnly));
    assert_eq!(
        registry.commit_edit(&cell, EditorValue::Text("new".into())),
        Err(EditError::ReadOnly)
    );
}

#[test]
fn test_display_data_draws_but_never_copies() {
    let registry = CellRegistry::new();
    let cell = Cell::number(1234.5).with_display("$1,234.50");
    assert_eq!(registry.copy(&cell), "1234.5");
    assert_eq!(registry.display_text(&cell), "$1,234.50");

    let mut list = DrawList::new();
    registry.draw(&mut list, &cell, Bounds::new(0.0, 0.0, 120.0, 30.0), &Theme::light(), HoverState::default());
    assert_eq!(list.texts().collect::<Vec<_>>(), vec!["$1,234.50"]);

    let pasted = roundtrip(&registry, &cell);
    assert_eq!(pasted.display_data, None);
    assert_eq!(pasted.data, cell.data);
}

#[test]
fn test_is_empty() {
    let registry = CellRegistry::new();
    assert!(registry.is_empty(&Cell::text("  ")));
    assert!(registry.is_empty(&Cell::new(CellData::Number(None))));
    assert!(!registry.is_empty(&Cell::number(0.0)));
    assert!(!registry.is_empty(&Cell::loading()));
}

#[test]
fn test_measure_grows_with_text() {
    let registry = CellRegistry::new();
    let theme = Theme::light();
    let short = registry.measure(&Cell::text("ab"), &theme);
    let long = registry.measure(&Cell::text("abcdefgh"), &theme);
    assert!(long.min_width > short.min_width);
    assert_eq!(short.min_width, 2.0 * theme.char_width + 2.0 * theme.cell_horizontal_padding);
}

// === Basic kinds ===

#[test]
fn test_basic_kinds_roundtrip() {
    let registry = CellRegistry::new();
    let cells = vec![
        Cell::text("hello\tworld"),
        Cell::number(-12.25),
        Cell::boolean(true),
        Cell::new(CellData::Boolean(None)),
        Cell::new(CellData::Markdown("# Title\n*body*".into())),
        Cell::new(CellData::Uri("https://example.com".into())),
        Cell::new(CellData::Image(vec!["a.png".into(), "b.png".into()])),
        Cell::new(CellData::Bubble(vec!["one".into(), "two".into()])),
        Cell::new(CellData::Drilldown(vec![DrilldownItem {
            text: "Berlin".into(),
            img: Some("flag.png".into()),
        }])),
    ];
    for cell in cells {
        assert_eq!(roundtrip(&registry, &cell), cell);
    }
}

#[test]
fn test_number_paste_accepts_formatted_values() {
    let registry = CellRegistry::new();
    let cell = Cell::number(0.0);
    let pasted = registry.paste("$1,234.50", &cell).unwrap();
    assert_eq!(pasted.data, CellData::Number(Some(1234.5)));
    let pasted = registry.paste("(12)", &cell).unwrap();
    assert_eq!(pasted.data, CellData::Number(Some(-12.0)));
    assert!(matches!(registry.paste("abc", &cell), Err(EditError::Parse(_))));
}

#[test]
fn test_boolean_activation_toggles_immediately() {
    let registry = CellRegistry::new();
    let cell = Cell::boolean(false);
    let handle = registry.begin_edit(&cell).unwrap();
    assert_eq!(handle.presentation, EditorPresentation::Immediate);
    let committed = registry.commit_edit(&cell, handle.value).unwrap();
    assert_eq!(committed.data, CellData::Boolean(Some(true)));
    assert!(registry.paste("maybe", &cell).is_err());
}

#[test]
fn test_protected_and_loading_cannot_be_written() {
    let registry = CellRegistry::new();
    for cell in [Cell::new(CellData::Protected), Cell::loading()] {
        assert_eq!(registry.copy(&cell), "");
        assert!(registry.paste("x", &cell).is_err());
        assert!(registry.begin_edit(&cell).is_none());
    }
}

#[test]
fn test_text_editor_seeding() {
    let registry = CellRegistry::new();
    let handle = registry.begin_edit(&Cell::text("old")).unwrap().seeded("n");
    assert_eq!(handle.value, EditorValue::Text("n".into()));

    let toggle = registry.begin_edit(&Cell::boolean(true)).unwrap();
    assert_eq!(toggle.clone().seeded("x"), toggle);
}

// === Extension kinds ===

#[test]
fn test_dropdown_rejects_values_outside_allowed() {
    let registry = CellRegistry::new();
    let cell = dropdown(Some("low"), false);
    assert_eq!(registry.copy(&cell), "low");
    assert_eq!(roundtrip(&registry, &cell), cell);
    assert_eq!(
        registry.paste("medium", &cell),
        Err(EditError::OutOfDomain("medium".into()))
    );
    let cleared = registry.paste("", &cell).unwrap();
    assert!(matches!(cleared.data, CellData::Dropdown { value: None, .. }));
}

#[test]
fn test_dropdown_creation_extends_allowed_values() {
    let registry = CellRegistry::new();
    let cell = dropdown(None, true);
    let pasted = registry.paste("medium", &cell).unwrap();
    match pasted.data {
        CellData::Dropdown { value, allowed_values, .. } => {
            assert_eq!(value.as_deref(), Some("medium"));
            assert!(allowed_values.contains(&"medium".to_string()));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_dropdown_editor_presentation() {
    let registry = CellRegistry::new();
    let handle = registry.begin_edit(&dropdown(Some("low"), false)).unwrap();
    assert_eq!(handle.presentation, EditorPresentation::Dropdown);

    let picked = CellData::Dropdown {
        value: Some("nope".into()),
        allowed_values: vec!["low".into(), "high".into()],
        allow_creation: false,
    };
    assert!(registry
        .commit_edit(&dropdown(Some("low"), false), EditorValue::Data(picked))
        .is_err());
}

#[test]
fn test_multi_select_all_or_nothing() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::MultiSelect {
        values: vec!["a".into(), "c".into()],
        options: vec!["a".into(), "b".into(), "c".into()],
        allow_creation: false,
    });
    assert_eq!(registry.copy(&cell), "a,c");
    assert_eq!(roundtrip(&registry, &cell), cell);
    assert!(registry.paste("a,z", &cell).is_err());
}

#[test]
fn test_tags_paste_is_best_effort() {
    let registry = CellRegistry::new();
    let option = |tag: &str| TagOption {
        tag: tag.into(),
        color: ThemeColor::rgb(1, 2, 3),
    };
    let cell = Cell::new(CellData::Tags {
        tags: vec!["urgent".into()],
        possible_tags: vec![option("urgent"), option("later")],
    });
    assert_eq!(roundtrip(&registry, &cell), cell);
    let pasted = registry.paste("later, bogus ,urgent", &cell).unwrap();
    assert!(matches!(&pasted.data, CellData::Tags { tags, .. } if tags == &vec!["later".to_string(), "urgent".to_string()]));
}

#[test]
fn test_star_rating_bounds() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::Star { rating: 3, max: 5 });
    assert_eq!(registry.copy(&cell), "3");
    assert_eq!(roundtrip(&registry, &cell), cell);
    assert_eq!(registry.paste("6", &cell), Err(EditError::OutOfDomain("6".into())));
    assert!(matches!(registry.paste("x", &cell), Err(EditError::Parse(_))));
    assert_eq!(registry.sort_key(&cell), SortKey::Number(3.0));
}

#[test]
fn test_date_picker_iso_dates() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::DatePicker {
        date: Some(date(2024, 2, 29)),
        min: Some(date(2024, 1, 1)),
        max: Some(date(2024, 12, 31)),
    });
    assert_eq!(registry.copy(&cell), "2024-02-29");
    assert_eq!(roundtrip(&registry, &cell), cell);

    let with_time = registry.paste("2024-03-01T10:30", &cell).unwrap();
    assert!(matches!(with_time.data, CellData::DatePicker { date: Some(d), .. } if d == date(2024, 3, 1)));

    assert!(matches!(registry.paste("2023-12-31", &cell), Err(EditError::OutOfDomain(_))));
    assert!(matches!(registry.paste("yesterday", &cell), Err(EditError::Parse(_))));
    assert_eq!(registry.sort_key(&cell), SortKey::Date(date(2024, 2, 29)));
}

#[test]
fn test_range_snaps_to_step() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::Range {
        value: 50.0,
        min: 0.0,
        max: 100.0,
        step: 5.0,
        label: None,
    });
    assert_eq!(roundtrip(&registry, &cell), cell);
    let snapped = registry.paste("42", &cell).unwrap();
    assert!(matches!(snapped.data, CellData::Range { value, .. } if value == 40.0));
    assert!(registry.paste("101", &cell).is_err());
}

#[test]
fn test_links_markdown_form() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::Links(vec![
        Link {
            title: "Docs".into(),
            href: "https://docs.rs".into(),
        },
        Link {
            title: "Crates".into(),
            href: "https://crates.io".into(),
        },
    ]));
    assert_eq!(registry.copy(&cell), "[Docs](https://docs.rs),[Crates](https://crates.io)");
    assert_eq!(roundtrip(&registry, &cell), cell);

    let bare = registry.paste("https://a.example, https://b.example", &cell).unwrap();
    match bare.data {
        CellData::Links(links) => {
            assert_eq!(links.len(), 2);
            assert_eq!(links[0].title, "https://a.example");
            assert_eq!(links[1].href, "https://b.example");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_sparkline_values() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::Sparkline {
        values: vec![1.0, 2.5, -3.0],
        y_axis: Some((-5.0, 5.0)),
        graph: GraphKind::Bar,
    });
    assert_eq!(registry.copy(&cell), "1,2.5,-3");
    assert_eq!(roundtrip(&registry, &cell), cell);
    assert!(registry.paste("1,two", &cell).is_err());
    assert!(registry.begin_edit(&cell).is_none());
    assert_eq!(registry.sort_key(&cell), SortKey::Number(0.5 / 3.0));
}

#[test]
fn test_tree_view_record_and_toggle() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::TreeView {
        text: "src".into(),
        depth: 1,
        can_open: true,
        is_open: false,
    });
    assert_eq!(registry.copy(&cell), "src|1|true|false");
    assert_eq!(roundtrip(&registry, &cell), cell);

    let renamed = registry.paste("lib", &cell).unwrap();
    assert!(matches!(&renamed.data, CellData::TreeView { text, depth: 1, .. } if text == "lib"));

    let handle = registry.begin_edit(&cell).unwrap();
    assert_eq!(handle.presentation, EditorPresentation::Immediate);
    let toggled = registry.commit_edit(&cell, handle.value).unwrap();
    assert!(matches!(toggled.data, CellData::TreeView { is_open: true, .. }));
}

#[test]
fn test_button_and_spinner_are_inert() {
    let registry = CellRegistry::new();
    let button = Cell::new(CellData::Button { title: "Run".into() });
    let spinner = Cell::new(CellData::Spinner);

    assert_eq!(registry.copy(&button), "Run");
    assert_eq!(registry.copy(&spinner), "");
    assert!(registry.paste("Go", &button).is_err());
    assert!(registry.paste("x", &spinner).is_err());
    assert_eq!(registry.sort_key(&button), SortKey::Unsortable);
    assert_eq!(registry.sort_key(&spinner), SortKey::Unsortable);
}

#[test]
fn test_user_profile_initial_follows_name() {
    let registry = CellRegistry::new();
    let cell = Cell::new(CellData::UserProfile {
        name: "Ada".into(),
        initial: "A".into(),
        tint: ThemeColor::rgb(10, 20, 30),
        image: None,
    });
    assert_eq!(roundtrip(&registry, &cell), cell);
    let renamed = registry.paste("grace", &cell).unwrap();
    assert!(matches!(&renamed.data, CellData::UserProfile { initial, .. } if initial == "G"));
}

#[test]
fn test_parse_numeric_formats() {
    assert_eq!(parse_numeric("15%"), Some(0.15));
    assert_eq!(parse_numeric("-€2,000"), Some(-2000.0));
    assert_eq!(parse_numeric("1e3"), Some(1000.0));
    assert_eq!(parse_numeric(""), None);
    assert_eq!(parse_numeric("twelve"), None);
}

#[test]
fn test_split_list_trims_and_drops_blanks() {
    assert_eq!(split_list(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
    assert!(split_list("").is_empty());
}
