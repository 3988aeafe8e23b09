//! Context menus and the actions behind them.
//!
//! A menu is static configuration: an ordered list of items and dividers, each item
//! enabled or not. Running an item resolves to a built-in grid operation, a pure
//! function over the clicked cell, or a request handed back to the host.

use std::fmt;
use std::sync::Arc;

use crate::model::cell::Cell;
use crate::model::Item;
use crate::selection::SelectionState;

/// Grid operations a menu item can run directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinAction {
    Copy,
    Cut,
    Paste,
    /// Clear the selected cells
    Clear,
    SortAscending,
    SortDescending,
    ClearSort,
}

/// Input to a custom action. `col`/`row` are logical indices.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub col: usize,
    pub row: usize,
    pub cell: Cell,
    pub selection: SelectionState,
}

/// Cell replacements produced by a custom action, committed as one undo entry.
/// Addresses are logical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub edits: Vec<(Item, Cell)>,
}

impl ActionOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(mut self, item: Item, cell: Cell) -> Self {
        self.edits.push((item, cell));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

pub type ActionFn = Arc<dyn Fn(&ActionContext) -> ActionOutcome + Send + Sync>;

#[derive(Clone)]
pub enum MenuAction {
    Builtin(BuiltinAction),
    Custom(ActionFn),
    /// Host-owned operation, reported as a `HostAction` event with this name
    Host(String),
}

impl MenuAction {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ActionContext) -> ActionOutcome + Send + Sync + 'static,
    {
        MenuAction::Custom(Arc::new(f))
    }
}

impl fmt::Debug for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuAction::Builtin(action) => f.debug_tuple("Builtin").field(action).finish(),
            MenuAction::Custom(_) => f.write_str("Custom(..)"),
            MenuAction::Host(name) => f.debug_tuple("Host").field(name).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub action: MenuAction,
}

#[derive(Debug, Clone)]
pub enum MenuEntry {
    Item(MenuItem),
    Divider,
}

#[derive(Debug, Clone, Default)]
pub struct Menu {
    entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, id: impl Into<String>, label: impl Into<String>, action: MenuAction) -> Self {
        self.entries.push(MenuEntry::Item(MenuItem {
            id: id.into(),
            label: label.into(),
            enabled: true,
            action,
        }));
        self
    }

    pub fn disabled(mut self, id: impl Into<String>, label: impl Into<String>, action: MenuAction) -> Self {
        self.entries.push(MenuEntry::Item(MenuItem {
            id: id.into(),
            label: label.into(),
            enabled: false,
            action,
        }));
        self
    }

    pub fn divider(mut self) -> Self {
        self.entries.push(MenuEntry::Divider);
        self
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.entries.iter().filter_map(|e| match e {
            MenuEntry::Item(item) => Some(item),
            MenuEntry::Divider => None,
        })
    }

    /// The action behind `id`, if the item exists and is enabled.
    pub fn resolve(&self, id: &str) -> Option<&MenuAction> {
        self.items().find(|i| i.id == id && i.enabled).map(|i| &i.action)
    }

    /// Copy, cut, paste and clear
    pub fn default_cell_menu() -> Self {
        Menu::new()
            .item("copy", "Copy", MenuAction::Builtin(BuiltinAction::Copy))
            .item("cut", "Cut", MenuAction::Builtin(BuiltinAction::Cut))
            .item("paste", "Paste", MenuAction::Builtin(BuiltinAction::Paste))
            .divider()
            .item("clear", "Clear", MenuAction::Builtin(BuiltinAction::Clear))
    }

    pub fn default_header_menu() -> Self {
        Menu::new()
            .item("sort-asc", "Sort ascending", MenuAction::Builtin(BuiltinAction::SortAscending))
            .item("sort-desc", "Sort descending", MenuAction::Builtin(BuiltinAction::SortDescending))
            .item("sort-clear", "Clear sort", MenuAction::Builtin(BuiltinAction::ClearSort))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_skips_disabled_and_dividers() {
        let menu = Menu::new()
            .item("copy", "Copy", MenuAction::Builtin(BuiltinAction::Copy))
            .divider()
            .disabled("delete-row", "Delete row", MenuAction::Host("delete-row".into()));

        assert_eq!(menu.entries().len(), 3);
        assert_eq!(menu.items().count(), 2);
        assert!(matches!(menu.resolve("copy"), Some(MenuAction::Builtin(BuiltinAction::Copy))));
        assert!(menu.resolve("delete-row").is_none());
        assert!(menu.resolve("missing").is_none());
    }

    #[test]
    fn test_custom_action_is_pure_over_context() {
        let upper = MenuAction::custom(|ctx: &ActionContext| {
            let text = match &ctx.cell.data {
                crate::model::cell::CellData::Text(s) => s.to_uppercase(),
                _ => return ActionOutcome::none(),
            };
            ActionOutcome::none().set(Item::new(ctx.col, ctx.row), Cell::text(text))
        });
        let ctx = ActionContext {
            col: 2,
            row: 7,
            cell: Cell::text("abc"),
            selection: SelectionState::default(),
        };
        let MenuAction::Custom(f) = upper else {
            panic!("expected a custom action");
        };
        assert_eq!(f(&ctx).edits, vec![(Item::new(2, 7), Cell::text("ABC"))]);
    }
}
