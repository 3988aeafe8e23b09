//! A headless engine for interactive, virtualized data grids.
//!
//! The host supplies a [`GridData`] snapshot, a [`DrawContext`] to paint on and raw
//! keyboard/pointer input. The engine owns the viewport, selection, editing, undo,
//! clipboard, sort/filter and repaint scheduling, and reports back through
//! [`GridEvent`]s drained with [`DataGrid::take_events`].

pub mod actions;
pub mod clipboard;
pub mod config;
pub mod draw;
pub mod edit;
pub mod error;
pub mod events;
pub mod grid;
pub mod kinds;
pub mod model;
pub mod render;
pub mod selection;
pub mod view;
pub mod viewport;

pub use actions::{ActionContext, ActionOutcome, BuiltinAction, Menu, MenuAction};
pub use config::keys::{KeyCode, KeyPress, Modifiers, Shortcut};
pub use config::GridOptions;
pub use draw::{DrawContext, DrawList, Theme};
pub use error::{GridError, Result};
pub use events::GridEvent;
pub use grid::{DataGrid, KeyResult, MenuTarget, MouseButton, PointerInput};
pub use kinds::CellRegistry;
pub use model::cell::{Cell, CellData, KindTag};
pub use model::column::Column;
pub use model::data::GridData;
pub use model::{Bounds, Item, Rect};
pub use render::{GridHandle, Redraw};
pub use selection::SelectionState;
pub use view::sort::{SortColumn, SortDirection};
