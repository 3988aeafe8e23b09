//! The grid engine.
//!
//! [`DataGrid`] ties the pieces together: input goes to the selection model, edits go
//! through the undo pipeline, the sort/filter engine derives the display order, the
//! viewport maps it onto the screen and the render scheduler decides what to repaint.
//! Everything the host needs to know comes back as [`GridEvent`]s.

pub mod input;
pub mod ops;
pub mod paint;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::actions::Menu;
use crate::config::keys::ShortcutTable;
use crate::config::GridOptions;
use crate::draw::Theme;
use crate::edit::editor::Editor;
use crate::edit::{Coercer, History, Validator};
use crate::error::{GridError, Result};
use crate::events::GridEvent;
use crate::kinds::CellRegistry;
use crate::model::cell::Cell;
use crate::model::data::GridData;
use crate::model::{Item, Rect};
use crate::render::{GridHandle, RenderScheduler};
use crate::selection::{SelectionModel, SelectionState, SelectionTarget};
use crate::view::sort::SortSpec;
use crate::view::{ColumnOrder, DisplayOrder, FilterSpec};
use crate::viewport::widths::{ColumnWidths, WidthBounds};
use crate::viewport::{visible_region, Layout, RowHeights, VisibleRegion};

pub use input::{KeyResult, MouseButton, PointerInput};
pub use ops::MenuTarget;

/// Row height by logical row. Returning 0 hides the row.
pub type RowHeightFn = Box<dyn Fn(usize) -> f32>;

/// The grid as the selection model sees it: display coordinates over the current
/// column and row order.
pub(crate) struct GridTarget<'a> {
    data: &'a GridData,
    order: &'a DisplayOrder,
    columns: &'a ColumnOrder,
}

impl GridTarget<'_> {
    fn logical(&self, item: Item) -> Option<Item> {
        Some(Item::new(self.columns.logical(item.col)?, self.order.logical(item.row)?))
    }
}

impl SelectionTarget for GridTarget<'_> {
    fn col_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self) -> usize {
        self.order.len()
    }

    fn logical_row(&self, display_row: usize) -> Option<usize> {
        self.order.logical(display_row)
    }

    fn is_selectable(&self, item: Item) -> bool {
        self.logical(item)
            .and_then(|l| self.data.get_cell(l.col, l.row))
            .map_or(false, Cell::is_selectable)
    }

    /// Merged cells are only honoured while their columns stay adjacent in display order.
    fn span(&self, item: Item) -> Option<(usize, usize)> {
        let logical = self.logical(item)?;
        let (start, end) = self.data.effective_span(logical.col, logical.row)?;
        let first = self.columns.display(start)?;
        (start..=end)
            .all(|c| self.columns.display(c) == Some(first + c - start))
            .then_some((first, first + end - start))
    }
}

/// Borrow the fields a [`GridTarget`] needs, leaving the rest of the grid free.
macro_rules! target {
    ($grid:expr) => {
        $crate::grid::GridTarget {
            data: &$grid.data,
            order: &$grid.order,
            columns: &$grid.columns,
        }
    };
}
pub(crate) use target;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Cells,
    FillHandle { source: Rect, target: Option<Rect> },
    ColumnResize { col: usize, start_x: f32, start_width: f32 },
    ColumnMove { from: usize },
    RowMove { from: usize },
}

pub struct DataGrid {
    options: GridOptions,
    data: GridData,
    registry: CellRegistry,
    theme: Theme,

    sort: SortSpec,
    filter: FilterSpec,
    hidden: BTreeSet<usize>,
    order: DisplayOrder,
    columns: ColumnOrder,

    widths: ColumnWidths,
    row_height: Option<RowHeightFn>,
    layout: Layout,
    size: (f32, f32),
    region: VisibleRegion,

    selection: SelectionModel,
    editor: Editor,
    history: History,
    coercer: Option<Box<dyn Coercer>>,
    validator: Option<Box<dyn Validator>>,

    scheduler: Rc<RefCell<RenderScheduler>>,
    shortcuts: ShortcutTable,
    cell_menu: Menu,
    header_menu: Menu,

    events: Vec<GridEvent>,
    history_state: (bool, bool),
    hover: Option<GridEvent>,
    pointer_at: Option<(f32, f32)>,
    drag: Option<Drag>,
    /// Display cells in reading order
    search_matches: Vec<Item>,
    search_index: usize,
}

impl DataGrid {
    /// Build a grid over `data`. Configuration contradictions fail here; malformed spans
    /// are logged and rendered unspanned.
    pub fn new(options: GridOptions, data: GridData) -> Result<(Self, GridHandle)> {
        options.validate(data.col_count())?;
        let violations = data.span_violations();
        if !violations.is_empty() {
            debug!(first = ?violations[0], "ignoring malformed spans");
        }

        let filter = filter_from_options(&options, &data);
        let hidden = options.hidden_rows.clone();
        let registry = CellRegistry::new();
        let order = DisplayOrder::compute(&data, &registry, &[], &filter, &hidden);
        let columns = ColumnOrder::identity(data.col_count());
        let scheduler = Rc::new(RefCell::new(RenderScheduler::new()));

        let mut grid = Self {
            theme: options.resolve_theme(),
            selection: SelectionModel::new(options.selection()),
            history: History::new(options.max_undo_steps),
            widths: ColumnWidths::new(data.col_count()),
            layout: Layout::new(&[], RowHeights::uniform(options.row_height, 0), 0.0, 0.0),
            options,
            data,
            registry,
            sort: SortSpec::new(),
            filter,
            hidden,
            order,
            columns,
            row_height: None,
            size: (0.0, 0.0),
            region: VisibleRegion::default(),
            editor: Editor::default(),
            coercer: None,
            validator: None,
            scheduler: scheduler.clone(),
            shortcuts: ShortcutTable::default(),
            cell_menu: Menu::default_cell_menu(),
            header_menu: Menu::default_header_menu(),
            events: Vec::new(),
            history_state: (false, false),
            hover: None,
            pointer_at: None,
            drag: None,
            search_matches: Vec::new(),
            search_index: 0,
        };
        grid.rebuild_layout();
        info!(
            columns = grid.data.col_count(),
            rows = grid.data.row_count(),
            visible_rows = grid.order.len(),
            "grid created"
        );
        Ok((grid, GridHandle::new(scheduler)))
    }

    /// Replace the cell registry, e.g. to register additional kinds.
    pub fn with_registry(mut self, registry: CellRegistry) -> Self {
        self.registry = registry;
        self.widths.remeasure(None);
        self.refresh_order();
        self
    }

    pub fn set_coercer(&mut self, coercer: Option<Box<dyn Coercer>>) {
        self.coercer = coercer;
    }

    pub fn set_validator(&mut self, validator: Option<Box<dyn Validator>>) {
        self.validator = validator;
    }

    /// Per-row heights by logical row; `None` restores the uniform `row_height`.
    pub fn set_row_height_resolver(&mut self, resolver: Option<RowHeightFn>) {
        self.row_height = resolver;
        self.rebuild_layout();
    }

    pub fn set_menus(&mut self, cell_menu: Menu, header_menu: Menu) {
        self.cell_menu = cell_menu;
        self.header_menu = header_menu;
    }

    pub fn set_shortcuts(&mut self, shortcuts: ShortcutTable) {
        self.shortcuts = shortcuts;
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Apply new options. Filters and hidden rows named by the options replace the
    /// current ones.
    pub fn set_options(&mut self, options: GridOptions) -> Result<()> {
        options.validate(self.data.col_count())?;
        self.theme = options.resolve_theme();
        self.selection.set_options(options.selection());
        self.history.set_max_steps(options.max_undo_steps);
        self.filter = filter_from_options(&options, &self.data);
        self.hidden = options.hidden_rows.clone();
        self.options = options;
        self.emit_history_state();
        self.refresh_order();
        Ok(())
    }

    pub fn data(&self) -> &GridData {
        &self.data
    }

    /// Take a new snapshot from the host.
    ///
    /// Undo history survives when the shape is unchanged; a different shape resets it
    /// along with column order and widths.
    pub fn set_data(&mut self, data: GridData) -> Result<()> {
        if data.col_count() == 0 {
            return Err(GridError::NoColumns);
        }
        let violations = data.span_violations();
        if !violations.is_empty() {
            debug!(first = ?violations[0], "ignoring malformed spans");
        }
        let reshaped = data.col_count() != self.data.col_count() || data.row_count() != self.data.row_count();
        self.data = data;
        if reshaped {
            debug!(columns = self.data.col_count(), rows = self.data.row_count(), "data reshaped, resetting history");
            self.history.clear();
            self.editor.close();
            self.columns = ColumnOrder::identity(self.data.col_count());
            self.widths = ColumnWidths::new(self.data.col_count());
            self.emit_history_state();
        }
        self.refresh_order();
        Ok(())
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the theme. Auto-sized columns are measured again with its metrics.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.widths.remeasure(None);
        self.rebuild_layout();
        self.scheduler.borrow_mut().redraw_all();
    }

    pub fn display_order(&self) -> &DisplayOrder {
        &self.order
    }

    pub fn column_order(&self) -> &ColumnOrder {
        &self.columns
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn visible_region(&self) -> VisibleRegion {
        self.region
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    /// Host-driven selection
    pub fn set_selection(&mut self, state: SelectionState) {
        let before = self.selection.state().clone();
        self.selection.set_state(state);
        self.selection.clamp(&target!(self));
        self.selection_changed(&before);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Drain the events raised since the last call
    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Logical address of a display cell
    pub fn logical_item(&self, item: Item) -> Option<Item> {
        target!(self).logical(item)
    }

    /// Display address of a logical cell, if it is currently shown
    pub fn display_item(&self, logical: Item) -> Option<Item> {
        Some(Item::new(self.columns.display(logical.col)?, self.order.display(logical.row)?))
    }

    /// Inclusive display-column span of the merged cell at `item`
    pub fn display_span(&self, item: Item) -> Option<(usize, usize)> {
        target!(self).span(item)
    }

    /// Cell at a display address
    pub fn cell_at(&self, item: Item) -> Option<&Cell> {
        let logical = self.logical_item(item)?;
        self.data.get_cell(logical.col, logical.row)
    }

    fn emit(&mut self, event: GridEvent) {
        self.events.push(event);
    }

    fn emit_history_state(&mut self) {
        let state = (self.history.can_undo(), self.history.can_redo());
        if state.0 != self.history_state.0 {
            self.emit(GridEvent::CanUndo(state.0));
        }
        if state.1 != self.history_state.1 {
            self.emit(GridEvent::CanRedo(state.1));
        }
        self.history_state = state;
    }

    /// Report what changed between `before` and the current selection.
    fn selection_changed(&mut self, before: &SelectionState) {
        let after = self.selection.state().clone();
        if &after == before {
            return;
        }
        if after.current != before.current {
            self.emit(GridEvent::SelectedCell { item: after.current });
        }
        if after.rows != before.rows {
            self.emit(GridEvent::SelectedRows { rows: after.rows.clone() });
        }
        if after.primary_range() != before.primary_range() || after.cells != before.cells {
            self.emit(GridEvent::SelectedRange {
                range: after.primary_range(),
            });
        }
        if after.columns != before.columns {
            let columns = after.columns.iter().filter_map(|c| self.columns.logical(*c)).collect();
            self.emit(GridEvent::SelectedColumns { columns });
        }
        self.scheduler.borrow_mut().redraw_all();
    }

    fn width_bounds(&self) -> WidthBounds {
        WidthBounds {
            min: self.options.min_column_width,
            max: self.options.max_column_width,
            max_auto: self.options.max_auto_width(),
        }
    }

    /// Recompute the display order after sort, filter, hidden rows or data changed.
    /// The focused cell follows its logical row; display-addressed ranges are dropped.
    fn refresh_order(&mut self) {
        let before = self.selection.state().clone();
        let focus = before.current.and_then(|c| self.logical_item(c));

        self.order = DisplayOrder::compute(&self.data, &self.registry, &self.sort, &self.filter, &self.hidden);
        self.search_matches.clear();
        self.search_index = 0;

        let current = focus.and_then(|l| self.display_item(l));
        self.selection.display_order_changed(current);
        self.selection.clamp(&target!(self));
        self.rebuild_layout();
        self.selection_changed(&before);
        self.scheduler.borrow_mut().redraw_all();
    }

    /// Rebuild geometry from widths, row heights and the viewport size, then re-derive
    /// the visible region.
    fn rebuild_layout(&mut self) {
        let bounds = self.width_bounds();
        self.widths.resolve(&self.data, &self.registry, &self.theme, bounds);
        let widths = self.widths.display_widths(&self.columns);

        let rows = match &self.row_height {
            Some(resolver) => RowHeights::variable(self.order.rows().iter().map(|&row| resolver(row))),
            None => RowHeights::uniform(self.options.row_height, self.order.len()),
        };
        let has_groups = self.data.columns().iter().any(|c| c.group.is_some());
        let group_height = if has_groups {
            self.options.group_header_height.unwrap_or(self.options.header_height)
        } else {
            0.0
        };
        let marker_width = if self.options.row_markers.is_visible() {
            self.options.row_marker_width
        } else {
            0.0
        };

        if self.options.freeze_columns > widths.len() {
            warn!(frozen = self.options.freeze_columns, columns = widths.len(), "clamping frozen columns");
        }
        self.layout = Layout::new(&widths, rows, self.size.0, self.size.1)
            .with_frozen(self.options.freeze_columns, self.options.freeze_trailing_rows)
            .with_headers(self.options.header_height, group_height)
            .with_row_markers(marker_width);
        self.update_region(self.region.tx, self.region.ty);
    }

    /// Move the scroll offset (clamped) and report the visible region when it changes.
    fn update_region(&mut self, tx: f32, ty: f32) {
        let region = visible_region(&self.layout, tx, ty);
        let visible_cells = (region.width + self.layout.frozen_columns) * (region.height + self.layout.frozen_trailing_rows);
        self.scheduler.borrow_mut().set_visible_cells(visible_cells);
        if region != self.region {
            self.region = region;
            self.emit(GridEvent::VisibleRegion(region));
            self.scheduler.borrow_mut().redraw_all();
        }
    }
}

/// Column filters are configured by column id.
fn filter_from_options(options: &GridOptions, data: &GridData) -> FilterSpec {
    let mut filter = FilterSpec::new();
    for (id, values) in &options.column_filters {
        match data.columns().iter().position(|c| &c.id == id) {
            Some(col) if data.columns()[col].filterable => filter.allow(col, values.iter().cloned()),
            Some(_) => warn!(column = %id, "column is not filterable, ignoring filter"),
            None => warn!(column = %id, "filter names an unknown column"),
        }
    }
    filter
}
