//! Grid options.
//!
//! Every option has a default, so a host (or a TOML file) only names what it changes.

pub mod keys;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::draw::{Theme, ThemeColor};
use crate::error::{GridError, Result};
use crate::model::Rect;
use crate::selection::model::SelectionOptions;
use crate::selection::{Blending, RangeSelect, SelectCount, SelectionMode};
use keys::Keybindings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowMarkers {
    #[default]
    None,
    Number,
    Checkbox,
    Both,
    /// Row number that selects the row when clicked
    ClickableNumber,
}

impl RowMarkers {
    pub fn is_visible(&self) -> bool {
        *self != RowMarkers::None
    }
}

/// What opens a cell editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivationBehavior {
    SingleClick,
    /// A click on the cell that already has focus
    #[default]
    SecondClick,
    DoubleClick,
}

/// What happens to an open editor when the grid scrolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorScrollBehavior {
    #[default]
    KeepOpen,
    CloseDropdownOnly,
    CloseOverlay,
    /// Scrolling is ignored while an editor is open
    LockScroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlashTrigger {
    Edit,
    Paste,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FillDirections {
    Horizontal,
    Vertical,
    #[default]
    Orthogonal,
    Any,
}

impl FillDirections {
    pub fn allows_vertical(&self) -> bool {
        *self != FillDirections::Horizontal
    }

    pub fn allows_horizontal(&self) -> bool {
        *self != FillDirections::Vertical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightStyle {
    #[default]
    Dashed,
    Solid,
    SolidOutline,
    NoOutline,
}

/// A host-defined overlay on a rectangle of display cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRegion {
    pub range: Rect,
    pub color: ThemeColor,
    #[serde(default)]
    pub style: HighlightStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    pub row_markers: RowMarkers,
    pub row_marker_start_index: usize,
    pub row_marker_width: f32,
    pub row_height: f32,
    pub header_height: f32,
    /// Defaults to `header_height` when any column has a group
    pub group_header_height: Option<f32>,
    pub freeze_columns: usize,
    pub freeze_trailing_rows: usize,
    pub fixed_shadow_x: bool,
    pub fixed_shadow_y: bool,
    pub min_column_width: f32,
    pub max_column_width: f32,
    /// Cap for auto-measured widths; defaults to `max_column_width`
    pub max_column_auto_width: Option<f32>,
    pub range_select: RangeSelect,
    pub row_select: SelectCount,
    pub column_select: SelectCount,
    pub row_selection_mode: SelectionMode,
    pub column_selection_mode: SelectionMode,
    pub row_select_on_cell_click: bool,
    pub range_selection_column_spanning: bool,
    pub blending: Blending,
    pub cell_activation_behavior: ActivationBehavior,
    pub edit_on_type: bool,
    pub editor_scroll_behavior: EditorScrollBehavior,
    pub max_undo_steps: usize,
    pub flash_triggers: BTreeSet<FlashTrigger>,
    pub flash_duration_ms: u64,
    pub sortable: bool,
    /// Column id -> allowed raw values
    pub column_filters: BTreeMap<String, Vec<String>>,
    /// Logical row indices
    pub hidden_rows: BTreeSet<usize>,
    pub highlight_regions: Vec<HighlightRegion>,
    pub enable_copy: bool,
    pub enable_paste: bool,
    pub fill_handle: bool,
    pub allowed_fill_directions: FillDirections,
    pub keybindings: Keybindings,
    pub theme: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_markers: RowMarkers::None,
            row_marker_start_index: 1,
            row_marker_width: 44.0,
            row_height: 34.0,
            header_height: 36.0,
            group_header_height: None,
            freeze_columns: 0,
            freeze_trailing_rows: 0,
            fixed_shadow_x: true,
            fixed_shadow_y: true,
            min_column_width: 50.0,
            max_column_width: 500.0,
            max_column_auto_width: None,
            range_select: RangeSelect::Rect,
            row_select: SelectCount::Multi,
            column_select: SelectCount::Multi,
            row_selection_mode: SelectionMode::Auto,
            column_selection_mode: SelectionMode::Auto,
            row_select_on_cell_click: false,
            range_selection_column_spanning: true,
            blending: Blending::default(),
            cell_activation_behavior: ActivationBehavior::SecondClick,
            edit_on_type: true,
            editor_scroll_behavior: EditorScrollBehavior::KeepOpen,
            max_undo_steps: 50,
            flash_triggers: BTreeSet::new(),
            flash_duration_ms: 500,
            sortable: true,
            column_filters: BTreeMap::new(),
            hidden_rows: BTreeSet::new(),
            highlight_regions: Vec::new(),
            enable_copy: true,
            enable_paste: true,
            fill_handle: false,
            allowed_fill_directions: FillDirections::Orthogonal,
            keybindings: Keybindings::default(),
            theme: "light".to_string(),
        }
    }
}

impl GridOptions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GridError::Config(e.to_string()))
    }

    /// Load options from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        toml::from_str(&content).map_err(|e| GridError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Reject contradictions that cannot render correctly.
    pub fn validate(&self, column_count: usize) -> Result<()> {
        if column_count == 0 {
            return Err(GridError::NoColumns);
        }
        if self.freeze_columns > column_count {
            return Err(GridError::FrozenColumns {
                frozen: self.freeze_columns,
                columns: column_count,
            });
        }
        if self.min_column_width <= 0.0 || self.min_column_width > self.max_column_width {
            return Err(GridError::ColumnWidthBounds {
                min: self.min_column_width,
                max: self.max_column_width,
            });
        }
        if self.row_height <= 0.0 || self.header_height < 0.0 {
            return Err(GridError::Config(format!(
                "row height {} and header height {} must be positive",
                self.row_height, self.header_height
            )));
        }
        Ok(())
    }

    pub fn max_auto_width(&self) -> f32 {
        self.max_column_auto_width
            .unwrap_or(self.max_column_width)
            .clamp(self.min_column_width, self.max_column_width)
    }

    /// The named built-in theme, falling back to light.
    pub fn resolve_theme(&self) -> Theme {
        Theme::by_name(&self.theme).unwrap_or_else(|| {
            warn!(theme = %self.theme, "unknown theme, using light");
            Theme::light()
        })
    }

    pub fn selection(&self) -> SelectionOptions {
        SelectionOptions {
            range_select: self.range_select,
            row_select: self.row_select,
            column_select: self.column_select,
            row_selection_mode: self.row_selection_mode,
            column_selection_mode: self.column_selection_mode,
            row_select_on_cell_click: self.row_select_on_cell_click,
            range_selection_column_spanning: self.range_selection_column_spanning,
            blending: self.blending,
        }
    }

    pub fn flashes_on(&self, trigger: FlashTrigger) -> bool {
        self.flash_triggers.contains(&trigger)
    }
}

#[cfg(test)]
mod test;
