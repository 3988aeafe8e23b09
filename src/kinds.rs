//! Cell type registry.
//!
//! Every cell kind implements [`CellKind`]. The [`CellRegistry`] maps a [`KindTag`] to its
//! implementation and is the only place the engine dispatches on kind. Lookups for tags
//! with no registered implementation fail closed: nothing is drawn, nothing is copied and
//! the cell cannot be edited.

pub mod basic;
pub mod extension;

use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use crate::draw::{DrawContext, HoverState, TextAlign, Theme, ThemeColor};
use crate::model::cell::{Cell, CellData, KindTag};
use crate::model::Bounds;
use crate::view::sort::SortKey;

/// Result of measuring a cell
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measure {
    pub min_width: f32,
}

/// How an editor is presented once a cell is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPresentation {
    /// A floating editor over the cell
    Overlay,
    /// A dropdown list (closed by `close-dropdown-only` scroll behavior)
    Dropdown,
    /// No editor: the value is committed as soon as the cell is activated (toggles)
    Immediate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorValue {
    Text(String),
    Data(CellData),
}

/// State of an open editor. `value` is what gets handed to `commit_edit`.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorHandle {
    pub kind: KindTag,
    pub value: EditorValue,
    pub presentation: EditorPresentation,
}

impl EditorHandle {
    pub fn text(kind: KindTag, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: EditorValue::Text(value.into()),
            presentation: EditorPresentation::Overlay,
        }
    }

    pub fn data(kind: KindTag, data: CellData, presentation: EditorPresentation) -> Self {
        Self {
            kind,
            value: EditorValue::Data(data),
            presentation,
        }
    }

    /// Replace a text editor's content with `seed`. Data editors keep their value.
    pub fn seeded(mut self, seed: &str) -> Self {
        if let EditorValue::Text(_) = self.value {
            self.value = EditorValue::Text(seed.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("cannot parse '{0}'")]
    Parse(String),
    #[error("'{0}' is outside the allowed values")]
    OutOfDomain(String),
    #[error("cell is read-only")]
    ReadOnly,
    #[error("value does not belong to a {0} cell")]
    WrongKind(KindTag),
    #[error("no handler registered for kind {0}")]
    Unregistered(KindTag),
}

/// Behavior of one cell kind.
pub trait CellKind: Send + Sync {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure;

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState);

    /// `None` means the cell cannot be edited in place.
    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle>;

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError>;

    /// Clipboard text for the cell's raw data
    fn copy(&self, cell: &Cell) -> String;

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError>;

    /// Ordering key; kinds without a meaningful order return `SortKey::Unsortable`.
    fn sort_key(&self, _cell: &Cell) -> SortKey {
        SortKey::Unsortable
    }
}

pub struct CellRegistry {
    kinds: HashMap<KindTag, Box<dyn CellKind>>,
}

impl Default for CellRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRegistry {
    /// Registry with every built-in kind
    pub fn new() -> Self {
        let mut registry = Self::empty();
        basic::register(&mut registry);
        extension::register(&mut registry);
        registry
    }

    pub fn empty() -> Self {
        Self { kinds: HashMap::new() }
    }

    /// Install or replace the implementation for `tag`
    pub fn register(&mut self, tag: KindTag, kind: Box<dyn CellKind>) {
        self.kinds.insert(tag, kind);
    }

    pub fn get(&self, tag: KindTag) -> Option<&dyn CellKind> {
        if tag == KindTag::Unknown {
            return None;
        }
        self.kinds.get(&tag).map(|k| k.as_ref())
    }

    pub fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        match (self.get(cell.kind()), &cell.display_data) {
            (Some(_), Some(display)) => Measure {
                min_width: text_width(display, theme) + 2.0 * theme.cell_horizontal_padding,
            },
            (Some(kind), None) => kind.measure(cell, theme),
            (None, _) => Measure::default(),
        }
    }

    pub fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        let Some(kind) = self.get(cell.kind()) else {
            return;
        };
        match &cell.display_data {
            Some(display) => draw_text(ctx, rect, display, theme.text_dark, theme, TextAlign::Left),
            None => kind.draw(ctx, cell, rect, theme, hover),
        }
    }

    pub fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        if !cell.allow_overlay {
            return None;
        }
        self.get(cell.kind())?.begin_edit(cell)
    }

    pub fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        if !cell.allow_overlay {
            return Err(EditError::ReadOnly);
        }
        self.get(cell.kind())
            .ok_or(EditError::Unregistered(cell.kind()))?
            .commit_edit(cell, value)
    }

    pub fn copy(&self, cell: &Cell) -> String {
        self.get(cell.kind()).map(|k| k.copy(cell)).unwrap_or_default()
    }

    pub fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        if !cell.allow_overlay {
            return Err(EditError::ReadOnly);
        }
        self.get(cell.kind())
            .ok_or(EditError::Unregistered(cell.kind()))?
            .paste(text, cell)
    }

    pub fn sort_key(&self, cell: &Cell) -> SortKey {
        self.get(cell.kind()).map(|k| k.sort_key(cell)).unwrap_or(SortKey::Unsortable)
    }

    /// Text shown for a cell: the display override if present, else its copy text.
    pub fn display_text(&self, cell: &Cell) -> String {
        match &cell.display_data {
            Some(display) => display.clone(),
            None => self.copy(cell),
        }
    }

    /// A cell counts as empty when it copies to nothing.
    pub fn is_empty(&self, cell: &Cell) -> bool {
        match cell.data {
            CellData::Loading | CellData::Protected | CellData::Spinner => false,
            _ => self.copy(cell).trim().is_empty(),
        }
    }
}

/// Pixel width of `text` in the theme's font
pub fn text_width(text: &str, theme: &Theme) -> f32 {
    UnicodeWidthStr::width(text) as f32 * theme.char_width
}

/// Draw single-line text inside the cell's padding box.
pub fn draw_text(ctx: &mut dyn DrawContext, rect: Bounds, text: &str, color: ThemeColor, theme: &Theme, align: TextAlign) {
    if text.is_empty() {
        return;
    }
    let inner = rect.inset(theme.cell_horizontal_padding, theme.cell_vertical_padding);
    ctx.text(inner, text, color, align);
}

/// Text kinds measure as their text plus padding
pub fn measure_text(text: &str, theme: &Theme) -> Measure {
    Measure {
        min_width: text_width(text, theme) + 2.0 * theme.cell_horizontal_padding,
    }
}

/// Parse a string that may contain formatted numbers (currency, percentages, separators).
///
/// Handles "123.45", "-$1,234.56", "($12)", "15%" (0.15) and scientific notation.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(n) = trimmed.parse::<f64>() {
        return Some(n);
    }

    if let Some(without_pct) = trimmed.strip_suffix('%') {
        let cleaned: String = without_pct.trim().chars().filter(|c| *c != ',').collect();
        if let Ok(n) = cleaned.parse::<f64>() {
            return Some(n / 100.0);
        }
    }

    let (is_negative, body) = if let Some(rest) = trimmed.strip_prefix('-') {
        (true, rest)
    } else if trimmed.starts_with('(') && trimmed.ends_with(')') && trimmed.len() >= 2 {
        (true, &trimmed[1..trimmed.len() - 1])
    } else {
        (false, trimmed)
    };

    let body = body.trim();
    let unsigned = ['$', '€', '£', '¥']
        .iter()
        .find_map(|c| body.strip_prefix(*c))
        .unwrap_or(body);

    let cleaned: String = unsigned.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .map(|n| if is_negative { -n } else { n })
}

/// Split comma-joined clipboard text into trimmed, non-empty parts.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod test;
