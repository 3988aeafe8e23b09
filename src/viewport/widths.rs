use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use crate::draw::Theme;
use crate::kinds::{measure_text, CellRegistry};
use crate::model::column::ColumnWidth;
use crate::model::data::GridData;
use crate::view::sort::PARALLEL_THRESHOLD;
use crate::view::ColumnOrder;

/// Rows sampled when measuring an auto-sized column
pub const AUTO_SAMPLE_ROWS: usize = 500;

/// Grid-wide width limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthBounds {
    pub min: f32,
    pub max: f32,
    /// Cap for auto-measured columns
    pub max_auto: f32,
}

/// Column widths by logical column.
///
/// Widths are only measured when asked: new columns start dirty, and
/// [`ColumnWidths::remeasure`] marks columns dirty again. Data changes alone never
/// trigger a measurement.
#[derive(Debug, Clone)]
pub struct ColumnWidths {
    widths: Vec<f32>,
    dirty: BTreeSet<usize>,
    /// Columns resized by the user; kept until explicitly remeasured
    manual: BTreeSet<usize>,
}

impl ColumnWidths {
    pub fn new(col_count: usize) -> Self {
        Self {
            widths: vec![0.0; col_count],
            dirty: (0..col_count).collect(),
            manual: BTreeSet::new(),
        }
    }

    /// Request measurement of `cols`, or of every column when `None`.
    pub fn remeasure(&mut self, cols: Option<&[usize]>) {
        let count = self.widths.len();
        match cols {
            Some(cols) => {
                for &col in cols.iter().filter(|c| **c < count) {
                    self.dirty.insert(col);
                    self.manual.remove(&col);
                }
            }
            None => {
                self.dirty = (0..count).collect();
                self.manual.clear();
            }
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Measure the dirty columns. Returns whether any width changed.
    pub fn resolve(&mut self, data: &GridData, registry: &CellRegistry, theme: &Theme, bounds: WidthBounds) -> bool {
        if self.dirty.is_empty() {
            return false;
        }
        let cols: Vec<usize> = std::mem::take(&mut self.dirty).into_iter().collect();
        let sampled = data.row_count().min(AUTO_SAMPLE_ROWS);

        let measured: Vec<(usize, f32)> = if cols.len() * sampled >= PARALLEL_THRESHOLD && cols.len() > 1 {
            cols.par_iter()
                .map(|&col| (col, measure_column(data, registry, theme, col, bounds)))
                .collect()
        } else {
            cols.iter()
                .map(|&col| (col, measure_column(data, registry, theme, col, bounds)))
                .collect()
        };

        let mut changed = false;
        for (col, width) in measured {
            if let Some(slot) = self.widths.get_mut(col) {
                changed |= *slot != width;
                *slot = width;
            }
        }
        debug!(columns = cols.len(), sampled, changed, "measured column widths");
        changed
    }

    pub fn width(&self, col: usize) -> f32 {
        self.widths.get(col).copied().unwrap_or(0.0)
    }

    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    /// Widths in display order
    pub fn display_widths(&self, order: &ColumnOrder) -> Vec<f32> {
        order.as_slice().iter().map(|&col| self.width(col)).collect()
    }

    /// User resize: clamp and pin `width`. Returns the width applied.
    pub fn set_width(&mut self, data: &GridData, col: usize, width: f32, bounds: WidthBounds) -> Option<f32> {
        let column = data.column(col)?;
        let width = column.clamp_width(width, bounds.min, bounds.max);
        let slot = self.widths.get_mut(col)?;
        *slot = width;
        self.dirty.remove(&col);
        self.manual.insert(col);
        Some(width)
    }

    pub fn is_manual(&self, col: usize) -> bool {
        self.manual.contains(&col)
    }
}

fn measure_column(data: &GridData, registry: &CellRegistry, theme: &Theme, col: usize, bounds: WidthBounds) -> f32 {
    let Some(column) = data.column(col) else {
        return bounds.min;
    };
    match column.width {
        ColumnWidth::Fixed(w) => column.clamp_width(w, bounds.min, bounds.max),
        ColumnWidth::Auto => {
            let title = measure_text(&column.title, theme).min_width;
            let content = (0..data.row_count().min(AUTO_SAMPLE_ROWS))
                .filter_map(|row| data.get_cell(col, row))
                .map(|cell| registry.measure(cell, theme).min_width)
                .fold(0.0_f32, f32::max);
            let width = title.max(content).ceil().min(bounds.max_auto);
            column.clamp_width(width, bounds.min, bounds.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::Cell;
    use crate::model::column::Column;

    fn bounds() -> WidthBounds {
        WidthBounds {
            min: 20.0,
            max: 400.0,
            max_auto: 100.0,
        }
    }

    fn data(texts: &[&str]) -> GridData {
        GridData::new(
            vec![Column::new("a"), Column::new("b").with_width(1000.0)],
            texts.iter().map(|t| vec![Cell::text(*t), Cell::text("")]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_auto_width_follows_content_and_caps() {
        let theme = Theme::light();
        let registry = CellRegistry::new();
        let mut widths = ColumnWidths::new(2);
        widths.resolve(&data(&["a"]), &registry, &theme, bounds());
        assert!(widths.width(0) >= 20.0 && widths.width(0) < 100.0);
        assert_eq!(widths.width(1), 400.0);

        let mut widths = ColumnWidths::new(2);
        widths.resolve(&data(&["x".repeat(200).as_str()]), &registry, &theme, bounds());
        assert_eq!(widths.width(0), 100.0);
    }

    #[test]
    fn test_measures_only_on_request() {
        let theme = Theme::light();
        let registry = CellRegistry::new();
        let mut widths = ColumnWidths::new(2);
        widths.resolve(&data(&["a"]), &registry, &theme, bounds());
        let before = widths.width(0);

        let wide = data(&["x".repeat(50).as_str()]);
        assert!(!widths.resolve(&wide, &registry, &theme, bounds()));
        assert_eq!(widths.width(0), before);

        widths.remeasure(Some(&[0]));
        assert!(widths.resolve(&wide, &registry, &theme, bounds()));
        assert!(widths.width(0) > before);
    }

    #[test]
    fn test_manual_width_is_clamped_and_pinned() {
        let theme = Theme::light();
        let registry = CellRegistry::new();
        let d = data(&["a"]);
        let mut widths = ColumnWidths::new(2);
        widths.resolve(&d, &registry, &theme, bounds());
        assert_eq!(widths.set_width(&d, 0, 5.0, bounds()), Some(20.0));
        assert!(widths.is_manual(0));
        widths.remeasure(None);
        assert!(!widths.is_manual(0));
        assert_eq!(widths.set_width(&d, 9, 50.0, bounds()), None);
    }
}
