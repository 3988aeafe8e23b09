//! Viewport virtualizer.
//!
//! A [`Layout`] describes the grid in display coordinates: column widths in display
//! order, row heights in display order, frozen leading columns and frozen trailing rows,
//! and the header band. Everything here is a pure function of a layout and a scroll
//! offset, so it is testable without a drawing surface.

pub mod widths;

use crate::model::{Bounds, Item, Rect};

/// Side of the square fill handle drawn at a selection's bottom-right corner
pub const FILL_HANDLE_SIZE: f32 = 8.0;

/// Row heights along the display order.
#[derive(Debug, Clone, PartialEq)]
pub enum RowHeights {
    Uniform { height: f32, count: usize },
    /// `offsets[i]` is the top of display row `i`; the last entry is the total height.
    Variable(Vec<f32>),
}

impl RowHeights {
    pub fn uniform(height: f32, count: usize) -> Self {
        RowHeights::Uniform {
            height: height.max(0.0),
            count,
        }
    }

    /// Per-row heights; a height of 0 hides the row without removing it.
    pub fn variable(heights: impl IntoIterator<Item = f32>) -> Self {
        let mut offsets = vec![0.0];
        let mut total = 0.0;
        for h in heights {
            total += if h.is_finite() { h.max(0.0) } else { 0.0 };
            offsets.push(total);
        }
        RowHeights::Variable(offsets)
    }

    pub fn len(&self) -> usize {
        match self {
            RowHeights::Uniform { count, .. } => *count,
            RowHeights::Variable(offsets) => offsets.len() - 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top of display row `row`; `row == len()` gives the total height.
    pub fn top(&self, row: usize) -> f32 {
        match self {
            RowHeights::Uniform { height, count } => row.min(*count) as f32 * height,
            RowHeights::Variable(offsets) => offsets[row.min(offsets.len() - 1)],
        }
    }

    pub fn height(&self, row: usize) -> f32 {
        if row >= self.len() {
            return 0.0;
        }
        self.top(row + 1) - self.top(row)
    }

    pub fn total(&self) -> f32 {
        self.top(self.len())
    }

    /// The row covering offset `y`. Zero-height rows are never hit.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        if y < 0.0 {
            return None;
        }
        let row = self.first_ending_after(y, self.len());
        (row < self.len() && self.top(row) <= y).then_some(row)
    }

    /// First row below `limit` whose bottom edge is past `y`
    fn first_ending_after(&self, y: f32, limit: usize) -> usize {
        match self {
            RowHeights::Uniform { height, .. } => {
                if *height <= 0.0 {
                    return limit;
                }
                ((y.max(0.0) / height).floor() as usize).min(limit)
            }
            RowHeights::Variable(offsets) => offsets[1..=limit].partition_point(|b| *b <= y),
        }
    }

    /// Number of rows below `limit` whose top edge is before `y`
    fn count_starting_before(&self, y: f32, limit: usize) -> usize {
        match self {
            RowHeights::Uniform { height, .. } => {
                if *height <= 0.0 || y <= 0.0 {
                    return 0;
                }
                ((y / height).ceil() as usize).min(limit)
            }
            RowHeights::Variable(offsets) => offsets[..limit].partition_point(|t| *t < y),
        }
    }
}

/// Geometry of the grid in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Left edge of each display column, then the total width
    col_offsets: Vec<f32>,
    rows: RowHeights,
    pub frozen_columns: usize,
    pub frozen_trailing_rows: usize,
    pub header_height: f32,
    pub group_header_height: f32,
    pub row_marker_width: f32,
    /// Viewport size in pixels
    pub width: f32,
    pub height: f32,
}

/// The scrolled part of the grid that is on screen.
///
/// `x`/`y` are the first visible scrolling column and row, `width`/`height` the counts
/// of visible scrolling columns and rows. Frozen columns and trailing rows are always
/// drawn in addition; see [`Layout::visible_columns`] and [`Layout::visible_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub tx: f32,
    pub ty: f32,
}

impl VisibleRegion {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// What lies under a pointer position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    OutOfBounds,
    GroupHeader { col: usize },
    Header { col: usize },
    /// Header band above the row markers
    Corner,
    RowMarker { row: usize },
    Cell { item: Item },
}

impl Layout {
    pub fn new(col_widths: &[f32], rows: RowHeights, width: f32, height: f32) -> Self {
        let mut col_offsets = Vec::with_capacity(col_widths.len() + 1);
        let mut total = 0.0;
        col_offsets.push(total);
        for w in col_widths {
            total += w.max(0.0);
            col_offsets.push(total);
        }
        Self {
            col_offsets,
            rows,
            frozen_columns: 0,
            frozen_trailing_rows: 0,
            header_height: 0.0,
            group_header_height: 0.0,
            row_marker_width: 0.0,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn with_frozen(mut self, columns: usize, trailing_rows: usize) -> Self {
        self.frozen_columns = columns.min(self.col_count());
        self.frozen_trailing_rows = trailing_rows.min(self.row_count());
        self
    }

    pub fn with_headers(mut self, header_height: f32, group_header_height: f32) -> Self {
        self.header_height = header_height.max(0.0);
        self.group_header_height = group_header_height.max(0.0);
        self
    }

    pub fn with_row_markers(mut self, width: f32) -> Self {
        self.row_marker_width = width.max(0.0);
        self
    }

    pub fn col_count(&self) -> usize {
        self.col_offsets.len() - 1
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &RowHeights {
        &self.rows
    }

    pub fn col_width(&self, col: usize) -> f32 {
        if col >= self.col_count() {
            return 0.0;
        }
        self.col_offsets[col + 1] - self.col_offsets[col]
    }

    pub fn row_height(&self, row: usize) -> f32 {
        self.rows.height(row)
    }

    pub fn header_total(&self) -> f32 {
        self.header_height + self.group_header_height
    }

    pub fn frozen_width(&self) -> f32 {
        self.col_offsets[self.frozen_columns]
    }

    /// First display row of the frozen trailing band
    pub fn trailing_start(&self) -> usize {
        self.row_count() - self.frozen_trailing_rows
    }

    pub fn trailing_height(&self) -> f32 {
        self.rows.total() - self.rows.top(self.trailing_start())
    }

    /// Pixel size of the scrolling area
    pub fn scroll_area(&self) -> (f32, f32) {
        (
            (self.width - self.row_marker_width - self.frozen_width()).max(0.0),
            (self.height - self.header_total() - self.trailing_height()).max(0.0),
        )
    }

    /// Pixel size of the scrolling content
    pub fn content_size(&self) -> (f32, f32) {
        (
            self.col_offsets[self.col_count()] - self.frozen_width(),
            self.rows.top(self.trailing_start()),
        )
    }

    pub fn max_scroll(&self) -> (f32, f32) {
        let (cw, ch) = self.content_size();
        let (sw, sh) = self.scroll_area();
        ((cw - sw).max(0.0), (ch - sh).max(0.0))
    }

    /// Clamp a scroll offset into the scrollable range.
    pub fn clamp_scroll(&self, tx: f32, ty: f32) -> (f32, f32) {
        let (mx, my) = self.max_scroll();
        let clamp = |v: f32, max: f32| if v.is_finite() { v.clamp(0.0, max) } else { 0.0 };
        (clamp(tx, mx), clamp(ty, my))
    }

    /// Display columns drawn for `region`: frozen first, then the scrolled run.
    pub fn visible_columns(&self, region: &VisibleRegion) -> Vec<usize> {
        (0..self.frozen_columns)
            .chain(region.x..region.x + region.width)
            .collect()
    }

    /// Display rows drawn for `region`: the scrolled run, then the trailing band.
    /// Zero-height rows are skipped.
    pub fn visible_rows(&self, region: &VisibleRegion) -> Vec<usize> {
        (region.y..region.y + region.height)
            .chain(self.trailing_start()..self.row_count())
            .filter(|r| self.rows.height(*r) > 0.0)
            .collect()
    }

    /// Screen x of display column `col`
    pub fn col_x(&self, col: usize, tx: f32) -> f32 {
        let offset = self.col_offsets[col.min(self.col_count())];
        if col < self.frozen_columns {
            self.row_marker_width + offset
        } else {
            self.row_marker_width + offset - tx
        }
    }

    /// Screen y of display row `row`
    pub fn row_y(&self, row: usize, ty: f32) -> f32 {
        if row >= self.trailing_start() {
            let band_top = self.height - self.trailing_height();
            band_top + self.rows.top(row) - self.rows.top(self.trailing_start())
        } else {
            self.header_total() + self.rows.top(row) - ty
        }
    }

    pub fn cell_bounds(&self, item: Item, tx: f32, ty: f32) -> Option<Bounds> {
        if item.col >= self.col_count() || item.row >= self.row_count() {
            return None;
        }
        Some(Bounds::new(
            self.col_x(item.col, tx),
            self.row_y(item.row, ty),
            self.col_width(item.col),
            self.row_height(item.row),
        ))
    }

    /// Bounds of a merged cell covering display columns `start..=end` of `row`.
    pub fn span_bounds(&self, row: usize, start: usize, end: usize, tx: f32, ty: f32) -> Option<Bounds> {
        let first = self.cell_bounds(Item::new(start, row), tx, ty)?;
        let last = self.cell_bounds(Item::new(end, row), tx, ty)?;
        Some(Bounds::new(first.x, first.y, last.x + last.width - first.x, first.height))
    }

    /// Bounds of a rectangle of display cells
    pub fn rect_bounds(&self, rect: Rect, tx: f32, ty: f32) -> Option<Bounds> {
        if rect.is_empty() {
            return None;
        }
        let first = self.cell_bounds(Item::new(rect.x, rect.y), tx, ty)?;
        let last = self.cell_bounds(Item::new(rect.right() - 1, rect.bottom() - 1), tx, ty)?;
        Some(Bounds::new(
            first.x,
            first.y,
            last.x + last.width - first.x,
            last.y + last.height - first.y,
        ))
    }

    pub fn header_bounds(&self, col: usize, tx: f32) -> Option<Bounds> {
        if col >= self.col_count() {
            return None;
        }
        Some(Bounds::new(
            self.col_x(col, tx),
            self.group_header_height,
            self.col_width(col),
            self.header_height,
        ))
    }

    pub fn row_marker_bounds(&self, row: usize, ty: f32) -> Option<Bounds> {
        if row >= self.row_count() || self.row_marker_width <= 0.0 {
            return None;
        }
        Some(Bounds::new(0.0, self.row_y(row, ty), self.row_marker_width, self.row_height(row)))
    }

    pub fn fill_handle_bounds(&self, rect: Rect, tx: f32, ty: f32) -> Option<Bounds> {
        let b = self.rect_bounds(rect, tx, ty)?;
        let half = FILL_HANDLE_SIZE / 2.0;
        Some(Bounds::new(
            b.x + b.width - half,
            b.y + b.height - half,
            FILL_HANDLE_SIZE,
            FILL_HANDLE_SIZE,
        ))
    }

    /// Display column under screen x, ignoring the row marker band
    pub fn col_at(&self, px: f32, tx: f32) -> Option<usize> {
        let x = px - self.row_marker_width;
        if x < 0.0 || px >= self.width {
            return None;
        }
        let content_x = if x < self.frozen_width() { x } else { x + tx };
        let col = self.col_offsets[1..].partition_point(|right| *right <= content_x);
        (col < self.col_count()).then_some(col)
    }

    /// Display row under screen y, ignoring the header band
    pub fn row_at(&self, py: f32, ty: f32) -> Option<usize> {
        if py < self.header_total() || py >= self.height {
            return None;
        }
        let band_top = self.height - self.trailing_height();
        if self.frozen_trailing_rows > 0 && py >= band_top {
            let y = py - band_top + self.rows.top(self.trailing_start());
            return self.rows.row_at(y).filter(|r| *r >= self.trailing_start());
        }
        let y = py - self.header_total() + ty;
        self.rows.row_at(y).filter(|r| *r < self.trailing_start())
    }

    pub fn hit_test(&self, px: f32, py: f32, tx: f32, ty: f32) -> HitTarget {
        if px < 0.0 || py < 0.0 || px >= self.width || py >= self.height {
            return HitTarget::OutOfBounds;
        }
        let in_markers = px < self.row_marker_width;

        if py < self.header_total() {
            if in_markers {
                return HitTarget::Corner;
            }
            return match self.col_at(px, tx) {
                Some(col) if py < self.group_header_height => HitTarget::GroupHeader { col },
                Some(col) => HitTarget::Header { col },
                None => HitTarget::OutOfBounds,
            };
        }

        let Some(row) = self.row_at(py, ty) else {
            return HitTarget::OutOfBounds;
        };
        if in_markers {
            return HitTarget::RowMarker { row };
        }
        match self.col_at(px, tx) {
            Some(col) => HitTarget::Cell {
                item: Item::new(col, row),
            },
            None => HitTarget::OutOfBounds,
        }
    }

    /// Scroll offset that brings `item` fully into view, changing as little as possible.
    /// Frozen columns and trailing rows never need scrolling.
    pub fn scroll_to(&self, item: Item, tx: f32, ty: f32) -> (f32, f32) {
        let (sw, sh) = self.scroll_area();
        let (mut tx, mut ty) = (tx, ty);

        if item.col >= self.frozen_columns && item.col < self.col_count() {
            let left = self.col_offsets[item.col] - self.frozen_width();
            let right = left + self.col_width(item.col);
            if left < tx || right - left > sw {
                tx = left;
            } else if right > tx + sw {
                tx = right - sw;
            }
        }

        if item.row < self.trailing_start() {
            let top = self.rows.top(item.row);
            let bottom = top + self.rows.height(item.row);
            if top < ty || bottom - top > sh {
                ty = top;
            } else if bottom > ty + sh {
                ty = bottom - sh;
            }
        }

        self.clamp_scroll(tx, ty)
    }
}

/// The visible region for a scroll offset. The offset is clamped first.
pub fn visible_region(layout: &Layout, tx: f32, ty: f32) -> VisibleRegion {
    let (tx, ty) = layout.clamp_scroll(tx, ty);
    let (sw, sh) = layout.scroll_area();
    let frozen = layout.frozen_columns;
    let fw = layout.frozen_width();
    let cols = layout.col_count();

    let x = frozen + layout.col_offsets[frozen + 1..=cols].partition_point(|right| *right - fw <= tx);
    let end = if sw > 0.0 {
        frozen + layout.col_offsets[frozen..cols].partition_point(|left| *left - fw < tx + sw)
    } else {
        x
    };

    let limit = layout.trailing_start();
    let y = layout.rows.first_ending_after(ty, limit);
    let bottom = if sh > 0.0 {
        layout.rows.count_starting_before(ty + sh, limit)
    } else {
        y
    };

    VisibleRegion {
        x,
        y,
        width: end.saturating_sub(x),
        height: bottom.saturating_sub(y),
        tx,
        ty,
    }
}

#[cfg(test)]
mod test;
