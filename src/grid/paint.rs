//! Painting a frame onto a [`DrawContext`].
//!
//! Only visible cells are touched. Frozen columns and trailing rows are painted after
//! the scrolled body so they sit on top of it.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::time::Instant;

use super::DataGrid;
use crate::config::{HighlightStyle, RowMarkers};
use crate::draw::{DrawContext, HoverState, StrokeStyle, TextAlign, Theme};
use crate::events::{GridEvent, HoverKind};
use crate::kinds::draw_text;
use crate::model::{Bounds, Item};
use crate::render::Redraw;
use crate::view::sort::SortDirection;

const CHECKED: &str = "☑";
const UNCHECKED: &str = "☐";

impl DataGrid {
    /// Paint whatever the scheduler has pending and return it. Flash animations are
    /// advanced to `now` first.
    pub fn paint(&mut self, ctx: &mut dyn DrawContext, now: Instant) -> Redraw {
        let redraw = {
            let mut scheduler = self.scheduler.borrow_mut();
            if scheduler.is_animating() {
                scheduler.tick(now);
            }
            scheduler.take()
        };
        match &redraw {
            Redraw::Nothing => {}
            Redraw::Cells(items) => {
                for item in items.iter().filter_map(|l| self.display_item(*l)) {
                    if self.is_on_screen(item) {
                        self.paint_cell(ctx, item, now, &mut BTreeSet::new());
                    }
                }
                self.paint_overlays(ctx);
            }
            Redraw::Full => self.paint_all(ctx, now),
        }
        redraw
    }

    /// Paint a complete frame.
    pub fn paint_all(&self, ctx: &mut dyn DrawContext, now: Instant) {
        let layout = &self.layout;
        ctx.fill_rect(Bounds::new(0.0, 0.0, layout.width, layout.height), self.theme.bg_cell);

        let cols = layout.visible_columns(&self.region);
        let rows = layout.visible_rows(&self.region);
        let (frozen, scrolled): (Vec<usize>, Vec<usize>) = cols.iter().partition(|&&c| c < layout.frozen_columns);

        let body_x = layout.row_marker_width + layout.frozen_width();
        let body = Bounds::new(body_x, layout.header_total(), (layout.width - body_x).max(0.0), layout.height);
        let mut spans = BTreeSet::new();
        ctx.clip(body);
        for &row in &rows {
            for &col in &scrolled {
                self.paint_cell(ctx, Item::new(col, row), now, &mut spans);
            }
        }
        ctx.unclip();
        for &row in &rows {
            for &col in &frozen {
                self.paint_cell(ctx, Item::new(col, row), now, &mut spans);
            }
        }

        self.paint_overlays(ctx);
        self.paint_headers(ctx, &cols);
        self.paint_row_markers(ctx, &rows);
        self.paint_shadows(ctx);
    }

    fn is_on_screen(&self, item: Item) -> bool {
        let r = &self.region;
        let col_visible = item.col < self.layout.frozen_columns || (item.col >= r.x && item.col < r.x + r.width);
        let row_visible = item.row >= self.layout.trailing_start() || (item.row >= r.y && item.row < r.y + r.height);
        col_visible && row_visible
    }

    /// Paint one display cell. Merged cells are painted once per frame, whichever of
    /// their columns is reached first.
    fn paint_cell(&self, ctx: &mut dyn DrawContext, item: Item, now: Instant, spans: &mut BTreeSet<(usize, usize)>) {
        let Some(logical) = self.logical_item(item) else {
            return;
        };
        let Some(cell) = self.data.get_cell(logical.col, logical.row) else {
            return;
        };
        let (tx, ty) = (self.region.tx, self.region.ty);
        let (item, bounds) = match self.display_span(item) {
            Some((start, end)) => {
                if !spans.insert((item.row, start)) {
                    return;
                }
                (Item::new(start, item.row), self.layout.span_bounds(item.row, start, end, tx, ty))
            }
            None => (item, self.layout.cell_bounds(item, tx, ty)),
        };
        let Some(bounds) = bounds else {
            return;
        };
        let Some(logical) = self.logical_item(item) else {
            return;
        };
        let cell = self.data.get_cell(logical.col, logical.row).unwrap_or(cell);

        let column_theme = self.data.column(logical.col).and_then(|c| c.theme_override.as_ref());
        let theme: Cow<Theme> = match (column_theme, cell.theme_override.as_ref()) {
            (None, None) => Cow::Borrowed(&self.theme),
            (col, cell) => {
                let mut theme = self.theme.clone();
                if let Some(over) = col {
                    theme = theme.merged(over);
                }
                if let Some(over) = cell {
                    theme = theme.merged(over);
                }
                Cow::Owned(theme)
            }
        };

        let selected = self.selection.state().is_selected(item, logical.row);
        let background = if selected { theme.accent_light } else { theme.bg_cell };
        ctx.fill_rect(bounds, background);
        if self.search_matches.binary_search_by_key(&(item.row, item.col), |m| (m.row, m.col)).is_ok() {
            ctx.fill_rect(bounds, theme.bg_search_result);
        }
        if let Some(level) = self.scheduler.borrow().flash_level(logical, now) {
            ctx.fill_rect(bounds, theme.flash_color.fade(level));
        }

        let hovered = self.is_hovered(logical);
        let hover = HoverState {
            hovered,
            pos: self
                .pointer_at
                .filter(|_| hovered)
                .map(|(x, y)| (x - bounds.x, y - bounds.y)),
            selected,
        };
        match self.editor.session().filter(|s| s.logical == logical) {
            Some(session) => {
                ctx.fill_rect(bounds, theme.bg_cell);
                if let Some(text) = session.text() {
                    draw_text(ctx, bounds, text, theme.text_dark, &theme, TextAlign::Left);
                }
                ctx.stroke_rect(bounds, theme.accent_color, StrokeStyle::Solid);
            }
            None => {
                ctx.clip(bounds);
                self.registry.draw(ctx, cell, bounds, &theme, hover);
                ctx.unclip();
            }
        }
        if theme.show_grid {
            ctx.stroke_rect(bounds, theme.border_color, StrokeStyle::Solid);
        }
    }

    fn is_hovered(&self, logical: Item) -> bool {
        matches!(
            self.hover,
            Some(GridEvent::ItemHovered {
                kind: HoverKind::Cell,
                col: Some(col),
                row: Some(row),
                ..
            }) if col == logical.col && row == logical.row
        )
    }

    /// Highlight regions, the selection outline, focus ring and fill handle.
    fn paint_overlays(&self, ctx: &mut dyn DrawContext) {
        let (tx, ty) = (self.region.tx, self.region.ty);
        let theme = &self.theme;

        for region in &self.options.highlight_regions {
            let range = region.range.clamp_to(self.columns.len(), self.order.len());
            let Some(b) = self.layout.rect_bounds(range, tx, ty) else {
                continue;
            };
            match region.style {
                HighlightStyle::Dashed => {
                    ctx.fill_rect(b, region.color);
                    ctx.stroke_rect(b, region.color, StrokeStyle::Dashed);
                }
                HighlightStyle::Solid => {
                    ctx.fill_rect(b, region.color);
                    ctx.stroke_rect(b, region.color, StrokeStyle::Solid);
                }
                HighlightStyle::SolidOutline => ctx.stroke_rect(b, region.color, StrokeStyle::Solid),
                HighlightStyle::NoOutline => ctx.fill_rect(b, region.color),
            }
        }

        let state = self.selection.state();
        for rect in &state.ranges {
            if let Some(b) = self.layout.rect_bounds(*rect, tx, ty) {
                ctx.stroke_rect(b, theme.accent_color, StrokeStyle::Solid);
            }
        }
        if let Some(current) = state.current {
            let bounds = match self.display_span(current) {
                Some((start, end)) => self.layout.span_bounds(current.row, start, end, tx, ty),
                None => self.layout.cell_bounds(current, tx, ty),
            };
            if let Some(b) = bounds {
                ctx.stroke_rect(b, theme.accent_color, StrokeStyle::Solid);
            }
        }
        if let Some(preview) = self.fill_preview() {
            if let Some(b) = self.layout.rect_bounds(preview, tx, ty) {
                ctx.stroke_rect(b, theme.accent_color, StrokeStyle::Dashed);
            }
        }
        if self.options.fill_handle {
            if let Some(b) = state
                .primary_range()
                .and_then(|r| self.layout.fill_handle_bounds(r, tx, ty))
            {
                ctx.fill_rect(b, theme.accent_color);
            }
        }
    }

    fn paint_headers(&self, ctx: &mut dyn DrawContext, cols: &[usize]) {
        let layout = &self.layout;
        let theme = &self.theme;
        let tx = self.region.tx;
        let state = self.selection.state();
        ctx.fill_rect(Bounds::new(0.0, 0.0, layout.width, layout.header_total()), theme.bg_header);

        for &col in cols {
            let Some(logical) = self.columns.logical(col) else {
                continue;
            };
            let (Some(column), Some(b)) = (self.data.column(logical), layout.header_bounds(col, tx)) else {
                continue;
            };
            let focused = state.columns.contains(&col) || state.current.map_or(false, |c| c.col == col);
            ctx.fill_rect(b, if focused { theme.bg_header_has_focus } else { theme.bg_header });

            let mut title = column.title.clone();
            if let Some(pos) = self.sort.iter().position(|s| s.column == logical) {
                let arrow = match self.sort[pos].direction {
                    SortDirection::Ascending => "▲",
                    SortDirection::Descending => "▼",
                };
                title.push(' ');
                title.push_str(arrow);
                if self.sort.len() > 1 {
                    title.push_str(&(pos + 1).to_string());
                }
            }
            draw_text(ctx, b, &title, theme.text_header, theme, TextAlign::Left);
            ctx.line((b.x + b.width, b.y), (b.x + b.width, b.y + b.height), theme.border_color);
        }

        if layout.group_header_height > 0.0 {
            self.paint_group_headers(ctx, cols);
        }
        ctx.line(
            (0.0, layout.header_total()),
            (layout.width, layout.header_total()),
            theme.border_color,
        );
    }

    /// One box per run of adjacent visible columns sharing a group
    fn paint_group_headers(&self, ctx: &mut dyn DrawContext, cols: &[usize]) {
        let theme = &self.theme;
        let tx = self.region.tx;
        let group_of = |col: usize| {
            self.columns
                .logical(col)
                .and_then(|l| self.data.column(l))
                .and_then(|c| c.group.as_deref())
        };

        let mut start = 0;
        while start < cols.len() {
            let group = group_of(cols[start]);
            let mut end = start;
            while end + 1 < cols.len() && cols[end + 1] == cols[end] + 1 && group_of(cols[end + 1]) == group {
                end += 1;
            }
            let first = self.layout.header_bounds(cols[start], tx);
            let last = self.layout.header_bounds(cols[end], tx);
            if let (Some(first), Some(last)) = (first, last) {
                let b = Bounds::new(first.x, 0.0, last.x + last.width - first.x, self.layout.group_header_height);
                ctx.fill_rect(b, theme.bg_header);
                if let Some(name) = group {
                    draw_text(ctx, b, name, theme.text_group_header, theme, TextAlign::Left);
                }
                ctx.stroke_rect(b, theme.border_color, StrokeStyle::Solid);
            }
            start = end + 1;
        }
    }

    fn paint_row_markers(&self, ctx: &mut dyn DrawContext, rows: &[usize]) {
        let markers = self.options.row_markers;
        if !markers.is_visible() {
            return;
        }
        let theme = &self.theme;
        let ty = self.region.ty;
        let state = self.selection.state();

        for &row in rows {
            let (Some(logical), Some(b)) = (self.order.logical(row), self.layout.row_marker_bounds(row, ty)) else {
                continue;
            };
            let selected = state.rows.contains(&logical);
            ctx.fill_rect(b, if selected { theme.bg_header_has_focus } else { theme.bg_header });

            let number = (self.options.row_marker_start_index + logical).to_string();
            let checkbox = if selected { CHECKED } else { UNCHECKED };
            let hovered = matches!(
                self.hover,
                Some(GridEvent::ItemHovered { row: Some(r), .. }) if r == logical
            );
            let label = match markers {
                RowMarkers::Number | RowMarkers::ClickableNumber => number.as_str(),
                RowMarkers::Checkbox => checkbox,
                RowMarkers::Both if selected || hovered => checkbox,
                RowMarkers::Both => number.as_str(),
                RowMarkers::None => "",
            };
            draw_text(ctx, b, label, theme.text_header, theme, TextAlign::Center);
        }

        let corner = Bounds::new(0.0, 0.0, self.layout.row_marker_width, self.layout.header_total());
        ctx.fill_rect(corner, theme.bg_header);
        if matches!(markers, RowMarkers::Checkbox | RowMarkers::Both) {
            let all = !self.order.is_empty() && self.order.rows().iter().all(|r| state.rows.contains(r));
            draw_text(ctx, corner, if all { CHECKED } else { UNCHECKED }, theme.text_header, theme, TextAlign::Center);
        }
    }

    /// Edge decals where scrolled content passes under frozen columns and trailing rows
    fn paint_shadows(&self, ctx: &mut dyn DrawContext) {
        let layout = &self.layout;
        let color = self.theme.shadow_color;
        if self.options.fixed_shadow_x && layout.frozen_columns > 0 && self.region.tx > 0.0 {
            let x = layout.row_marker_width + layout.frozen_width();
            ctx.line((x, layout.header_total()), (x, layout.height), color);
        }
        if self.options.fixed_shadow_y && layout.frozen_trailing_rows > 0 {
            let y = layout.height - layout.trailing_height();
            ctx.line((layout.row_marker_width, y), (layout.width, y), color);
        }
    }
}
