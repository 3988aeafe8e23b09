//! Built-in kinds that ship with every grid.

use super::{
    draw_text, measure_text, parse_numeric, split_list, text_width, CellKind, CellRegistry, EditError,
    EditorHandle, EditorPresentation, EditorValue, Measure,
};
use crate::draw::{DrawContext, HoverState, StrokeStyle, TextAlign, Theme};
use crate::model::cell::{Cell, CellData, DrilldownItem, KindTag};
use crate::model::Bounds;
use crate::view::sort::SortKey;

pub(super) fn register(registry: &mut CellRegistry) {
    registry.register(KindTag::Text, Box::new(TextKind));
    registry.register(KindTag::Number, Box::new(NumberKind));
    registry.register(KindTag::Boolean, Box::new(BooleanKind));
    registry.register(KindTag::Markdown, Box::new(MarkdownKind));
    registry.register(KindTag::Uri, Box::new(UriKind));
    registry.register(KindTag::Image, Box::new(ImageKind));
    registry.register(KindTag::Bubble, Box::new(BubbleKind));
    registry.register(KindTag::Drilldown, Box::new(DrilldownKind));
    registry.register(KindTag::RowId, Box::new(RowIdKind));
    registry.register(KindTag::Protected, Box::new(ProtectedKind));
    registry.register(KindTag::Loading, Box::new(LoadingKind));
}

/// Accepts either editor shape: text goes through `paste`, data must match the kind.
fn commit_via_paste(kind: &dyn CellKind, tag: KindTag, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
    match value {
        EditorValue::Text(text) => kind.paste(&text, cell),
        EditorValue::Data(data) if data.tag() == tag => Ok(cell.with_data(data)),
        EditorValue::Data(_) => Err(EditError::WrongKind(tag)),
    }
}

pub struct TextKind;

impl CellKind for TextKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, &self.copy(cell), theme.text_dark, theme, TextAlign::Left);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Text, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Text, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Text(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::Text(text.to_string())))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct NumberKind;

impl NumberKind {
    fn value(cell: &Cell) -> Option<f64> {
        match cell.data {
            CellData::Number(n) => n,
            _ => None,
        }
    }
}

impl CellKind for NumberKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, &self.copy(cell), theme.text_dark, theme, TextAlign::Right);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Number, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Number, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::value(cell).map(|n| n.to_string()).unwrap_or_default()
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        if text.trim().is_empty() {
            return Ok(cell.with_data(CellData::Number(None)));
        }
        parse_numeric(text)
            .map(|n| cell.with_data(CellData::Number(Some(n))))
            .ok_or_else(|| EditError::Parse(text.to_string()))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        match Self::value(cell) {
            Some(n) if !n.is_nan() => SortKey::Number(n),
            _ => SortKey::Empty,
        }
    }
}

pub struct BooleanKind;

impl BooleanKind {
    fn value(cell: &Cell) -> Option<bool> {
        match cell.data {
            CellData::Boolean(b) => b,
            _ => None,
        }
    }
}

impl CellKind for BooleanKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        Measure {
            min_width: theme.line_height + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        let size = (rect.height - 2.0 * theme.cell_vertical_padding).min(theme.line_height).max(0.0);
        let bx = Bounds::new(rect.x + (rect.width - size) / 2.0, rect.y + (rect.height - size) / 2.0, size, size);
        match Self::value(cell) {
            Some(true) => {
                ctx.fill_rect(bx, theme.accent_color);
                let (x, y, s) = (bx.x, bx.y, bx.width);
                ctx.line((x + s * 0.2, y + s * 0.5), (x + s * 0.42, y + s * 0.72), theme.accent_fg);
                ctx.line((x + s * 0.42, y + s * 0.72), (x + s * 0.8, y + s * 0.3), theme.accent_fg);
            }
            Some(false) => {
                let color = if hover.hovered { theme.text_medium } else { theme.text_light };
                ctx.stroke_rect(bx, color, StrokeStyle::Solid);
            }
            None => {
                ctx.stroke_rect(bx, theme.text_light, StrokeStyle::Dashed);
            }
        }
    }

    /// Activation toggles the value without an editor
    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        let next = !Self::value(cell).unwrap_or(false);
        Some(EditorHandle::data(
            KindTag::Boolean,
            CellData::Boolean(Some(next)),
            EditorPresentation::Immediate,
        ))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Boolean, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match Self::value(cell) {
            Some(true) => "true".to_string(),
            Some(false) => "false".to_string(),
            None => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let value = match text.trim().to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            "" => None,
            _ => return Err(EditError::Parse(text.to_string())),
        };
        Ok(cell.with_data(CellData::Boolean(value)))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        Self::value(cell).map(SortKey::Bool).unwrap_or(SortKey::Empty)
    }
}

pub struct MarkdownKind;

impl MarkdownKind {
    /// First line with the common inline markers removed, for in-cell preview
    fn preview(source: &str) -> String {
        let first = source.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        first
            .trim_start_matches(|c: char| c == '#' || c == '>' || c == '-' || c == ' ')
            .chars()
            .filter(|c| !matches!(c, '*' | '_' | '`'))
            .collect()
    }
}

impl CellKind for MarkdownKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&Self::preview(&self.copy(cell)), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, &Self::preview(&self.copy(cell)), theme.text_dark, theme, TextAlign::Left);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Markdown, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Markdown, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Markdown(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::Markdown(text.to_string())))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct UriKind;

impl CellKind for UriKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        let uri = self.copy(cell);
        draw_text(ctx, rect, &uri, theme.link_color, theme, TextAlign::Left);
        if hover.hovered && !uri.is_empty() {
            let y = rect.y + rect.height - theme.cell_vertical_padding - 1.0;
            let x0 = rect.x + theme.cell_horizontal_padding;
            let x1 = (x0 + text_width(&uri, theme)).min(rect.x + rect.width - theme.cell_horizontal_padding);
            ctx.line((x0, y), (x1, y), theme.link_color);
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Uri, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Uri, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Uri(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::Uri(text.trim().to_string())))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct ImageKind;

impl ImageKind {
    fn urls(cell: &Cell) -> &[String] {
        match &cell.data {
            CellData::Image(urls) => urls,
            _ => &[],
        }
    }
}

impl CellKind for ImageKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let count = Self::urls(cell).len().max(1) as f32;
        Measure {
            min_width: count * (theme.line_height + 4.0) + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let size = rect.height - 2.0 * theme.cell_vertical_padding;
        let mut x = rect.x + theme.cell_horizontal_padding;
        for url in Self::urls(cell) {
            if x + size > rect.x + rect.width {
                break;
            }
            ctx.image(Bounds::new(x, rect.y + theme.cell_vertical_padding, size, size), url);
            x += size + 4.0;
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Image, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Image, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::urls(cell).join(",")
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::Image(split_list(text))))
    }
}

pub struct BubbleKind;

impl BubbleKind {
    fn items(cell: &Cell) -> &[String] {
        match &cell.data {
            CellData::Bubble(items) => items,
            _ => &[],
        }
    }
}

impl CellKind for BubbleKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let inner: f32 = Self::items(cell)
            .iter()
            .map(|s| text_width(s, theme) + theme.cell_horizontal_padding + 4.0)
            .sum();
        Measure {
            min_width: inner + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        let bg = if hover.selected { theme.bg_bubble_selected } else { theme.bg_bubble };
        let mut x = rect.x + theme.cell_horizontal_padding;
        let h = rect.height - 2.0 * theme.cell_vertical_padding;
        for item in Self::items(cell) {
            let w = text_width(item, theme) + theme.cell_horizontal_padding;
            if x + w > rect.x + rect.width {
                break;
            }
            let bubble = Bounds::new(x, rect.y + theme.cell_vertical_padding, w, h);
            ctx.fill_rect(bubble, bg);
            ctx.text(bubble, item, theme.text_dark, TextAlign::Center);
            x += w + 4.0;
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::Bubble, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_via_paste(self, KindTag::Bubble, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::items(cell).join(",")
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::Bubble(split_list(text))))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct DrilldownKind;

impl DrilldownKind {
    fn items(cell: &Cell) -> &[DrilldownItem] {
        match &cell.data {
            CellData::Drilldown(items) => items,
            _ => &[],
        }
    }
}

impl CellKind for DrilldownKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let inner: f32 = Self::items(cell)
            .iter()
            .map(|d| text_width(&d.text, theme) + theme.cell_horizontal_padding + 4.0)
            .sum();
        Measure {
            min_width: inner + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let mut x = rect.x + theme.cell_horizontal_padding;
        let h = rect.height - 2.0 * theme.cell_vertical_padding;
        for item in Self::items(cell) {
            let img_w = if item.img.is_some() { h } else { 0.0 };
            let w = text_width(&item.text, theme) + img_w + theme.cell_horizontal_padding;
            if x + w > rect.x + rect.width {
                break;
            }
            let chip = Bounds::new(x, rect.y + theme.cell_vertical_padding, w, h);
            ctx.fill_rect(chip, theme.bg_cell);
            ctx.stroke_rect(chip, theme.drilldown_border, StrokeStyle::Solid);
            if let Some(img) = &item.img {
                ctx.image(Bounds::new(x, chip.y, h, h), img);
            }
            ctx.text(Bounds::new(x + img_w, chip.y, w - img_w, h), &item.text, theme.text_dark, TextAlign::Center);
            x += w + 4.0;
        }
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::items(cell).iter().map(|d| d.text.as_str()).collect::<Vec<_>>().join(",")
    }

    /// Keeps the image of an item whose text is pasted back unchanged
    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let existing = Self::items(cell);
        let items = split_list(text)
            .into_iter()
            .map(|text| {
                let img = existing.iter().find(|d| d.text == text).and_then(|d| d.img.clone());
                DrilldownItem { text, img }
            })
            .collect();
        Ok(cell.with_data(CellData::Drilldown(items)))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct RowIdKind;

impl CellKind for RowIdKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, &self.copy(cell), theme.text_light, theme, TextAlign::Left);
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::RowId(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        Ok(cell.with_data(CellData::RowId(text.trim().to_string())))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

/// Hidden content. Never copies its value out.
pub struct ProtectedKind;

impl CellKind for ProtectedKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        measure_text("******", theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, _cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, "******", theme.text_medium, theme, TextAlign::Left);
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }

    fn copy(&self, _cell: &Cell) -> String {
        String::new()
    }

    fn paste(&self, _text: &str, _cell: &Cell) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }
}

pub struct LoadingKind;

impl CellKind for LoadingKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        Measure {
            min_width: 4.0 * theme.char_width + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, _cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let inner = rect.inset(theme.cell_horizontal_padding, rect.height / 3.0);
        ctx.fill_rect(Bounds::new(inner.x, inner.y, inner.width * 0.6, inner.height), theme.bg_cell_medium);
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }

    fn copy(&self, _cell: &Cell) -> String {
        String::new()
    }

    fn paste(&self, _text: &str, _cell: &Cell) -> Result<Cell, EditError> {
        Err(EditError::ReadOnly)
    }
}
