//! Richer kinds: choice lists, ratings, dates, ranges, links, charts and trees.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use super::{
    draw_text, measure_text, parse_numeric, split_list, text_width, CellKind, CellRegistry, EditError,
    EditorHandle, EditorPresentation, EditorValue, Measure,
};
use crate::draw::{DrawContext, HoverState, StrokeStyle, TextAlign, Theme};
use crate::model::cell::{Cell, CellData, GraphKind, KindTag, Link};
use crate::model::Bounds;
use crate::view::sort::SortKey;

pub(super) fn register(registry: &mut CellRegistry) {
    registry.register(KindTag::Dropdown, Box::new(DropdownKind));
    registry.register(KindTag::MultiSelect, Box::new(MultiSelectKind));
    registry.register(KindTag::Tags, Box::new(TagsKind));
    registry.register(KindTag::Star, Box::new(StarKind));
    registry.register(KindTag::DatePicker, Box::new(DatePickerKind));
    registry.register(KindTag::Range, Box::new(RangeKind));
    registry.register(KindTag::Links, Box::new(LinksKind));
    registry.register(KindTag::Sparkline, Box::new(SparklineKind));
    registry.register(KindTag::TreeView, Box::new(TreeViewKind));
    registry.register(KindTag::Button, Box::new(ButtonKind));
    registry.register(KindTag::UserProfile, Box::new(UserProfileKind));
    registry.register(KindTag::Spinner, Box::new(SpinnerKind));
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Run data-shaped editor values back through the kind's domain rules via its copy text.
fn commit_checked(kind: &dyn CellKind, tag: KindTag, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
    match value {
        EditorValue::Text(text) => kind.paste(&text, cell),
        EditorValue::Data(data) if data.tag() == tag => {
            let candidate = cell.with_data(data);
            kind.paste(&kind.copy(&candidate), &candidate)
        }
        EditorValue::Data(_) => Err(EditError::WrongKind(tag)),
    }
}

fn not_editable() -> Result<Cell, EditError> {
    Err(EditError::ReadOnly)
}

pub struct DropdownKind;

impl CellKind for DropdownKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let mut m = measure_text(&self.copy(cell), theme);
        m.min_width += theme.line_height;
        m
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        draw_text(ctx, rect, &self.copy(cell), theme.text_dark, theme, TextAlign::Left);
        if hover.hovered {
            let cx = rect.x + rect.width - theme.cell_horizontal_padding - 4.0;
            let cy = rect.y + rect.height / 2.0;
            ctx.line((cx - 4.0, cy - 2.0), (cx, cy + 2.0), theme.text_medium);
            ctx.line((cx, cy + 2.0), (cx + 4.0, cy - 2.0), theme.text_medium);
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::Dropdown, cell.data.clone(), EditorPresentation::Dropdown))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::Dropdown, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Dropdown { value, .. } => value.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::Dropdown { allowed_values, allow_creation, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::Dropdown));
        };
        let text = text.trim();
        let mut allowed = allowed_values.clone();
        let value = if text.is_empty() {
            None
        } else if allowed.iter().any(|v| v == text) {
            Some(text.to_string())
        } else if *allow_creation {
            allowed.push(text.to_string());
            Some(text.to_string())
        } else {
            return Err(EditError::OutOfDomain(text.to_string()));
        };
        Ok(cell.with_data(CellData::Dropdown {
            value,
            allowed_values: allowed,
            allow_creation: *allow_creation,
        }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct MultiSelectKind;

impl CellKind for MultiSelectKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::MultiSelect { values, .. } = &cell.data else {
            return;
        };
        let mut x = rect.x + theme.cell_horizontal_padding;
        let h = rect.height - 2.0 * theme.cell_vertical_padding;
        for value in values {
            let w = text_width(value, theme) + theme.cell_horizontal_padding;
            if x + w > rect.x + rect.width {
                break;
            }
            let chip = Bounds::new(x, rect.y + theme.cell_vertical_padding, w, h);
            ctx.fill_rect(chip, theme.bg_bubble);
            ctx.text(chip, value, theme.text_dark, TextAlign::Center);
            x += w + 4.0;
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::MultiSelect, cell.data.clone(), EditorPresentation::Dropdown))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::MultiSelect, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::MultiSelect { values, .. } => values.join(","),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::MultiSelect { options, allow_creation, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::MultiSelect));
        };
        let mut options = options.clone();
        let mut values = Vec::new();
        for value in split_list(text) {
            if !options.contains(&value) {
                if !*allow_creation {
                    return Err(EditError::OutOfDomain(value));
                }
                options.push(value.clone());
            }
            if !values.contains(&value) {
                values.push(value);
            }
        }
        Ok(cell.with_data(CellData::MultiSelect {
            values,
            options,
            allow_creation: *allow_creation,
        }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct TagsKind;

impl CellKind for TagsKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        measure_text(&self.copy(cell), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::Tags { tags, possible_tags } = &cell.data else {
            return;
        };
        let mut x = rect.x + theme.cell_horizontal_padding;
        let h = rect.height - 2.0 * theme.cell_vertical_padding;
        for tag in tags {
            let color = possible_tags
                .iter()
                .find(|t| &t.tag == tag)
                .map(|t| t.color)
                .unwrap_or(theme.bg_bubble);
            let w = text_width(tag, theme) + theme.cell_horizontal_padding;
            if x + w > rect.x + rect.width {
                break;
            }
            let chip = Bounds::new(x, rect.y + theme.cell_vertical_padding, w, h);
            ctx.fill_rect(chip, color);
            ctx.text(chip, tag, theme.text_dark, TextAlign::Center);
            x += w + 4.0;
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::Tags, cell.data.clone(), EditorPresentation::Overlay))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::Tags, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Tags { tags, .. } => tags.join(","),
            _ => String::new(),
        }
    }

    /// Best effort: names outside the possible tags are dropped
    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::Tags { possible_tags, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::Tags));
        };
        let tags = split_list(text)
            .into_iter()
            .filter(|t| possible_tags.is_empty() || possible_tags.iter().any(|p| &p.tag == t))
            .collect();
        Ok(cell.with_data(CellData::Tags {
            tags,
            possible_tags: possible_tags.clone(),
        }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct StarKind;

impl CellKind for StarKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let max = match cell.data {
            CellData::Star { max, .. } => max,
            _ => 5,
        };
        Measure {
            min_width: max as f32 * theme.line_height + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::Star { rating, max } = cell.data else {
            return;
        };
        let size = theme.line_height.min(rect.height);
        let y = rect.y + (rect.height - size) / 2.0;
        for i in 0..max {
            let x = rect.x + theme.cell_horizontal_padding + i as f32 * size;
            let color = if i < rating { theme.accent_color } else { theme.text_light };
            ctx.text(Bounds::new(x, y, size, size), "★", color, TextAlign::Center);
        }
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::Star, cell.data.clone(), EditorPresentation::Overlay))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::Star, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match cell.data {
            CellData::Star { rating, .. } => rating.to_string(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::Star { max, .. } = cell.data else {
            return Err(EditError::WrongKind(KindTag::Star));
        };
        let text = text.trim();
        let rating = if text.is_empty() {
            0
        } else {
            text.parse::<u8>().map_err(|_| EditError::Parse(text.to_string()))?
        };
        if rating > max {
            return Err(EditError::OutOfDomain(text.to_string()));
        }
        Ok(cell.with_data(CellData::Star { rating, max }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        match cell.data {
            CellData::Star { rating, .. } => SortKey::Number(rating as f64),
            _ => SortKey::Empty,
        }
    }
}

pub struct DatePickerKind;

impl DatePickerKind {
    fn parse_date(text: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
                    .ok()
                    .map(|dt| dt.date())
            })
    }
}

impl CellKind for DatePickerKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        measure_text("0000-00-00", theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        draw_text(ctx, rect, &self.copy(cell), theme.text_dark, theme, TextAlign::Left);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::DatePicker, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::DatePicker, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match cell.data {
            CellData::DatePicker { date: Some(date), .. } => date.format(DATE_FORMAT).to_string(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::DatePicker { min, max, .. } = cell.data else {
            return Err(EditError::WrongKind(KindTag::DatePicker));
        };
        let text = text.trim();
        let date = if text.is_empty() {
            None
        } else {
            let date = Self::parse_date(text).ok_or_else(|| EditError::Parse(text.to_string()))?;
            let too_early = min.map_or(false, |m| date < m);
            let too_late = max.map_or(false, |m| date > m);
            if too_early || too_late {
                return Err(EditError::OutOfDomain(text.to_string()));
            }
            Some(date)
        };
        Ok(cell.with_data(CellData::DatePicker { date, min, max }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        match cell.data {
            CellData::DatePicker { date: Some(date), .. } => SortKey::Date(date),
            _ => SortKey::Empty,
        }
    }
}

pub struct RangeKind;

impl CellKind for RangeKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let mut m = measure_text(&self.copy(cell), theme);
        m.min_width += 60.0;
        m
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::Range { value, min, max, ref label, .. } = cell.data else {
            return;
        };
        let inner = rect.inset(theme.cell_horizontal_padding, rect.height / 2.0 - 2.0);
        let label = label.clone().unwrap_or_else(|| value.to_string());
        let label_w = text_width(&label, theme) + theme.cell_horizontal_padding;
        let track = Bounds::new(inner.x, inner.y, (inner.width - label_w).max(0.0), inner.height);
        let frac = if max > min { ((value - min) / (max - min)).clamp(0.0, 1.0) as f32 } else { 0.0 };
        ctx.fill_rect(track, theme.bg_cell_medium);
        ctx.fill_rect(Bounds::new(track.x, track.y, track.width * frac, track.height), theme.accent_color);
        draw_text(ctx, rect, &label, theme.text_medium, theme, TextAlign::Right);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::Range, cell.data.clone(), EditorPresentation::Overlay))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::Range, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match cell.data {
            CellData::Range { value, .. } => value.to_string(),
            _ => String::new(),
        }
    }

    /// Values outside `[min, max]` are rejected; others snap to the step grid.
    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::Range { min, max, step, ref label, .. } = cell.data else {
            return Err(EditError::WrongKind(KindTag::Range));
        };
        let raw = parse_numeric(text).ok_or_else(|| EditError::Parse(text.to_string()))?;
        if raw < min || raw > max {
            return Err(EditError::OutOfDomain(text.to_string()));
        }
        let value = if step > 0.0 {
            (min + ((raw - min) / step).round() * step).clamp(min, max)
        } else {
            raw
        };
        Ok(cell.with_data(CellData::Range {
            value,
            min,
            max,
            step,
            label: label.clone(),
        }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        match cell.data {
            CellData::Range { value, .. } => SortKey::Number(value),
            _ => SortKey::Empty,
        }
    }
}

pub struct LinksKind;

impl LinksKind {
    fn links(cell: &Cell) -> &[Link] {
        match &cell.data {
            CellData::Links(links) => links,
            _ => &[],
        }
    }

    /// `[title](href)`; `None` only if the pattern fails to compile
    fn pattern() -> Option<&'static Regex> {
        static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
        PATTERN
            .get_or_init(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").ok())
            .as_ref()
    }
}

impl CellKind for LinksKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let titles: Vec<&str> = Self::links(cell).iter().map(|l| l.title.as_str()).collect();
        measure_text(&titles.join(", "), theme)
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let titles: Vec<&str> = Self::links(cell).iter().map(|l| l.title.as_str()).collect();
        draw_text(ctx, rect, &titles.join(", "), theme.link_color, theme, TextAlign::Left);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::data(KindTag::Links, cell.data.clone(), EditorPresentation::Overlay))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::Links, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::links(cell)
            .iter()
            .map(|l| format!("[{}]({})", l.title, l.href))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// `[title](href)` entries; bare comma-separated URLs become links titled by their URL.
    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let text = text.trim();
        let mut links: Vec<Link> = Self::pattern()
            .map(|re| {
                re.captures_iter(text)
                    .map(|caps| Link {
                        title: caps[1].to_string(),
                        href: caps[2].to_string(),
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        if links.is_empty() {
            links = split_list(text)
                .into_iter()
                .map(|href| Link {
                    title: href.clone(),
                    href,
                })
                .collect();
        }
        Ok(cell.with_data(CellData::Links(links)))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        Self::links(cell)
            .first()
            .map(|l| SortKey::text(&l.title))
            .unwrap_or(SortKey::Empty)
    }
}

pub struct SparklineKind;

impl SparklineKind {
    fn values(cell: &Cell) -> &[f64] {
        match &cell.data {
            CellData::Sparkline { values, .. } => values,
            _ => &[],
        }
    }
}

impl CellKind for SparklineKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        Measure {
            min_width: 80.0 + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::Sparkline { values, y_axis, graph } = &cell.data else {
            return;
        };
        if values.is_empty() {
            return;
        }
        let (lo, hi) = y_axis.unwrap_or_else(|| {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
        });
        let span = if hi > lo { hi - lo } else { 1.0 };
        let inner = rect.inset(theme.cell_horizontal_padding, theme.cell_vertical_padding);
        let step = if values.len() > 1 { inner.width / (values.len() - 1) as f32 } else { 0.0 };
        let point = |i: usize, v: f64| {
            let frac = ((v - lo) / span).clamp(0.0, 1.0) as f32;
            (inner.x + i as f32 * step, inner.y + inner.height * (1.0 - frac))
        };

        match graph {
            GraphKind::Bar => {
                let bar_w = (inner.width / values.len() as f32 - 1.0).max(1.0);
                for (i, v) in values.iter().enumerate() {
                    let (_, y) = point(i, *v);
                    let x = inner.x + i as f32 * (bar_w + 1.0);
                    ctx.fill_rect(Bounds::new(x, y, bar_w, inner.y + inner.height - y), theme.accent_color);
                }
            }
            GraphKind::Line | GraphKind::Area => {
                for i in 1..values.len() {
                    ctx.line(point(i - 1, values[i - 1]), point(i, values[i]), theme.accent_color);
                }
                if *graph == GraphKind::Area {
                    ctx.fill_rect(inner, theme.accent_light);
                }
            }
        }
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        not_editable()
    }

    fn copy(&self, cell: &Cell) -> String {
        Self::values(cell).iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",")
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::Sparkline { y_axis, graph, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::Sparkline));
        };
        let values = split_list(text)
            .iter()
            .map(|s| s.parse::<f64>().map_err(|_| EditError::Parse(s.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cell.with_data(CellData::Sparkline {
            values,
            y_axis: *y_axis,
            graph: *graph,
        }))
    }

    /// Sparklines order by the mean of their series
    fn sort_key(&self, cell: &Cell) -> SortKey {
        let values = Self::values(cell);
        if values.is_empty() {
            return SortKey::Empty;
        }
        SortKey::Number(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub struct TreeViewKind;

impl CellKind for TreeViewKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let CellData::TreeView { text, depth, .. } = &cell.data else {
            return Measure::default();
        };
        let mut m = measure_text(text, theme);
        m.min_width += (*depth as f32 + 1.0) * theme.line_height;
        m
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::TreeView { text, depth, can_open, is_open } = &cell.data else {
            return;
        };
        let indent = *depth as f32 * theme.line_height;
        let x = rect.x + theme.cell_horizontal_padding + indent;
        if *can_open {
            let marker = if *is_open { "▾" } else { "▸" };
            ctx.text(Bounds::new(x, rect.y, theme.line_height, rect.height), marker, theme.text_medium, TextAlign::Center);
        }
        let offset = indent + theme.line_height;
        let text_rect = Bounds::new(rect.x + offset, rect.y, (rect.width - offset).max(0.0), rect.height);
        draw_text(ctx, text_rect, text, theme.text_dark, theme, TextAlign::Left);
    }

    /// Activation toggles an openable node
    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        let CellData::TreeView { text, depth, can_open, is_open } = &cell.data else {
            return None;
        };
        if !can_open {
            return None;
        }
        Some(EditorHandle::data(
            KindTag::TreeView,
            CellData::TreeView {
                text: text.clone(),
                depth: *depth,
                can_open: true,
                is_open: !is_open,
            },
            EditorPresentation::Immediate,
        ))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::TreeView, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::TreeView { text, depth, can_open, is_open } => {
                format!("{}|{}|{}|{}", text, depth, can_open, is_open)
            }
            _ => String::new(),
        }
    }

    /// Full `text|depth|canOpen|isOpen` records replace the node; bare text renames it.
    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::TreeView { depth, can_open, is_open, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::TreeView));
        };
        let parts: Vec<&str> = text.rsplitn(4, '|').collect();
        let data = if parts.len() == 4 {
            let parse_bool = |s: &str| match s.trim() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(EditError::Parse(text.to_string())),
            };
            CellData::TreeView {
                text: parts[3].to_string(),
                depth: parts[2].trim().parse().map_err(|_| EditError::Parse(text.to_string()))?,
                can_open: parse_bool(parts[1])?,
                is_open: parse_bool(parts[0])?,
            }
        } else {
            CellData::TreeView {
                text: text.to_string(),
                depth: *depth,
                can_open: *can_open,
                is_open: *is_open,
            }
        };
        Ok(cell.with_data(data))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        match &cell.data {
            CellData::TreeView { text, .. } => SortKey::text(text),
            _ => SortKey::Empty,
        }
    }
}

pub struct ButtonKind;

impl CellKind for ButtonKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let mut m = measure_text(&self.copy(cell), theme);
        m.min_width += 2.0 * theme.cell_horizontal_padding;
        m
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, hover: HoverState) {
        let button = rect.inset(theme.cell_horizontal_padding, theme.cell_vertical_padding);
        let bg = if hover.hovered { theme.accent_color } else { theme.bg_bubble };
        let fg = if hover.hovered { theme.accent_fg } else { theme.text_dark };
        ctx.fill_rect(button, bg);
        ctx.stroke_rect(button, theme.border_color, StrokeStyle::Solid);
        ctx.text(button, &self.copy(cell), fg, TextAlign::Center);
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        not_editable()
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::Button { title } => title.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, _text: &str, _cell: &Cell) -> Result<Cell, EditError> {
        not_editable()
    }
}

pub struct UserProfileKind;

impl CellKind for UserProfileKind {
    fn measure(&self, cell: &Cell, theme: &Theme) -> Measure {
        let mut m = measure_text(&self.copy(cell), theme);
        m.min_width += theme.line_height + 4.0;
        m
    }

    fn draw(&self, ctx: &mut dyn DrawContext, cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let CellData::UserProfile { name, initial, tint, image } = &cell.data else {
            return;
        };
        let size = theme.line_height.min(rect.height);
        let avatar = Bounds::new(
            rect.x + theme.cell_horizontal_padding,
            rect.y + (rect.height - size) / 2.0,
            size,
            size,
        );
        match image {
            Some(url) => ctx.image(avatar, url),
            None => {
                ctx.fill_rect(avatar, *tint);
                ctx.text(avatar, initial, theme.accent_fg, TextAlign::Center);
            }
        }
        let offset = size + 4.0;
        let text_rect = Bounds::new(rect.x + offset, rect.y, (rect.width - offset).max(0.0), rect.height);
        draw_text(ctx, text_rect, name, theme.text_dark, theme, TextAlign::Left);
    }

    fn begin_edit(&self, cell: &Cell) -> Option<EditorHandle> {
        Some(EditorHandle::text(KindTag::UserProfile, self.copy(cell)))
    }

    fn commit_edit(&self, cell: &Cell, value: EditorValue) -> Result<Cell, EditError> {
        commit_checked(self, KindTag::UserProfile, cell, value)
    }

    fn copy(&self, cell: &Cell) -> String {
        match &cell.data {
            CellData::UserProfile { name, .. } => name.clone(),
            _ => String::new(),
        }
    }

    fn paste(&self, text: &str, cell: &Cell) -> Result<Cell, EditError> {
        let CellData::UserProfile { tint, image, .. } = &cell.data else {
            return Err(EditError::WrongKind(KindTag::UserProfile));
        };
        let name = text.trim().to_string();
        let initial = name.chars().next().map(|c| c.to_uppercase().to_string()).unwrap_or_default();
        Ok(cell.with_data(CellData::UserProfile {
            name,
            initial,
            tint: *tint,
            image: image.clone(),
        }))
    }

    fn sort_key(&self, cell: &Cell) -> SortKey {
        SortKey::text(&self.copy(cell))
    }
}

pub struct SpinnerKind;

impl CellKind for SpinnerKind {
    fn measure(&self, _cell: &Cell, theme: &Theme) -> Measure {
        Measure {
            min_width: theme.line_height + 2.0 * theme.cell_horizontal_padding,
        }
    }

    fn draw(&self, ctx: &mut dyn DrawContext, _cell: &Cell, rect: Bounds, theme: &Theme, _hover: HoverState) {
        let size = theme.line_height.min(rect.height);
        let spot = Bounds::new(rect.x + (rect.width - size) / 2.0, rect.y + (rect.height - size) / 2.0, size, size);
        ctx.text(spot, "◌", theme.text_medium, TextAlign::Center);
    }

    fn begin_edit(&self, _cell: &Cell) -> Option<EditorHandle> {
        None
    }

    fn commit_edit(&self, _cell: &Cell, _value: EditorValue) -> Result<Cell, EditError> {
        not_editable()
    }

    fn copy(&self, _cell: &Cell) -> String {
        String::new()
    }

    fn paste(&self, _text: &str, _cell: &Cell) -> Result<Cell, EditError> {
        not_editable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_pattern_compiles_and_captures() {
        let re = LinksKind::pattern().unwrap();
        let caps = re.captures("[Docs](https://docs.rs)").unwrap();
        assert_eq!(&caps[1], "Docs");
        assert_eq!(&caps[2], "https://docs.rs");
    }
}
