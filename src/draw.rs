//! Abstract 2D drawing surface and theme palette.
//!
//! The engine never talks to a rendering backend directly. Cell kinds and the grid
//! painter emit primitive calls on a [`DrawContext`]; hosts implement it over a canvas,
//! GPU layer or terminal buffer.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GridError, Result};
use crate::model::Bounds;

/// Color that can be serialized/deserialized
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    /// Named color: "red", "blue", "cyan", etc.
    Named(NamedColor),
    /// RGB color: [255, 128, 0]
    Rgb([u8; 3]),
    /// RGBA color: [255, 128, 0, 64]
    Rgba([u8; 4]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    White,
    Transparent,
}

impl ThemeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        ThemeColor::Rgb([r, g, b])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        ThemeColor::Rgba([r, g, b, a])
    }

    /// Resolve to `[r, g, b, a]`
    pub fn to_rgba(self) -> [u8; 4] {
        match self {
            ThemeColor::Rgb([r, g, b]) => [r, g, b, 255],
            ThemeColor::Rgba(c) => c,
            ThemeColor::Named(n) => match n {
                NamedColor::Black => [0, 0, 0, 255],
                NamedColor::Red => [220, 50, 47, 255],
                NamedColor::Green => [74, 168, 74, 255],
                NamedColor::Yellow => [241, 196, 15, 255],
                NamedColor::Blue => [72, 105, 220, 255],
                NamedColor::Magenta => [190, 70, 190, 255],
                NamedColor::Cyan => [42, 161, 200, 255],
                NamedColor::Gray => [128, 128, 128, 255],
                NamedColor::White => [255, 255, 255, 255],
                NamedColor::Transparent => [0, 0, 0, 0],
            },
        }
    }

    /// Same color with alpha scaled by `factor` (0..=1).
    pub fn fade(self, factor: f32) -> Self {
        let [r, g, b, a] = self.to_rgba();
        let a = (a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        ThemeColor::Rgba([r, g, b, a])
    }
}

/// Complete grid palette and metrics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    pub accent_color: ThemeColor,
    pub accent_fg: ThemeColor,
    pub accent_light: ThemeColor,

    pub text_dark: ThemeColor,
    pub text_medium: ThemeColor,
    pub text_light: ThemeColor,
    pub text_header: ThemeColor,
    pub text_group_header: ThemeColor,

    pub bg_cell: ThemeColor,
    pub bg_cell_medium: ThemeColor,
    pub bg_header: ThemeColor,
    pub bg_header_has_focus: ThemeColor,
    pub bg_header_hovered: ThemeColor,
    pub bg_bubble: ThemeColor,
    pub bg_bubble_selected: ThemeColor,
    pub bg_search_result: ThemeColor,

    pub border_color: ThemeColor,
    pub drilldown_border: ThemeColor,
    pub link_color: ThemeColor,
    pub shadow_color: ThemeColor,
    pub flash_color: ThemeColor,

    // Metrics in pixels
    pub cell_horizontal_padding: f32,
    pub cell_vertical_padding: f32,
    /// Average advance of one display column of text
    pub char_width: f32,
    pub line_height: f32,

    #[serde(default)]
    pub show_grid: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            accent_color: ThemeColor::rgb(72, 105, 220),
            accent_fg: ThemeColor::rgb(255, 255, 255),
            accent_light: ThemeColor::rgba(72, 105, 220, 40),
            text_dark: ThemeColor::rgb(49, 51, 56),
            text_medium: ThemeColor::rgb(115, 116, 131),
            text_light: ThemeColor::rgb(179, 180, 191),
            text_header: ThemeColor::rgb(49, 51, 56),
            text_group_header: ThemeColor::rgb(115, 116, 131),
            bg_cell: ThemeColor::rgb(255, 255, 255),
            bg_cell_medium: ThemeColor::rgb(250, 250, 251),
            bg_header: ThemeColor::rgb(247, 247, 248),
            bg_header_has_focus: ThemeColor::rgb(233, 233, 235),
            bg_header_hovered: ThemeColor::rgb(239, 239, 241),
            bg_bubble: ThemeColor::rgb(237, 237, 243),
            bg_bubble_selected: ThemeColor::rgb(255, 255, 255),
            bg_search_result: ThemeColor::rgb(255, 249, 227),
            border_color: ThemeColor::rgba(115, 116, 131, 40),
            drilldown_border: ThemeColor::rgba(0, 0, 0, 20),
            link_color: ThemeColor::rgb(53, 83, 218),
            shadow_color: ThemeColor::rgba(0, 0, 0, 30),
            flash_color: ThemeColor::rgba(255, 210, 60, 160),
            cell_horizontal_padding: 8.0,
            cell_vertical_padding: 3.0,
            char_width: 7.5,
            line_height: 18.0,
            show_grid: true,
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            accent_color: ThemeColor::rgb(129, 145, 255),
            accent_fg: ThemeColor::rgb(255, 255, 255),
            accent_light: ThemeColor::rgba(129, 145, 255, 50),
            text_dark: ThemeColor::rgb(255, 255, 255),
            text_medium: ThemeColor::rgb(184, 184, 184),
            text_light: ThemeColor::rgb(163, 163, 163),
            text_header: ThemeColor::rgb(163, 163, 163),
            text_group_header: ThemeColor::rgb(184, 184, 184),
            bg_cell: ThemeColor::rgb(22, 22, 27),
            bg_cell_medium: ThemeColor::rgb(32, 32, 38),
            bg_header: ThemeColor::rgb(33, 33, 38),
            bg_header_has_focus: ThemeColor::rgb(48, 48, 56),
            bg_header_hovered: ThemeColor::rgb(43, 43, 50),
            bg_bubble: ThemeColor::rgb(33, 33, 38),
            bg_bubble_selected: ThemeColor::rgb(48, 48, 56),
            bg_search_result: ThemeColor::rgba(255, 241, 201, 40),
            border_color: ThemeColor::rgba(225, 226, 229, 26),
            drilldown_border: ThemeColor::rgba(225, 226, 229, 90),
            link_color: ThemeColor::rgb(129, 145, 255),
            shadow_color: ThemeColor::rgba(0, 0, 0, 90),
            flash_color: ThemeColor::rgba(255, 210, 60, 110),
            cell_horizontal_padding: 8.0,
            cell_vertical_padding: 3.0,
            char_width: 7.5,
            line_height: 18.0,
            show_grid: true,
        }
    }

    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
        toml::from_str(&content).map_err(|e| GridError::Config(format!("theme {}: {}", path.display(), e)))
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "light" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &["light", "dark"]
    }

    /// This theme with `over` layered on top.
    pub fn merged(&self, over: &ThemeOverride) -> Theme {
        let mut theme = self.clone();
        if let Some(c) = over.accent_color {
            theme.accent_color = c;
        }
        if let Some(c) = over.text_dark {
            theme.text_dark = c;
        }
        if let Some(c) = over.text_medium {
            theme.text_medium = c;
        }
        if let Some(c) = over.bg_cell {
            theme.bg_cell = c;
        }
        if let Some(c) = over.bg_header {
            theme.bg_header = c;
        }
        if let Some(c) = over.bg_bubble {
            theme.bg_bubble = c;
        }
        if let Some(c) = over.border_color {
            theme.border_color = c;
        }
        if let Some(c) = over.link_color {
            theme.link_color = c;
        }
        theme
    }
}

/// Partial theme attached to a cell or column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_dark: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_medium: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_cell: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_header: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_bubble: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<ThemeColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_color: Option<ThemeColor>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrokeStyle {
    Solid,
    Dashed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Pointer state handed to a cell while it is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverState {
    pub hovered: bool,
    /// Pointer position relative to the cell's top-left corner
    pub pos: Option<(f32, f32)>,
    pub selected: bool,
}

/// The drawing surface.
pub trait DrawContext {
    fn fill_rect(&mut self, bounds: Bounds, color: ThemeColor);
    fn stroke_rect(&mut self, bounds: Bounds, color: ThemeColor, style: StrokeStyle);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: ThemeColor);
    fn text(&mut self, bounds: Bounds, text: &str, color: ThemeColor, align: TextAlign);
    fn image(&mut self, bounds: Bounds, url: &str);
    /// Restrict subsequent drawing to `bounds` until [`DrawContext::unclip`].
    fn clip(&mut self, bounds: Bounds);
    fn unclip(&mut self);
}

/// One recorded primitive
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRect(Bounds, ThemeColor),
    StrokeRect(Bounds, ThemeColor, StrokeStyle),
    Line((f32, f32), (f32, f32), ThemeColor),
    Text(Bounds, String, ThemeColor, TextAlign),
    Image(Bounds, String),
    Clip(Bounds),
    Unclip,
}

/// A [`DrawContext`] that records every call. Used by tests and for replaying frames.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(_, text, _, _) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl DrawContext for DrawList {
    fn fill_rect(&mut self, bounds: Bounds, color: ThemeColor) {
        self.ops.push(DrawOp::FillRect(bounds, color));
    }

    fn stroke_rect(&mut self, bounds: Bounds, color: ThemeColor, style: StrokeStyle) {
        self.ops.push(DrawOp::StrokeRect(bounds, color, style));
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: ThemeColor) {
        self.ops.push(DrawOp::Line(from, to, color));
    }

    fn text(&mut self, bounds: Bounds, text: &str, color: ThemeColor, align: TextAlign) {
        self.ops.push(DrawOp::Text(bounds, text.to_string(), color, align));
    }

    fn image(&mut self, bounds: Bounds, url: &str) {
        self.ops.push(DrawOp::Image(bounds, url.to_string()));
    }

    fn clip(&mut self, bounds: Bounds) {
        self.ops.push(DrawOp::Clip(bounds));
    }

    fn unclip(&mut self) {
        self.ops.push(DrawOp::Unclip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_resolve() {
        assert_eq!(ThemeColor::Named(NamedColor::White).to_rgba(), [255, 255, 255, 255]);
        assert_eq!(ThemeColor::Named(NamedColor::Transparent).to_rgba()[3], 0);
    }

    #[test]
    fn fade_scales_alpha() {
        let c = ThemeColor::rgb(10, 20, 30).fade(0.5);
        assert_eq!(c.to_rgba(), [10, 20, 30, 128]);
    }

    #[test]
    fn merged_applies_only_set_fields() {
        let base = Theme::light();
        let over = ThemeOverride {
            bg_cell: Some(ThemeColor::rgb(1, 2, 3)),
            ..Default::default()
        };
        let merged = base.merged(&over);
        assert_eq!(merged.bg_cell, ThemeColor::rgb(1, 2, 3));
        assert_eq!(merged.text_dark, base.text_dark);
    }

    #[test]
    fn theme_round_trips_through_toml_file() {
        use std::io::Write;

        let theme = Theme::dark();
        let text = toml::to_string(&theme).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();

        let loaded = Theme::from_file(file.path()).unwrap();
        assert_eq!(loaded, theme);
    }

    #[test]
    fn by_name_is_case_insensitive() {
        assert_eq!(Theme::by_name("DARK").map(|t| t.name), Some("dark".to_string()));
        assert!(Theme::by_name("neon").is_none());
    }
}
