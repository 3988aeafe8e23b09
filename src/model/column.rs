use crate::draw::ThemeOverride;

/// How a column's width is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    Fixed(f32),
    /// Measured from sampled content, see [`crate::viewport::widths::ColumnWidths`].
    Auto,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Unique identity of the column
    pub id: String,
    pub title: String,
    pub width: ColumnWidth,
    pub group: Option<String>,
    pub sortable: bool,
    pub filterable: bool,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub theme_override: Option<ThemeOverride>,
}

impl Column {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            title: id.clone(),
            id,
            width: ColumnWidth::Auto,
            group: None,
            sortable: true,
            filterable: true,
            min_width: None,
            max_width: None,
            theme_override: None,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Clamp `width` to the column's own bounds, falling back to the grid-wide ones.
    pub fn clamp_width(&self, width: f32, grid_min: f32, grid_max: f32) -> f32 {
        let min = self.min_width.unwrap_or(grid_min);
        let max = self.max_width.unwrap_or(grid_max).max(min);
        width.clamp(min, max)
    }
}
