use std::fmt;

use chrono::NaiveDate;

use crate::draw::{ThemeColor, ThemeOverride};

/// Discriminant of [`CellData`], used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KindTag {
    Text,
    Number,
    Boolean,
    Markdown,
    Uri,
    Image,
    Bubble,
    Drilldown,
    RowId,
    Protected,
    Loading,
    Dropdown,
    MultiSelect,
    Tags,
    Star,
    DatePicker,
    Range,
    Links,
    Sparkline,
    TreeView,
    Button,
    UserProfile,
    Spinner,
    Unknown,
}

impl KindTag {
    pub const ALL: [KindTag; 24] = [
        KindTag::Text,
        KindTag::Number,
        KindTag::Boolean,
        KindTag::Markdown,
        KindTag::Uri,
        KindTag::Image,
        KindTag::Bubble,
        KindTag::Drilldown,
        KindTag::RowId,
        KindTag::Protected,
        KindTag::Loading,
        KindTag::Dropdown,
        KindTag::MultiSelect,
        KindTag::Tags,
        KindTag::Star,
        KindTag::DatePicker,
        KindTag::Range,
        KindTag::Links,
        KindTag::Sparkline,
        KindTag::TreeView,
        KindTag::Button,
        KindTag::UserProfile,
        KindTag::Spinner,
        KindTag::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KindTag::Text => "text",
            KindTag::Number => "number",
            KindTag::Boolean => "boolean",
            KindTag::Markdown => "markdown",
            KindTag::Uri => "uri",
            KindTag::Image => "image",
            KindTag::Bubble => "bubble",
            KindTag::Drilldown => "drilldown",
            KindTag::RowId => "rowid",
            KindTag::Protected => "protected",
            KindTag::Loading => "loading",
            KindTag::Dropdown => "dropdown",
            KindTag::MultiSelect => "multi-select",
            KindTag::Tags => "tags",
            KindTag::Star => "star",
            KindTag::DatePicker => "date-picker",
            KindTag::Range => "range",
            KindTag::Links => "links",
            KindTag::Sparkline => "sparkline",
            KindTag::TreeView => "tree-view",
            KindTag::Button => "button",
            KindTag::UserProfile => "user-profile",
            KindTag::Spinner => "spinner",
            KindTag::Unknown => "unknown",
        }
    }

    /// Parse a kind name. Unrecognised names map to `Unknown`.
    pub fn parse(s: &str) -> KindTag {
        KindTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == s)
            .unwrap_or(KindTag::Unknown)
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrilldownItem {
    pub text: String,
    pub img: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagOption {
    pub tag: String,
    pub color: ThemeColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub title: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Line,
    Area,
    Bar,
}

/// Kind-specific raw data of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Text(String),
    Number(Option<f64>),
    Boolean(Option<bool>),
    Markdown(String),
    Uri(String),
    Image(Vec<String>),
    Bubble(Vec<String>),
    Drilldown(Vec<DrilldownItem>),
    RowId(String),
    Protected,
    Loading,
    Dropdown {
        value: Option<String>,
        allowed_values: Vec<String>,
        allow_creation: bool,
    },
    MultiSelect {
        values: Vec<String>,
        options: Vec<String>,
        allow_creation: bool,
    },
    Tags {
        tags: Vec<String>,
        possible_tags: Vec<TagOption>,
    },
    Star {
        rating: u8,
        max: u8,
    },
    DatePicker {
        date: Option<NaiveDate>,
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    Range {
        value: f64,
        min: f64,
        max: f64,
        step: f64,
        label: Option<String>,
    },
    Links(Vec<Link>),
    Sparkline {
        values: Vec<f64>,
        y_axis: Option<(f64, f64)>,
        graph: GraphKind,
    },
    TreeView {
        text: String,
        depth: usize,
        can_open: bool,
        is_open: bool,
    },
    Button {
        title: String,
    },
    UserProfile {
        name: String,
        initial: String,
        tint: ThemeColor,
        image: Option<String>,
    },
    Spinner,
    /// A kind name this engine does not know. Renders empty and cannot be selected.
    Unknown(String),
}

impl CellData {
    pub fn tag(&self) -> KindTag {
        match self {
            CellData::Text(_) => KindTag::Text,
            CellData::Number(_) => KindTag::Number,
            CellData::Boolean(_) => KindTag::Boolean,
            CellData::Markdown(_) => KindTag::Markdown,
            CellData::Uri(_) => KindTag::Uri,
            CellData::Image(_) => KindTag::Image,
            CellData::Bubble(_) => KindTag::Bubble,
            CellData::Drilldown(_) => KindTag::Drilldown,
            CellData::RowId(_) => KindTag::RowId,
            CellData::Protected => KindTag::Protected,
            CellData::Loading => KindTag::Loading,
            CellData::Dropdown { .. } => KindTag::Dropdown,
            CellData::MultiSelect { .. } => KindTag::MultiSelect,
            CellData::Tags { .. } => KindTag::Tags,
            CellData::Star { .. } => KindTag::Star,
            CellData::DatePicker { .. } => KindTag::DatePicker,
            CellData::Range { .. } => KindTag::Range,
            CellData::Links(_) => KindTag::Links,
            CellData::Sparkline { .. } => KindTag::Sparkline,
            CellData::TreeView { .. } => KindTag::TreeView,
            CellData::Button { .. } => KindTag::Button,
            CellData::UserProfile { .. } => KindTag::UserProfile,
            CellData::Spinner => KindTag::Spinner,
            CellData::Unknown(_) => KindTag::Unknown,
        }
    }
}

/// A grid cell. Cells are values: edits build a new `Cell` rather than mutating one in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub data: CellData,
    /// Presentation override. Never consulted for copy, sort, filter or paste.
    pub display_data: Option<String>,
    /// Whether the cell may be edited in place.
    pub allow_overlay: bool,
    /// Inclusive horizontal merge `(start_col, end_col)`.
    pub span: Option<(usize, usize)>,
    pub theme_override: Option<ThemeOverride>,
}

impl Cell {
    pub fn new(data: CellData) -> Self {
        let allow_overlay = !matches!(
            data,
            CellData::Protected | CellData::Loading | CellData::Spinner | CellData::RowId(_) | CellData::Unknown(_)
        );
        Self {
            data,
            display_data: None,
            allow_overlay,
            span: None,
            theme_override: None,
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::new(CellData::Text(s.into()))
    }

    pub fn number(n: f64) -> Self {
        Self::new(CellData::Number(Some(n)))
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(CellData::Boolean(Some(b)))
    }

    pub fn loading() -> Self {
        Self::new(CellData::Loading)
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_data = Some(display.into());
        self
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some((start, end));
        self
    }

    pub fn read_only(mut self) -> Self {
        self.allow_overlay = false;
        self
    }

    pub fn with_theme(mut self, theme: ThemeOverride) -> Self {
        self.theme_override = Some(theme);
        self
    }

    /// Same presentation settings, different data.
    pub fn with_data(&self, data: CellData) -> Self {
        Self {
            data,
            display_data: None,
            allow_overlay: self.allow_overlay,
            span: self.span,
            theme_override: self.theme_override.clone(),
        }
    }

    pub fn kind(&self) -> KindTag {
        self.data.tag()
    }

    pub fn is_selectable(&self) -> bool {
        self.kind() != KindTag::Unknown
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::text("")
    }
}
