//! Error types for the grid engine.
//!
//! Only configuration contradictions and host-boundary failures are errors.
//! Rejected edits and pastes are ordinary values (see [`crate::kinds::EditError`]).

use std::path::PathBuf;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("grid has no columns")]
    NoColumns,

    #[error("duplicate column id '{0}'")]
    DuplicateColumnId(String),

    #[error("row {row} has {found} cells, expected {expected}")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot freeze {frozen} columns in a grid of {columns}")]
    FrozenColumns { frozen: usize, columns: usize },

    #[error("minimum column width {min} exceeds maximum {max}")]
    ColumnWidthBounds { min: f32, max: f32 },

    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl GridError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
