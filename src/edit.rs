//! Edit & undo/redo pipeline.
//!
//! Every mutation builds new cells and records them in an [`UndoEntry`]; applying or
//! reverting an entry is a structural replacement on [`GridData`](crate::model::data::GridData).

pub mod batch;
pub mod editor;
pub mod entry;
pub mod history;

use crate::config::FlashTrigger;

pub use batch::{BooleanWords, Coercer, PasteOutcome, Validator};
pub use entry::{CellChange, EditBatch, UndoEntry};
pub use history::History;

/// What produced an undo entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSource {
    Edit,
    Paste,
    Fill,
    Clear,
    Cut,
    Action,
}

impl EditSource {
    /// Flash trigger an entry of this source fires when applied
    pub fn flash_trigger(&self) -> FlashTrigger {
        match self {
            EditSource::Paste | EditSource::Fill => FlashTrigger::Paste,
            EditSource::Edit | EditSource::Clear | EditSource::Cut | EditSource::Action => FlashTrigger::Edit,
        }
    }
}

#[cfg(test)]
mod test;
