use std::collections::VecDeque;

use tracing::debug;

use super::entry::UndoEntry;

/// Manages undo/redo history, bounded to `max_steps` entries
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_steps: usize,
}

impl History {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    /// Record an entry (clears redo stack). The oldest entries are evicted past the limit.
    pub fn record(&mut self, entry: UndoEntry) {
        self.redo_stack.clear();
        if self.max_steps == 0 {
            return;
        }
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.pop_front();
            debug!(max_steps = self.max_steps, "undo history full, evicted oldest entry");
        }
    }

    /// Undo the last entry, returns the inverse for application
    pub fn undo(&mut self) -> Option<UndoEntry> {
        self.undo_stack.pop_back().map(|entry| {
            let inverse = entry.inverse();
            self.redo_stack.push(entry);
            inverse
        })
    }

    /// Redo the last undone entry
    pub fn redo(&mut self) -> Option<UndoEntry> {
        self.redo_stack.pop().map(|entry| {
            self.undo_stack.push_back(entry.clone());
            entry
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
        while self.undo_stack.len() > max_steps {
            self.undo_stack.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
