//! Editor activation and the single open editor.

use crate::config::{ActivationBehavior, EditorScrollBehavior};
use crate::kinds::{EditorHandle, EditorPresentation, EditorValue};
use crate::model::cell::Cell;
use crate::model::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Single,
    Double,
}

/// Whether a click on a cell opens its editor.
pub fn should_activate(behavior: ActivationBehavior, already_focused: bool, click: ClickKind) -> bool {
    match behavior {
        ActivationBehavior::SingleClick => true,
        ActivationBehavior::SecondClick => already_focused || click == ClickKind::Double,
        ActivationBehavior::DoubleClick => click == ClickKind::Double,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollResponse {
    /// Scroll and keep the editor
    Allow,
    /// Scroll and discard the editor
    Close,
    /// Ignore the scroll
    Block,
}

pub fn on_scroll(behavior: EditorScrollBehavior, presentation: EditorPresentation) -> ScrollResponse {
    match behavior {
        EditorScrollBehavior::KeepOpen => ScrollResponse::Allow,
        EditorScrollBehavior::CloseDropdownOnly if presentation == EditorPresentation::Dropdown => {
            ScrollResponse::Close
        }
        EditorScrollBehavior::CloseDropdownOnly => ScrollResponse::Allow,
        EditorScrollBehavior::CloseOverlay => ScrollResponse::Close,
        EditorScrollBehavior::LockScroll => ScrollResponse::Block,
    }
}

/// An open editor. `item` is the display cell, `logical` the cell it will write.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub item: Item,
    pub logical: Item,
    pub handle: EditorHandle,
    pub original: Cell,
}

impl EditSession {
    pub fn presentation(&self) -> EditorPresentation {
        self.handle.presentation
    }

    pub fn value(&self) -> &EditorValue {
        &self.handle.value
    }

    pub fn text(&self) -> Option<&str> {
        match &self.handle.value {
            EditorValue::Text(s) => Some(s),
            EditorValue::Data(_) => None,
        }
    }

    pub fn set_value(&mut self, value: EditorValue) {
        self.handle.value = value;
    }

    pub fn push_char(&mut self, c: char) {
        if let EditorValue::Text(s) = &mut self.handle.value {
            s.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let EditorValue::Text(s) = &mut self.handle.value {
            s.pop();
        }
    }
}

/// Holds at most one open editor.
#[derive(Debug, Default)]
pub struct Editor {
    session: Option<EditSession>,
}

impl Editor {
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Open `session`, handing back any editor it displaces so the caller can commit it.
    pub fn open(&mut self, session: EditSession) -> Option<EditSession> {
        self.session.replace(session)
    }

    pub fn close(&mut self) -> Option<EditSession> {
        self.session.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cell::KindTag;

    fn session(col: usize) -> EditSession {
        EditSession {
            item: Item::new(col, 0),
            logical: Item::new(col, 0),
            handle: EditorHandle::text(KindTag::Text, "ab"),
            original: Cell::text("ab"),
        }
    }

    #[test]
    fn test_activation_policies() {
        use ActivationBehavior::*;
        assert!(should_activate(SingleClick, false, ClickKind::Single));
        assert!(!should_activate(SecondClick, false, ClickKind::Single));
        assert!(should_activate(SecondClick, true, ClickKind::Single));
        assert!(!should_activate(DoubleClick, true, ClickKind::Single));
        assert!(should_activate(DoubleClick, false, ClickKind::Double));
    }

    #[test]
    fn test_scroll_policies() {
        use EditorPresentation::*;
        assert_eq!(on_scroll(EditorScrollBehavior::KeepOpen, Overlay), ScrollResponse::Allow);
        assert_eq!(on_scroll(EditorScrollBehavior::CloseDropdownOnly, Overlay), ScrollResponse::Allow);
        assert_eq!(on_scroll(EditorScrollBehavior::CloseDropdownOnly, Dropdown), ScrollResponse::Close);
        assert_eq!(on_scroll(EditorScrollBehavior::CloseOverlay, Overlay), ScrollResponse::Close);
        assert_eq!(on_scroll(EditorScrollBehavior::LockScroll, Dropdown), ScrollResponse::Block);
    }

    #[test]
    fn test_only_one_editor_open() {
        let mut editor = Editor::default();
        assert!(editor.open(session(0)).is_none());
        let displaced = editor.open(session(1)).unwrap();
        assert_eq!(displaced.item, Item::new(0, 0));
        assert_eq!(editor.session().map(|s| s.item), Some(Item::new(1, 0)));
    }

    #[test]
    fn test_text_editing() {
        let mut s = session(0);
        s.push_char('c');
        assert_eq!(s.text(), Some("abc"));
        s.backspace();
        s.backspace();
        assert_eq!(s.text(), Some("a"));
    }
}
