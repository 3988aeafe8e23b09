use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Modifier keys held during a key press or pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl, or Cmd on macOS hosts
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
        alt: false,
    };

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl KeyPress {
    pub fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }

    /// The character this press would type into an editor, if any.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if !self.mods.ctrl && !self.mods.alt && !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// A keyboard action the grid understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shortcut {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    JumpUp,
    JumpDown,
    JumpLeft,
    JumpRight,
    RowStart,
    RowEnd,
    FirstCell,
    LastCell,
    PageUp,
    PageDown,
    NextCell,
    PrevCell,
    ExtendUp,
    ExtendDown,
    ExtendLeft,
    ExtendRight,
    Activate,
    Cancel,
    SelectAll,
    SelectRow,
    SelectColumn,
    Clear,
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    FillDown,
    FillRight,
    Search,
}

/// Per-shortcut enable flags. Shortcuts not listed are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keybindings {
    overrides: BTreeMap<Shortcut, bool>,
}

impl Keybindings {
    pub fn enabled(&self, shortcut: Shortcut) -> bool {
        self.overrides.get(&shortcut).copied().unwrap_or(true)
    }

    pub fn set(&mut self, shortcut: Shortcut, enabled: bool) {
        self.overrides.insert(shortcut, enabled);
    }
}

/// Maps key presses to shortcuts.
#[derive(Debug, Clone)]
pub struct ShortcutTable {
    map: HashMap<KeyPress, Shortcut>,
}

impl ShortcutTable {
    pub fn new(map: HashMap<KeyPress, Shortcut>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: KeyPress) -> Option<Shortcut> {
        self.map.get(&key).copied()
    }

    /// Resolve `key`, dropping shortcuts the bindings disable.
    pub fn resolve(&self, key: KeyPress, bindings: &Keybindings) -> Option<Shortcut> {
        self.get(key).filter(|s| bindings.enabled(*s))
    }
}

impl Default for ShortcutTable {
    fn default() -> Self {
        use KeyCode::*;
        let none = Modifiers::NONE;
        let shift = Modifiers::SHIFT;
        let ctrl = Modifiers::CTRL;
        let ctrl_shift = Modifiers::CTRL_SHIFT;
        let k = KeyPress::new;

        Self {
            map: HashMap::from([
                (k(Up, none), Shortcut::MoveUp),
                (k(Down, none), Shortcut::MoveDown),
                (k(Left, none), Shortcut::MoveLeft),
                (k(Right, none), Shortcut::MoveRight),
                (k(Up, ctrl), Shortcut::JumpUp),
                (k(Down, ctrl), Shortcut::JumpDown),
                (k(Left, ctrl), Shortcut::JumpLeft),
                (k(Right, ctrl), Shortcut::JumpRight),
                (k(Home, none), Shortcut::RowStart),
                (k(End, none), Shortcut::RowEnd),
                (k(Home, ctrl), Shortcut::FirstCell),
                (k(End, ctrl), Shortcut::LastCell),
                (k(PageUp, none), Shortcut::PageUp),
                (k(PageDown, none), Shortcut::PageDown),
                (k(Tab, none), Shortcut::NextCell),
                (k(Tab, shift), Shortcut::PrevCell),
                (k(Up, shift), Shortcut::ExtendUp),
                (k(Down, shift), Shortcut::ExtendDown),
                (k(Left, shift), Shortcut::ExtendLeft),
                (k(Right, shift), Shortcut::ExtendRight),
                (k(Enter, none), Shortcut::Activate),
                (k(F(2), none), Shortcut::Activate),
                (k(Escape, none), Shortcut::Cancel),
                (k(Char('a'), ctrl), Shortcut::SelectAll),
                (k(Char(' '), shift), Shortcut::SelectRow),
                (k(Char(' '), ctrl), Shortcut::SelectColumn),
                (k(Delete, none), Shortcut::Clear),
                (k(Backspace, none), Shortcut::Clear),
                (k(Char('c'), ctrl), Shortcut::Copy),
                (k(Char('x'), ctrl), Shortcut::Cut),
                (k(Char('v'), ctrl), Shortcut::Paste),
                (k(Char('z'), ctrl), Shortcut::Undo),
                (k(Char('z'), ctrl_shift), Shortcut::Redo),
                (k(Char('Z'), ctrl_shift), Shortcut::Redo),
                (k(Char('y'), ctrl), Shortcut::Redo),
                (k(Char('d'), ctrl), Shortcut::FillDown),
                (k(Char('r'), ctrl), Shortcut::FillRight),
                (k(Char('f'), ctrl), Shortcut::Search),
            ]),
        }
    }
}
