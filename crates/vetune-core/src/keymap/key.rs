//! Toolkit-neutral key codes and modifier masks

use serde::{Deserialize, Serialize};

/// A physical or logical key as reported by the windowing layer
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Printable character (already shifted by the layout, e.g. `>` or `+`)
    Char(char),
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    Up,
    Down,
    Left,
    Right,
    Tab,
    Escape,
    Enter,
    Delete,
    Backspace,
    LeftCtrl,
    RightCtrl,
    LeftShift,
    RightShift,
    LeftAlt,
    RightAlt,
    /// F1..F24
    Function(u8),
    /// Anything else, by raw scan code
    Other(u32),
}

impl Key {
    /// Whether this key is only a modifier
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Key::LeftCtrl
                | Key::RightCtrl
                | Key::LeftShift
                | Key::RightShift
                | Key::LeftAlt
                | Key::RightAlt
        )
    }

    /// Character keys folded to ASCII lowercase; other keys unchanged
    pub fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// Modifier state accompanying a key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Either Ctrl key held
    pub ctrl: bool,
    /// Either Shift key held
    pub shift: bool,
    /// Either Alt key held
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    /// Ctrl only
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        alt: false,
    };

    /// Shift only
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        shift: true,
        alt: false,
    };

    /// Whether no modifier is held
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.shift && !self.alt
    }
}
