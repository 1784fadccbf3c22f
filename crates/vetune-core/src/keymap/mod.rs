//! Key Binding State Machine
//!
//! Resolves one key-down event into at most one [`TableOperation`]. Input is
//! ignored unless the table has focus, and a repeat of the same key inside
//! the debounce window is swallowed so held keys cannot run away with edits.
//!
//! | Key                  | Modifier | Operation              |
//! |----------------------|----------|------------------------|
//! | `=`                  |          | Set to                 |
//! | `,` `>`              |          | Increment              |
//! | `.` `<`              |          | Decrement              |
//! | `+` keypad `+`       |          | Increase by            |
//! | `-` keypad `-`       |          | Decrease by            |
//! | `*` keypad `*`       |          | Scale by               |
//! | `i`                  |          | Interpolate            |
//! | `h`                  |          | Interpolate Horizontal |
//! | `v`                  |          | Interpolate Vertical   |
//! | `s`                  |          | Smooth Cells           |
//! | `f`                  |          | Fill Up+Right          |
//! | `c`                  | Ctrl     | Copy                   |
//! | `v`                  | Ctrl     | Paste                  |

mod key;

pub use key::{Key, Modifiers};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::engine::{OperationParams, TableOperation};

/// Default debounce window for repeated keys
pub const REPEAT_WINDOW: Duration = Duration::from_millis(150);

/// Per-session key handling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindingState {
    /// Ctrl currently held
    pub ctrl_pressed: bool,
    /// Shift currently held
    pub shift_pressed: bool,
    /// Alt currently held
    pub alt_pressed: bool,
    /// Last accepted non-modifier key
    pub last_key: Option<Key>,
    /// When `last_key` was accepted
    #[serde(skip)]
    pub last_key_time: Option<Instant>,
    /// Step for Increment/Decrement
    pub increment_amount: f64,
    /// Percentage for Scale By
    pub percent_increment: f64,
    /// Whether repeats inside `repeat_window` are dropped
    pub repeat_suppression: bool,
    /// Repeat suppression window
    pub repeat_window: Duration,
    table_focused: bool,
}

impl Default for KeyBindingState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBindingState {
    /// Unfocused state with default increments
    pub fn new() -> Self {
        let params = OperationParams::default();
        Self {
            ctrl_pressed: false,
            shift_pressed: false,
            alt_pressed: false,
            last_key: None,
            last_key_time: None,
            increment_amount: params.increment_amount,
            percent_increment: params.percent_increment,
            repeat_suppression: true,
            repeat_window: REPEAT_WINDOW,
            table_focused: false,
        }
    }

    /// Set by the UI when the table view gains or loses input focus
    pub fn set_table_focused(&mut self, focused: bool) {
        self.table_focused = focused;
    }

    /// Whether keys are currently processed
    pub fn is_table_focused(&self) -> bool {
        self.table_focused
    }

    /// Step sizes for the engine
    pub fn params(&self) -> OperationParams {
        OperationParams {
            increment_amount: self.increment_amount,
            percent_increment: self.percent_increment,
        }
    }

    /// Resolve a key-down event using the current time
    pub fn process_key(&mut self, key: Key, modifiers: Modifiers) -> Option<TableOperation> {
        self.process_key_at(key, modifiers, Instant::now())
    }

    /// Resolve a key-down event seen at `now`
    pub fn process_key_at(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        now: Instant,
    ) -> Option<TableOperation> {
        if !self.table_focused {
            return None;
        }

        self.ctrl_pressed = modifiers.ctrl;
        self.shift_pressed = modifiers.shift;
        self.alt_pressed = modifiers.alt;

        if key.is_modifier() {
            return None;
        }

        let key = key.normalized();
        if self.is_repeat(key, now) {
            tracing::debug!("Suppressed repeat of {:?}", key);
            return None;
        }
        self.last_key = Some(key);
        self.last_key_time = Some(now);

        map_key(key, modifiers)
    }

    /// Forget the last accepted key so the next press is never debounced
    pub fn reset_repeat(&mut self) {
        self.last_key = None;
        self.last_key_time = None;
    }

    fn is_repeat(&self, key: Key, now: Instant) -> bool {
        if !self.repeat_suppression || self.last_key != Some(key) {
            return false;
        }
        self.last_key_time
            .is_some_and(|last| now.saturating_duration_since(last) < self.repeat_window)
    }
}

/// Static chord table
fn map_key(key: Key, modifiers: Modifiers) -> Option<TableOperation> {
    if modifiers.ctrl {
        return match key {
            Key::Char('c') => Some(TableOperation::Copy),
            Key::Char('v') => Some(TableOperation::Paste),
            _ => None,
        };
    }

    match key {
        Key::Char('=') => Some(TableOperation::SetTo),
        Key::Char(',') | Key::Char('>') => Some(TableOperation::Increment),
        Key::Char('.') | Key::Char('<') => Some(TableOperation::Decrement),
        Key::Char('+') | Key::KeypadPlus => Some(TableOperation::IncreaseBy),
        Key::Char('-') | Key::KeypadMinus => Some(TableOperation::DecreaseBy),
        Key::Char('*') | Key::KeypadMultiply => Some(TableOperation::ScaleBy),
        Key::Char('i') => Some(TableOperation::Interpolate),
        Key::Char('h') => Some(TableOperation::InterpolateHorizontal),
        Key::Char('v') => Some(TableOperation::InterpolateVertical),
        Key::Char('s') => Some(TableOperation::SmoothCells),
        Key::Char('f') => Some(TableOperation::FillUpRight),
        _ => None,
    }
}
