//! Key codes, modifier masks and classified keyboard events
//!
//! Keys are identified by virtual key codes in the range 1-254. Modifier
//! state is a bitmask kept in the high bits so that a key code and its
//! active modifiers can be packed into a single combo code for lookups.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Virtual key code (1-254).
pub type KeyCode = u16;

/// Virtual key code constants for every key the sound map references.
pub mod vk {
    use super::KeyCode;

    pub const BACKSPACE: KeyCode = 8;
    pub const TAB: KeyCode = 9;
    pub const ENTER: KeyCode = 13;
    pub const CAPS_LOCK: KeyCode = 20;
    pub const ESC: KeyCode = 27;
    pub const SPACE: KeyCode = 32;
    pub const PAGE_UP: KeyCode = 33;
    pub const PAGE_DOWN: KeyCode = 34;
    pub const END: KeyCode = 35;
    pub const HOME: KeyCode = 36;
    pub const LEFT: KeyCode = 37;
    pub const UP: KeyCode = 38;
    pub const RIGHT: KeyCode = 39;
    pub const DOWN: KeyCode = 40;
    pub const INSERT: KeyCode = 45;
    pub const DELETE: KeyCode = 46;

    // Digit row (0-9)
    pub const DIGIT_0: KeyCode = 48;
    pub const DIGIT_1: KeyCode = 49;
    pub const DIGIT_2: KeyCode = 50;
    pub const DIGIT_3: KeyCode = 51;
    pub const DIGIT_4: KeyCode = 52;
    pub const DIGIT_5: KeyCode = 53;
    pub const DIGIT_6: KeyCode = 54;
    pub const DIGIT_7: KeyCode = 55;
    pub const DIGIT_8: KeyCode = 56;
    pub const DIGIT_9: KeyCode = 57;

    pub const A: KeyCode = 65;
    pub const C: KeyCode = 67;
    pub const L: KeyCode = 76;
    pub const V: KeyCode = 86;
    pub const Z: KeyCode = 90;

    pub const SUPER_L: KeyCode = 91;
    pub const SUPER_R: KeyCode = 92;
    pub const MENU: KeyCode = 93;

    // Numpad operators
    pub const NUMPAD_MUL: KeyCode = 106;
    pub const NUMPAD_ADD: KeyCode = 107;
    pub const NUMPAD_SUB: KeyCode = 109;
    pub const NUMPAD_DOT: KeyCode = 110;
    pub const NUMPAD_DIV: KeyCode = 111;

    pub const F12: KeyCode = 123;
    pub const NUM_LOCK: KeyCode = 144;

    pub const SHIFT_L: KeyCode = 160;
    pub const SHIFT_R: KeyCode = 161;
    pub const CTRL_L: KeyCode = 162;
    pub const CTRL_R: KeyCode = 163;
    pub const ALT_L: KeyCode = 164;
    pub const ALT_R: KeyCode = 165;

    // Punctuation (OEM keys)
    pub const SEMICOLON: KeyCode = 186;
    pub const EQUALS: KeyCode = 187;
    pub const COMMA: KeyCode = 188;
    pub const MINUS: KeyCode = 189;
    pub const PERIOD: KeyCode = 190;
    pub const SLASH: KeyCode = 191;
    pub const GRAVE: KeyCode = 192;
    pub const LEFT_BRACKET: KeyCode = 219;
    pub const BACKSLASH: KeyCode = 220;
    pub const RIGHT_BRACKET: KeyCode = 221;
    pub const APOSTROPHE: KeyCode = 222;
}

/// Bitmask of currently held modifier keys.
///
/// The bits live above the key code range so that `code | mask` forms a
/// collision-free combo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SUPER: Modifiers = Modifiers(1 << 8);
    pub const SHIFT: Modifiers = Modifiers(1 << 9);
    pub const CTRL: Modifiers = Modifiers(1 << 10);
    pub const ALT: Modifiers = Modifiers(1 << 11);

    /// The modifier bit contributed by a key code, if it is a modifier key.
    pub fn bit_for(code: KeyCode) -> Option<Modifiers> {
        match code {
            vk::SUPER_L | vk::SUPER_R => Some(Modifiers::SUPER),
            vk::SHIFT_L | vk::SHIFT_R => Some(Modifiers::SHIFT),
            vk::CTRL_L | vk::CTRL_R => Some(Modifiers::CTRL),
            vk::ALT_L | vk::ALT_R => Some(Modifiers::ALT),
            _ => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Modifiers) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Modifiers) {
        self.0 &= !other.0;
    }

    /// This mask with the bit belonging to `code` stripped, so that a
    /// modifier key never sees itself in its own events.
    pub fn without_own_bit(self, code: KeyCode) -> Modifiers {
        match Modifiers::bit_for(code) {
            Some(bit) => Modifiers(self.0 & !bit.0),
            None => self,
        }
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 & rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Modifiers::SUPER) {
            names.push("super");
        }
        if self.contains(Modifiers::SHIFT) {
            names.push("shift");
        }
        if self.contains(Modifiers::CTRL) {
            names.push("ctrl");
        }
        if self.contains(Modifiers::ALT) {
            names.push("alt");
        }
        if names.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", names.join("+"))
        }
    }
}

/// Combo code for a key plus its active modifiers.
pub type ComboCode = u16;

/// Build a combo code from a key code and a modifier mask.
pub fn combo(code: KeyCode, modifiers: Modifiers) -> ComboCode {
    code | modifiers.bits()
}

/// Super+L, the session lock shortcut. The OS stops delivering key-up
/// events once the session locks, so the classifier treats this combo
/// specially.
pub const LOCK_SHORTCUT: ComboCode = Modifiers::SUPER.0 | vk::L;

/// A raw physical key transition as delivered by the keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Down,
    Up,
}

/// Classified event kinds emitted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// First press of a key.
    Down,
    /// Key repeat while held.
    Type,
    /// Key released.
    Up,
}

/// A classified keyboard event.
///
/// `modifiers` is the live modifier mask minus the bit contributed by
/// `code` itself (pressing Shift alone is never "Shift+Shift").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: EventKind,
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Combo code used for combination-sensitive lookups.
    pub fn combo(&self) -> ComboCode {
        combo(self.code, self.modifiers)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}, {})", self.kind, self.code, self.modifiers)
    }
}
