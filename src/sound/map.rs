//! Key to sound cue mapping
//!
//! Two fixed tables, built once from const entries:
//! - a modifier-insensitive table keyed by key code alone (highest
//!   priority; modifiers, navigation, punctuation keys sound the same
//!   regardless of what else is held)
//! - a combination table keyed by combo code (Ctrl+C, Shift+digit, the
//!   lock shortcut)
//! Anything unmapped falls back to the default typing cue.

use crate::event::{vk, ComboCode, KeyCode, KeyEvent, Modifiers, LOCK_SHORTCUT};
use crate::sound::bank::CueKind;
use std::collections::HashMap;

const SHIFT: u16 = Modifiers::SHIFT.bits();
const CTRL: u16 = Modifiers::CTRL.bits();

/// Modifier-insensitive entries: key code → cue.
const IGNORE_MODIFIER_CUES: &[(KeyCode, CueKind)] = &[
    (vk::SHIFT_L, CueKind::Shift),
    (vk::SHIFT_R, CueKind::Shift),
    (vk::CTRL_L, CueKind::Control),
    (vk::CTRL_R, CueKind::Control),
    (vk::ALT_L, CueKind::Control),
    (vk::ALT_R, CueKind::Control),
    (vk::CAPS_LOCK, CueKind::Control),
    (vk::INSERT, CueKind::Control),
    (vk::MENU, CueKind::Control),
    (vk::NUM_LOCK, CueKind::Control),
    (vk::TAB, CueKind::Enter),
    (vk::ENTER, CueKind::Enter),
    (vk::ESC, CueKind::Esc),
    (vk::SUPER_L, CueKind::Super),
    (vk::SUPER_R, CueKind::Super),
    (vk::BACKSPACE, CueKind::Delete),
    (vk::DELETE, CueKind::Delete),
    (vk::PAGE_UP, CueKind::Forward),
    (vk::PAGE_DOWN, CueKind::Forward),
    (vk::END, CueKind::Forward),
    (vk::HOME, CueKind::Forward),
    (vk::LEFT, CueKind::ArrowLeft),
    (vk::UP, CueKind::ArrowUp),
    (vk::RIGHT, CueKind::ArrowRight),
    (vk::DOWN, CueKind::ArrowDown),
    (vk::SPACE, CueKind::Symbol),
    (vk::GRAVE, CueKind::Symbol),
    (vk::MINUS, CueKind::Symbol),
    (vk::EQUALS, CueKind::Symbol),
    (vk::BACKSLASH, CueKind::Symbol),
    (vk::SEMICOLON, CueKind::Symbol),
    (vk::APOSTROPHE, CueKind::Symbol),
    (vk::COMMA, CueKind::Symbol),
    (vk::PERIOD, CueKind::Symbol),
    (vk::SLASH, CueKind::Symbol),
    (vk::NUMPAD_DIV, CueKind::Symbol),
    (vk::NUMPAD_MUL, CueKind::Symbol),
    (vk::NUMPAD_SUB, CueKind::Symbol),
    (vk::NUMPAD_ADD, CueKind::Symbol),
    (vk::NUMPAD_DOT, CueKind::Symbol),
    (vk::LEFT_BRACKET, CueKind::Bracket),
    (vk::RIGHT_BRACKET, CueKind::Bracket),
];

/// Combination entries: combo code → cue.
const COMBO_CUES: &[(ComboCode, CueKind)] = &[
    // Shift + digit row symbols (!@#$%^&*)
    (SHIFT | vk::DIGIT_1, CueKind::Symbol),
    (SHIFT | vk::DIGIT_2, CueKind::Symbol),
    (SHIFT | vk::DIGIT_3, CueKind::Symbol),
    (SHIFT | vk::DIGIT_4, CueKind::Symbol),
    (SHIFT | vk::DIGIT_5, CueKind::Symbol),
    (SHIFT | vk::DIGIT_6, CueKind::Symbol),
    (SHIFT | vk::DIGIT_7, CueKind::Symbol),
    (SHIFT | vk::DIGIT_8, CueKind::Symbol),
    // Parentheses
    (SHIFT | vk::DIGIT_9, CueKind::ShiftBracket),
    (SHIFT | vk::DIGIT_0, CueKind::ShiftBracket),
    (LOCK_SHORTCUT, CueKind::Locked),
    (CTRL | vk::C, CueKind::Copy),
    (CTRL | SHIFT | vk::C, CueKind::Copy),
    (CTRL | vk::V, CueKind::Paste),
    (CTRL | SHIFT | vk::V, CueKind::Paste),
    (CTRL | vk::Z, CueKind::Undo),
    (CTRL | SHIFT | vk::Z, CueKind::Undo),
];

/// Compiled lookup tables.
pub struct SoundMap {
    ignore_modifiers: HashMap<KeyCode, CueKind>,
    combos: HashMap<ComboCode, CueKind>,
}

impl Default for SoundMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundMap {
    pub fn new() -> Self {
        SoundMap {
            ignore_modifiers: IGNORE_MODIFIER_CUES.iter().copied().collect(),
            combos: COMBO_CUES.iter().copied().collect(),
        }
    }

    /// Resolve the cue for a classified Down event. Lookup order: the
    /// modifier-insensitive table, then the combination table, then the
    /// default typing cue.
    pub fn resolve(&self, event: &KeyEvent) -> CueKind {
        self.ignore_modifiers
            .get(&event.code)
            .or_else(|| self.combos.get(&event.combo()))
            .copied()
            .unwrap_or(CueKind::Typing)
    }

    /// Whether a key belongs to the delete class (backspace/delete),
    /// which overrides the hold loop on repeat.
    pub fn is_delete_class(&self, code: KeyCode) -> bool {
        matches!(code, vk::BACKSPACE | vk::DELETE)
    }

    /// Cue to play when a delete-class key repeats. Absence means the
    /// repeat is silently ignored.
    pub fn delete_cue(&self, code: KeyCode) -> Option<CueKind> {
        self.ignore_modifiers.get(&code).copied()
    }
}
