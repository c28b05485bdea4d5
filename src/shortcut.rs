//! Global shortcut dispatch
//!
//! Consumes the classified Down feed, independent of audio, and maps
//! fixed key combinations to application actions. The only built-in
//! shortcut toggles the sound session on and off.

use crate::event::{vk, ComboCode, EventKind, KeyEvent, Modifiers};
use std::collections::HashMap;

/// Actions a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Pause or resume sound feedback.
    ToggleFeedback,
}

/// Ctrl+Shift+F12 pauses/resumes feedback.
pub const TOGGLE_SHORTCUT: ComboCode =
    Modifiers::CTRL.bits() | Modifiers::SHIFT.bits() | vk::F12;

/// Fixed combo → action table.
pub struct ShortcutMap {
    actions: HashMap<ComboCode, ShortcutAction>,
}

impl Default for ShortcutMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutMap {
    pub fn new() -> Self {
        let mut actions = HashMap::new();
        actions.insert(TOGGLE_SHORTCUT, ShortcutAction::ToggleFeedback);
        ShortcutMap { actions }
    }

    /// Resolve an action for a classified event. Only Down events
    /// trigger shortcuts; repeats and releases never do.
    pub fn resolve(&self, event: &KeyEvent) -> Option<ShortcutAction> {
        if event.kind != EventKind::Down {
            return None;
        }
        self.actions.get(&event.combo()).copied()
    }
}
