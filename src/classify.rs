//! Keyboard event classification
//!
//! Turns raw down/up transitions from the hook into semantic events:
//! Down on first press, Type on key repeat, Up on release. Tracks the
//! set of physically held keys (with per-key repeat counts) and the
//! live modifier mask derived from them.
//!
//! Repeat detection is counted per key, not globally, so holding one
//! key while tapping another does not miscount either one.

use crate::event::{EventKind, KeyCode, KeyEvent, Modifiers, Transition, LOCK_SHORTCUT};
use std::collections::HashMap;

/// Classifier state machine over raw keyboard transitions.
#[derive(Debug, Default)]
pub struct Classifier {
    /// Repeat count per currently held key. Presence of an entry means
    /// the key is physically held; the count is 1 on first press and
    /// increments once per raw down message.
    held: HashMap<KeyCode, u32>,
    /// Live modifier mask derived from held modifier keys.
    modifiers: Modifiers,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Repeat count for a held key, if it is held.
    pub fn repeat_count(&self, code: KeyCode) -> Option<u32> {
        self.held.get(&code).copied()
    }

    /// Current modifier mask.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Drop all held-key and modifier state.
    pub fn reset(&mut self) {
        self.held.clear();
        self.modifiers = Modifiers::NONE;
    }

    /// Process one raw transition, returning the classified events it
    /// produces. Usually zero or one event; the lock shortcut fans out
    /// into one synthesized Up per held key.
    pub fn handle(&mut self, code: KeyCode, transition: Transition) -> Vec<KeyEvent> {
        match transition {
            Transition::Down => self.handle_down(code),
            Transition::Up => self.handle_up(code),
        }
    }

    fn handle_down(&mut self, code: KeyCode) -> Vec<KeyEvent> {
        let count = self.held.entry(code).or_insert(0);
        *count += 1;
        let first_press = *count == 1;

        if first_press {
            if let Some(bit) = Modifiers::bit_for(code) {
                self.modifiers.insert(bit);
            }
        }

        let event = KeyEvent {
            kind: if first_press {
                EventKind::Down
            } else {
                EventKind::Type
            },
            code,
            modifiers: self.modifiers.without_own_bit(code),
        };

        let mut events = vec![event];

        // Once the session locks the OS stops delivering up events, which
        // would leave keys (and modifiers) stuck held forever. Synthesize
        // an Up for everything we track and start from a clean slate.
        if event.combo() == LOCK_SHORTCUT {
            let mut tracked: Vec<KeyCode> = self.held.keys().copied().collect();
            tracked.sort_unstable();
            for held_code in tracked {
                if let Some(bit) = Modifiers::bit_for(held_code) {
                    self.modifiers.remove(bit);
                }
                events.push(KeyEvent {
                    kind: EventKind::Up,
                    code: held_code,
                    modifiers: self.modifiers.without_own_bit(held_code),
                });
            }
            self.held.clear();
            self.modifiers = Modifiers::NONE;
        }

        events
    }

    fn handle_up(&mut self, code: KeyCode) -> Vec<KeyEvent> {
        // After an unlock, stray up events arrive for keys the tracker
        // never re-registered. Discard them and resynchronize the mask.
        if self.held.is_empty() {
            self.modifiers = Modifiers::NONE;
            return Vec::new();
        }

        if let Some(bit) = Modifiers::bit_for(code) {
            self.modifiers.remove(bit);
        }
        self.held.remove(&code);

        vec![KeyEvent {
            kind: EventKind::Up,
            code,
            modifiers: self.modifiers.without_own_bit(code),
        }]
    }
}
