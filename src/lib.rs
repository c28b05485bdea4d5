//! Keyclack: mechanical keyboard sound feedback for Linux
//!
//! This library provides the core functionality for:
//! - Intercepting raw key transitions via evdev (kernel-level, works on
//!   all compositors)
//! - Classifying transitions into Down / Type (repeat) / Up events with
//!   correct modifier tracking
//! - Mapping keys and key combinations to sound cues
//! - Rendering cues through a bounded pool of reusable rodio voices,
//!   plus a dedicated looping voice while keys stay held
//!
//! # Architecture
//!
//! ```text
//!   ┌─────────────┐   raw down/up    ┌──────────────┐  Down/Type/Up  ┌────────────┐
//!   │   Hook      │ ───────────────▶ │  Classifier  │ ─────────────▶ │  SoundMap  │
//!   │  (evdev)    │   mpsc channel   │ (held keys + │    feed also   │  lookup    │
//!   └─────────────┘                  │  modifiers)  │   broadcast to └────────────┘
//!                                    └──────────────┘   shortcuts          │ cue
//!                                                                          ▼
//!                                                      ┌──────────────────────────┐
//!                                                      │  VoicePool (≤ max, steal │
//!                                                      │  oldest) + HoldLoop      │
//!                                                      └──────────────────────────┘
//! ```

pub mod classify;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event;
pub mod hook;
pub mod notification;
pub mod session;
pub mod shortcut;
pub mod sound;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{KeyclackError, Result};
pub use event::{EventKind, KeyEvent, Modifiers, Transition};
pub use session::Session;
