//! Error types for keyclack
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the keyclack application
#[derive(Error, Debug)]
pub enum KeyclackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keyboard hook error: {0}")]
    Hook(#[from] HookError),

    #[error("Sound error: {0}")]
    Sound(#[from] SoundError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to the keyboard hook
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Cannot open input device '{0}'. Is the user in the 'input' group?\n  Run: sudo usermod -aG input $USER\n  Then log out and back in.")]
    DeviceAccess(String),

    #[error("No keyboard device found in /dev/input/")]
    NoKeyboard,

    #[error("Keyboard hook not supported: {0}")]
    NotSupported(String),

    #[error("evdev error: {0}")]
    Evdev(String),
}

/// Errors related to sound cue loading and playback
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Failed to open audio output: {0}")]
    Output(String),

    #[error("Failed to create playback voice: {0}")]
    Voice(String),

    #[error("Failed to decode sound cue: {0}")]
    Decode(String),

    #[error("Sound theme error: {0}")]
    Theme(String),
}

/// Result type alias using KeyclackError
pub type Result<T> = std::result::Result<T, KeyclackError>;

#[cfg(target_os = "linux")]
impl From<evdev::Error> for HookError {
    fn from(e: evdev::Error) -> Self {
        HookError::Evdev(e.to_string())
    }
}
