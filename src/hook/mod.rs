//! Keyboard interception
//!
//! On Linux, raw key transitions are read at the kernel level via evdev,
//! which sees every physical keyboard regardless of display server.
//! The core consumes the channel of raw transitions and never drives
//! the hook beyond start/stop.
//!
//! Linux: requires the user to be in the 'input' group.

#[cfg(target_os = "linux")]
pub mod evdev_source;

use crate::error::HookError;
use crate::event::{KeyCode, Transition};
use tokio::sync::mpsc;

/// One raw physical key transition, as intercepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTransition {
    pub code: KeyCode,
    pub transition: Transition,
}

/// Trait for keyboard interception implementations.
#[async_trait::async_trait]
pub trait KeyboardSource: Send + Sync {
    /// Start intercepting. Returns a channel receiver of raw transitions,
    /// ordered per key as physically generated.
    async fn start(&mut self) -> Result<mpsc::Receiver<RawTransition>, HookError>;

    /// Stop intercepting and clean up.
    async fn stop(&mut self) -> Result<(), HookError>;
}

/// Create the keyboard source for this platform.
#[cfg(target_os = "linux")]
pub fn create_source() -> Result<Box<dyn KeyboardSource>, HookError> {
    Ok(Box::new(evdev_source::EvdevSource::new()?))
}

/// Create the keyboard source for this platform.
#[cfg(not(target_os = "linux"))]
pub fn create_source() -> Result<Box<dyn KeyboardSource>, HookError> {
    Err(HookError::NotSupported(
        "keyboard interception is only implemented for Linux (evdev)".to_string(),
    ))
}
