//! evdev-based keyboard source
//!
//! Reads key events from every keyboard in /dev/input at the kernel
//! level and translates them to the virtual key codes the classifier
//! and sound map use. Kernel auto-repeat (event value 2) is forwarded
//! as another raw down, which is what the repeat counter expects.

use super::{KeyboardSource, RawTransition};
use crate::error::HookError;
use crate::event::{vk, KeyCode, Transition};
use evdev::{Device, InputEventKind, Key};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

/// evdev-based keyboard source.
pub struct EvdevSource {
    device_paths: Vec<PathBuf>,
    stop_signal: Option<oneshot::Sender<()>>,
}

impl EvdevSource {
    pub fn new() -> Result<Self, HookError> {
        let device_paths = find_keyboard_devices()?;
        if device_paths.is_empty() {
            return Err(HookError::NoKeyboard);
        }

        tracing::debug!(
            "Found {} keyboard device(s): {:?}",
            device_paths.len(),
            device_paths
        );

        Ok(Self {
            device_paths,
            stop_signal: None,
        })
    }
}

#[async_trait::async_trait]
impl KeyboardSource for EvdevSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<RawTransition>, HookError> {
        let (tx, rx) = mpsc::channel(256);
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop_signal = Some(stop_tx);

        let device_paths = self.device_paths.clone();
        tokio::task::spawn_blocking(move || {
            reader_loop(device_paths, tx, stop_rx);
        });

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), HookError> {
        if let Some(stop) = self.stop_signal.take() {
            let _ = stop.send(());
        }
        Ok(())
    }
}

/// Reader loop running in a blocking task. Each iteration polls every
/// device without blocking and forwards translated transitions; the
/// channel send is the only thing that can back-pressure, and it drops
/// rather than stalls when the daemon falls behind.
fn reader_loop(
    device_paths: Vec<PathBuf>,
    tx: mpsc::Sender<RawTransition>,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut devices: Vec<Device> = device_paths
        .iter()
        .filter_map(|path| match Device::open(path) {
            Ok(device) => {
                set_nonblocking(&device);
                tracing::debug!("Opened device (non-blocking): {:?}", path);
                Some(device)
            }
            Err(e) => {
                tracing::warn!("Failed to open {:?}: {}", path, e);
                None
            }
        })
        .collect();

    if devices.is_empty() {
        tracing::error!("No keyboard devices could be opened");
        return;
    }

    tracing::info!("Intercepting key events from {} device(s)", devices.len());

    loop {
        match stop_rx.try_recv() {
            Ok(_) | Err(oneshot::error::TryRecvError::Closed) => {
                tracing::debug!("Keyboard source stopping");
                return;
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
        }

        for device in &mut devices {
            // fetch_events returns immediately if no events (non-blocking)
            let Ok(events) = device.fetch_events() else {
                continue;
            };
            for event in events {
                let InputEventKind::Key(key) = event.kind() else {
                    continue;
                };
                let Some(code) = translate_key(key) else {
                    continue;
                };
                let transition = match event.value() {
                    // Kernel repeat (2) re-enters as down so repeat
                    // counting sees it
                    1 | 2 => Transition::Down,
                    0 => Transition::Up,
                    _ => continue,
                };
                if tx.try_send(RawTransition { code, transition }).is_err() {
                    if tx.is_closed() {
                        return;
                    }
                    tracing::trace!("Event channel full, dropping transition");
                }
            }
        }

        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}

fn set_nonblocking(device: &Device) {
    let fd = device.as_raw_fd();
    unsafe {
        let flags = libc::fcntl(fd, libc::F_GETFL);
        if flags != -1 {
            libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK);
        }
    }
}

/// Find all keyboard input devices.
fn find_keyboard_devices() -> Result<Vec<PathBuf>, HookError> {
    let mut keyboards = Vec::new();

    let input_dir = std::fs::read_dir("/dev/input")
        .map_err(|e| HookError::DeviceAccess(format!("/dev/input: {}", e)))?;

    for entry in input_dir {
        let entry = entry.map_err(|e| HookError::DeviceAccess(e.to_string()))?;
        let path = entry.path();

        let is_event_device = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with("event"))
            .unwrap_or(false);
        if !is_event_device {
            continue;
        }

        match Device::open(&path) {
            Ok(device) => {
                // A keyboard has letter keys plus the basics
                let has_keys = device
                    .supported_keys()
                    .map(|keys| {
                        keys.contains(Key::KEY_A)
                            && keys.contains(Key::KEY_SPACE)
                            && keys.contains(Key::KEY_ENTER)
                    })
                    .unwrap_or(false);

                if has_keys {
                    tracing::debug!(
                        "Found keyboard: {:?} ({:?})",
                        path,
                        device.name().unwrap_or("unknown")
                    );
                    keyboards.push(path);
                }
            }
            Err(e) => {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    return Err(HookError::DeviceAccess(path.display().to_string()));
                }
                // Device busy etc., just skip
                tracing::trace!("Skipping {:?}: {}", path, e);
            }
        }
    }

    Ok(keyboards)
}

/// Translate an evdev key to the virtual key code space used by the
/// sound map. Keys with no mapping produce no feedback.
fn translate_key(key: Key) -> Option<KeyCode> {
    let code = match key {
        Key::KEY_BACKSPACE => vk::BACKSPACE,
        Key::KEY_TAB => vk::TAB,
        Key::KEY_ENTER | Key::KEY_KPENTER => vk::ENTER,
        Key::KEY_CAPSLOCK => vk::CAPS_LOCK,
        Key::KEY_ESC => vk::ESC,
        Key::KEY_SPACE => vk::SPACE,
        Key::KEY_PAGEUP => vk::PAGE_UP,
        Key::KEY_PAGEDOWN => vk::PAGE_DOWN,
        Key::KEY_END => vk::END,
        Key::KEY_HOME => vk::HOME,
        Key::KEY_LEFT => vk::LEFT,
        Key::KEY_UP => vk::UP,
        Key::KEY_RIGHT => vk::RIGHT,
        Key::KEY_DOWN => vk::DOWN,
        Key::KEY_INSERT => vk::INSERT,
        Key::KEY_DELETE => vk::DELETE,

        Key::KEY_0 => vk::DIGIT_0,
        Key::KEY_1 => vk::DIGIT_1,
        Key::KEY_2 => vk::DIGIT_2,
        Key::KEY_3 => vk::DIGIT_3,
        Key::KEY_4 => vk::DIGIT_4,
        Key::KEY_5 => vk::DIGIT_5,
        Key::KEY_6 => vk::DIGIT_6,
        Key::KEY_7 => vk::DIGIT_7,
        Key::KEY_8 => vk::DIGIT_8,
        Key::KEY_9 => vk::DIGIT_9,

        Key::KEY_A => 65,
        Key::KEY_B => 66,
        Key::KEY_C => 67,
        Key::KEY_D => 68,
        Key::KEY_E => 69,
        Key::KEY_F => 70,
        Key::KEY_G => 71,
        Key::KEY_H => 72,
        Key::KEY_I => 73,
        Key::KEY_J => 74,
        Key::KEY_K => 75,
        Key::KEY_L => 76,
        Key::KEY_M => 77,
        Key::KEY_N => 78,
        Key::KEY_O => 79,
        Key::KEY_P => 80,
        Key::KEY_Q => 81,
        Key::KEY_R => 82,
        Key::KEY_S => 83,
        Key::KEY_T => 84,
        Key::KEY_U => 85,
        Key::KEY_V => 86,
        Key::KEY_W => 87,
        Key::KEY_X => 88,
        Key::KEY_Y => 89,
        Key::KEY_Z => 90,

        Key::KEY_LEFTMETA => vk::SUPER_L,
        Key::KEY_RIGHTMETA => vk::SUPER_R,
        Key::KEY_COMPOSE => vk::MENU,

        // Numpad digits
        Key::KEY_KP0 => 96,
        Key::KEY_KP1 => 97,
        Key::KEY_KP2 => 98,
        Key::KEY_KP3 => 99,
        Key::KEY_KP4 => 100,
        Key::KEY_KP5 => 101,
        Key::KEY_KP6 => 102,
        Key::KEY_KP7 => 103,
        Key::KEY_KP8 => 104,
        Key::KEY_KP9 => 105,

        Key::KEY_KPASTERISK => vk::NUMPAD_MUL,
        Key::KEY_KPPLUS => vk::NUMPAD_ADD,
        Key::KEY_KPMINUS => vk::NUMPAD_SUB,
        Key::KEY_KPDOT => vk::NUMPAD_DOT,
        Key::KEY_KPSLASH => vk::NUMPAD_DIV,

        Key::KEY_F1 => 112,
        Key::KEY_F2 => 113,
        Key::KEY_F3 => 114,
        Key::KEY_F4 => 115,
        Key::KEY_F5 => 116,
        Key::KEY_F6 => 117,
        Key::KEY_F7 => 118,
        Key::KEY_F8 => 119,
        Key::KEY_F9 => 120,
        Key::KEY_F10 => 121,
        Key::KEY_F11 => 122,
        Key::KEY_F12 => vk::F12,

        Key::KEY_NUMLOCK => vk::NUM_LOCK,

        Key::KEY_LEFTSHIFT => vk::SHIFT_L,
        Key::KEY_RIGHTSHIFT => vk::SHIFT_R,
        Key::KEY_LEFTCTRL => vk::CTRL_L,
        Key::KEY_RIGHTCTRL => vk::CTRL_R,
        Key::KEY_LEFTALT => vk::ALT_L,
        Key::KEY_RIGHTALT => vk::ALT_R,

        Key::KEY_SEMICOLON => vk::SEMICOLON,
        Key::KEY_EQUAL => vk::EQUALS,
        Key::KEY_COMMA => vk::COMMA,
        Key::KEY_MINUS => vk::MINUS,
        Key::KEY_DOT => vk::PERIOD,
        Key::KEY_SLASH => vk::SLASH,
        Key::KEY_GRAVE => vk::GRAVE,
        Key::KEY_LEFTBRACE => vk::LEFT_BRACKET,
        Key::KEY_BACKSLASH => vk::BACKSLASH,
        Key::KEY_RIGHTBRACE => vk::RIGHT_BRACKET,
        Key::KEY_APOSTROPHE => vk::APOSTROPHE,

        _ => return None,
    };
    Some(code)
}
