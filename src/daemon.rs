//! Daemon module - main event loop orchestration
//!
//! Funnels every raw key transition through the session on one task
//! (classification, sound dispatch and shortcut handling all happen on
//! this single path, so none of the shared state needs locking) and
//! wires up signal handling and the state file.

use crate::config::Config;
use crate::error::Result;
use crate::hook::{self, KeyboardSource, RawTransition};
use crate::notification;
use crate::session::Session;
use crate::shortcut::{ShortcutAction, ShortcutMap};
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

/// Write state to file for external integrations (e.g., Waybar)
fn write_state_file(path: &PathBuf, state: &str) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!("Failed to create state file directory: {}", e);
            return;
        }
    }

    if let Err(e) = std::fs::write(path, state) {
        tracing::warn!("Failed to write state file: {}", e);
    } else {
        tracing::trace!("State file updated: {}", state);
    }
}

/// Remove state file on shutdown
fn cleanup_state_file(path: &PathBuf) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove state file: {}", e);
        }
    }
}

/// Main daemon that owns the session and the keyboard hook.
pub struct Daemon {
    config: Config,
    state_file_path: Option<PathBuf>,
}

impl Daemon {
    pub fn new(config: Config) -> Self {
        let state_file_path = config.resolve_state_file();
        Self {
            config,
            state_file_path,
        }
    }

    fn update_state(&self, session: &Session) {
        if let Some(ref path) = self.state_file_path {
            let state = if session.is_running() {
                "active"
            } else {
                "paused"
            };
            write_state_file(path, state);
        }
    }

    /// Run the daemon main loop until SIGINT/SIGTERM.
    pub async fn run(&mut self) -> Result<()> {
        tracing::info!("Starting keyclack daemon");

        let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(|e| {
            crate::error::KeyclackError::Config(format!("Failed to set up SIGUSR1 handler: {}", e))
        })?;
        let mut sigusr2 = signal(SignalKind::user_defined2()).map_err(|e| {
            crate::error::KeyclackError::Config(format!("Failed to set up SIGUSR2 handler: {}", e))
        })?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
            crate::error::KeyclackError::Config(format!("Failed to set up SIGTERM handler: {}", e))
        })?;

        let mut session = Session::with_default_output(&self.config.sound);
        let shortcuts = ShortcutMap::new();

        // Hook install failure is non-fatal: the session just stays
        // stopped and the user is told what to fix.
        let mut source: Option<Box<dyn KeyboardSource>> = None;
        let mut raw_rx: Option<mpsc::Receiver<RawTransition>> = None;
        if self.config.hook.enabled {
            match install_hook().await {
                Ok((s, rx)) => {
                    source = Some(s);
                    raw_rx = Some(rx);
                }
                Err(e) => {
                    tracing::error!("Keyboard hook installation failed: {}", e);
                    notification::send(
                        "Keyclack",
                        &format!("Keyboard hook installation failed: {}", e),
                    )
                    .await;
                }
            }
        } else {
            tracing::info!("Keyboard hook disabled in config");
        }

        if raw_rx.is_some() && !self.config.start_paused {
            if let Err(e) = session.start() {
                tracing::error!("Failed to start sound feedback: {}", e);
                notification::send("Keyclack", &format!("Failed to start sound output: {}", e))
                    .await;
            }
        } else if self.config.start_paused {
            tracing::info!("Starting paused (Ctrl+Shift+F12 or SIGUSR1 to resume)");
        }

        self.update_state(&session);

        loop {
            tokio::select! {
                // Raw key transitions from the hook
                Some(raw) = async {
                    match &mut raw_rx {
                        Some(rx) => rx.recv().await,
                        None => std::future::pending().await,
                    }
                } => {
                    let events = session.handle_transition(raw.code, raw.transition);
                    for event in &events {
                        tracing::trace!("{}", event);
                        if let Some(action) = shortcuts.resolve(event) {
                            self.apply_shortcut(action, &mut session).await;
                        }
                    }
                }

                // SIGUSR1 - resume feedback (for scripts/bars)
                _ = sigusr1.recv() => {
                    tracing::debug!("Received SIGUSR1 (resume feedback)");
                    if let Err(e) = session.start() {
                        tracing::error!("Failed to resume sound feedback: {}", e);
                    }
                    self.update_state(&session);
                }

                // SIGUSR2 - pause feedback
                _ = sigusr2.recv() => {
                    tracing::debug!("Received SIGUSR2 (pause feedback)");
                    session.stop();
                    self.update_state(&session);
                }

                // Graceful shutdown (SIGINT from Ctrl+C)
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT, shutting down...");
                    break;
                }

                // Graceful shutdown (SIGTERM from systemctl stop)
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, shutting down...");
                    break;
                }
            }
        }

        if let Some(mut s) = source {
            s.stop().await?;
        }
        session.dispose();

        if let Some(ref path) = self.state_file_path {
            cleanup_state_file(path);
        }

        tracing::info!("Daemon stopped");
        Ok(())
    }

    async fn apply_shortcut(&self, action: ShortcutAction, session: &mut Session) {
        match action {
            ShortcutAction::ToggleFeedback => {
                if let Err(e) = session.toggle() {
                    tracing::error!("Failed to toggle sound feedback: {}", e);
                    return;
                }
                let state = if session.is_running() {
                    "resumed"
                } else {
                    "paused"
                };
                tracing::info!("Sound feedback {} via shortcut", state);
                self.update_state(session);
            }
        }
    }
}

async fn install_hook() -> std::result::Result<
    (Box<dyn KeyboardSource>, mpsc::Receiver<RawTransition>),
    crate::error::HookError,
> {
    let mut source = hook::create_source()?;
    let rx = source.start().await?;
    Ok((source, rx))
}
