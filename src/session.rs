//! Session: ties classification, mapping and playback together
//!
//! Owns the classifier, the lookup tables and the lazily-opened audio
//! state (backend, cue bank, voice pool, hold loop). Raw transitions are
//! always classified and published on the event feed so collaborators
//! (the shortcut dispatcher, debug tooling) see key activity even while
//! feedback is paused; audio dispatch only happens while running.
//!
//! Everything here is called from the daemon's single event loop, so no
//! locking is needed and nothing on this path may block.

use crate::classify::Classifier;
use crate::config::SoundConfig;
use crate::error::SoundError;
use crate::event::{EventKind, KeyCode, KeyEvent, Transition};
use crate::sound::{CueKind, HoldLoop, RodioBackend, SoundBank, SoundMap, VoiceBackend, VoicePool};
use tokio::sync::broadcast;

/// Produces the audio backend on first start. A seam so tests can run
/// the whole session against mock voices.
pub type BackendFactory = Box<dyn FnMut() -> Result<Box<dyn VoiceBackend>, SoundError>>;

/// Audio resources, opened lazily on the first `start()` and released
/// on `dispose()`.
struct AudioState {
    backend: Box<dyn VoiceBackend>,
    bank: SoundBank,
    pool: VoicePool,
    hold: HoldLoop,
}

/// The sound feedback session.
pub struct Session {
    classifier: Classifier,
    map: SoundMap,
    audio: Option<AudioState>,
    backend_factory: BackendFactory,
    theme: String,
    max_voices: usize,
    running: bool,
    events_tx: broadcast::Sender<KeyEvent>,
}

impl Session {
    /// Create a session with an explicit backend factory.
    pub fn new(theme: &str, max_voices: usize, backend_factory: BackendFactory) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Session {
            classifier: Classifier::new(),
            map: SoundMap::new(),
            audio: None,
            backend_factory,
            theme: theme.to_string(),
            max_voices,
            running: false,
            events_tx,
        }
    }

    /// Create a session backed by the default rodio audio output.
    pub fn with_default_output(config: &SoundConfig) -> Self {
        let volume = config.volume;
        Self::new(
            &config.theme,
            config.max_voices,
            Box::new(move || {
                RodioBackend::open(volume).map(|b| Box::new(b) as Box<dyn VoiceBackend>)
            }),
        )
    }

    /// Subscribe to the classified event feed, independent of audio.
    pub fn subscribe(&self) -> broadcast::Receiver<KeyEvent> {
        self.events_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin producing sound feedback. Idempotent; the audio backend and
    /// sound assets are loaded on the first call only.
    pub fn start(&mut self) -> Result<(), SoundError> {
        if self.running {
            return Ok(());
        }

        if self.audio.is_none() {
            let backend = (self.backend_factory)()?;
            let bank = SoundBank::load(&self.theme)?;
            let hold = HoldLoop::new(backend.create_voice()?);
            let pool = VoicePool::new(self.max_voices);
            self.audio = Some(AudioState {
                backend,
                bank,
                pool,
                hold,
            });
            tracing::debug!(theme = %self.theme, "Sound assets loaded");
        }

        self.classifier.reset();
        self.running = true;
        tracing::info!("Sound feedback started");
        Ok(())
    }

    /// Silence feedback. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.hold.stop();
        }
        self.classifier.reset();
        self.running = false;
        tracing::info!("Sound feedback stopped");
    }

    /// Flip between running and stopped.
    pub fn toggle(&mut self) -> Result<(), SoundError> {
        if self.running {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Stop and release every voice, the hold loop and all loaded cues.
    /// Safe to call multiple times.
    pub fn dispose(&mut self) {
        self.stop();
        if let Some(mut audio) = self.audio.take() {
            audio.pool.release_all();
            audio.hold.stop();
        }
    }

    /// Process one raw transition from the hook: classify, publish to
    /// the feed and, while running, trigger playback. Playback failures
    /// are logged and dropped; they must never escape this path.
    pub fn handle_transition(&mut self, code: KeyCode, transition: Transition) -> Vec<KeyEvent> {
        let events = self.classifier.handle(code, transition);

        for event in &events {
            // No receivers is fine; the feed is best-effort
            let _ = self.events_tx.send(*event);
        }

        if self.running {
            for event in &events {
                self.dispatch(event);
            }
        }

        events
    }

    fn dispatch(&mut self, event: &KeyEvent) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };

        match event.kind {
            EventKind::Down => {
                let kind = self.map.resolve(event);
                let cue = audio.bank.cue(kind).clone();
                match audio.pool.acquire(audio.backend.as_ref()) {
                    Ok(voice) => {
                        if let Err(e) = voice.play(&cue) {
                            tracing::warn!("Failed to play {:?} cue: {}", kind, e);
                        }
                    }
                    Err(e) => tracing::warn!("Failed to acquire voice: {}", e),
                }
            }
            EventKind::Type => {
                if self.map.is_delete_class(event.code) {
                    // Repeating backspace/delete overrides the hold loop
                    audio.hold.stop();
                    if let Some(kind) = self.map.delete_cue(event.code) {
                        let cue = audio.bank.cue(kind).clone();
                        match audio.pool.acquire(audio.backend.as_ref()) {
                            Ok(voice) => {
                                if let Err(e) = voice.play(&cue) {
                                    tracing::warn!("Failed to play delete cue: {}", e);
                                }
                            }
                            Err(e) => tracing::warn!("Failed to acquire voice: {}", e),
                        }
                    }
                } else {
                    let cue = audio.bank.cue(CueKind::Hold).clone();
                    if let Err(e) = audio.hold.ensure_playing(&cue) {
                        tracing::warn!("Failed to start hold loop: {}", e);
                    }
                }
            }
            EventKind::Up => {
                if self.classifier.held_count() == 0 {
                    audio.hold.stop();
                }
            }
        }
    }

    /// Held-key count, exposed for tests and status reporting.
    pub fn held_count(&self) -> usize {
        self.classifier.held_count()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}
