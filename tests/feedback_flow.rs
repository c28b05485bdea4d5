//! End-to-end feedback flow tests against the public API
//!
//! Drives a Session with scripted raw transitions and a fake audio
//! backend, verifying the classification → lookup → playback pipeline
//! without a real audio device.

use keyclack::config::SoundConfig;
use keyclack::error::SoundError;
use keyclack::event::{vk, EventKind, Transition};
use keyclack::session::Session;
use keyclack::sound::{SoundCue, Voice, VoiceBackend};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared counters describing everything the fake backend observed.
#[derive(Default)]
struct Observed {
    voices_created: AtomicUsize,
    one_shots: AtomicUsize,
    loops_started: AtomicUsize,
    stops: AtomicUsize,
}

struct FakeVoice {
    observed: Arc<Observed>,
    idle: AtomicBool,
}

impl Voice for FakeVoice {
    fn play(&mut self, _cue: &SoundCue) -> Result<(), SoundError> {
        self.observed.one_shots.fetch_add(1, Ordering::SeqCst);
        self.idle.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn play_looping(&mut self, _cue: &SoundCue) -> Result<(), SoundError> {
        self.observed.loops_started.fetch_add(1, Ordering::SeqCst);
        self.idle.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        self.observed.stops.fetch_add(1, Ordering::SeqCst);
        self.idle.store(true, Ordering::SeqCst);
    }

    fn is_idle(&self) -> bool {
        self.idle.load(Ordering::SeqCst)
    }
}

struct FakeBackend {
    observed: Arc<Observed>,
}

impl VoiceBackend for FakeBackend {
    fn create_voice(&self) -> Result<Box<dyn Voice>, SoundError> {
        self.observed.voices_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeVoice {
            observed: self.observed.clone(),
            idle: AtomicBool::new(true),
        }))
    }
}

fn session_with_fake_audio() -> (Session, Arc<Observed>) {
    let observed = Arc::new(Observed::default());
    let config = SoundConfig::default();
    let factory_observed = observed.clone();
    let session = Session::new(
        &config.theme,
        config.max_voices,
        Box::new(move || {
            Ok(Box::new(FakeBackend {
                observed: factory_observed.clone(),
            }) as Box<dyn VoiceBackend>)
        }),
    );
    (session, observed)
}

fn press(session: &mut Session, code: u16) {
    session.handle_transition(code, Transition::Down);
}

fn release(session: &mut Session, code: u16) {
    session.handle_transition(code, Transition::Up);
}

#[test]
fn typing_a_sentence_plays_one_cue_per_keystroke() {
    let (mut session, observed) = session_with_fake_audio();
    session.start().unwrap();

    for code in [72u16, 69, 76, 76, 79] {
        press(&mut session, code);
        release(&mut session, code);
    }

    assert_eq!(observed.one_shots.load(Ordering::SeqCst), 5);
    assert_eq!(observed.loops_started.load(Ordering::SeqCst), 0);
}

#[test]
fn holding_a_key_hums_until_release() {
    let (mut session, observed) = session_with_fake_audio();
    session.start().unwrap();

    press(&mut session, vk::A);
    for _ in 0..10 {
        press(&mut session, vk::A); // kernel auto-repeat
    }
    assert_eq!(observed.loops_started.load(Ordering::SeqCst), 1);

    release(&mut session, vk::A);
    // The loop voice was stopped when the last key came up
    assert!(observed.stops.load(Ordering::SeqCst) >= 1);
}

#[test]
fn rapid_overlapping_keystrokes_never_outgrow_the_pool() {
    let (mut session, observed) = session_with_fake_audio();
    session.start().unwrap();

    // 30 distinct keys mashed without any release: every Down wants a
    // voice at once
    for code in 65u16..95 {
        press(&mut session, code);
    }

    // One hold voice plus at most max_voices pool voices
    let config = SoundConfig::default();
    assert!(observed.voices_created.load(Ordering::SeqCst) <= config.max_voices + 1);
    assert_eq!(observed.one_shots.load(Ordering::SeqCst), 30);
}

#[test]
fn lock_shortcut_resets_state_mid_burst() {
    let (mut session, _observed) = session_with_fake_audio();
    session.start().unwrap();

    press(&mut session, vk::A);
    press(&mut session, vk::C);
    press(&mut session, vk::SUPER_L);
    let events = session.handle_transition(vk::L, Transition::Down);

    // Down(L) plus a synthesized Up for each of the four tracked keys
    assert_eq!(events[0].kind, EventKind::Down);
    assert_eq!(events.iter().filter(|e| e.kind == EventKind::Up).count(), 4);
    assert_eq!(session.held_count(), 0);

    // Stray ups after unlock are swallowed
    let events = session.handle_transition(vk::A, Transition::Up);
    assert!(events.is_empty());
}

#[test]
fn classified_feed_works_while_paused() {
    let (mut session, observed) = session_with_fake_audio();
    session.start().unwrap();
    session.stop();

    let mut feed = session.subscribe();
    press(&mut session, vk::C);

    let event = feed.try_recv().expect("feed should deliver while paused");
    assert_eq!(event.kind, EventKind::Down);
    assert_eq!(event.code, vk::C);

    // No playback happened while paused
    assert_eq!(observed.one_shots.load(Ordering::SeqCst), 0);
}

#[test]
fn pause_resume_cycle_is_idempotent_and_resets_held_keys() {
    let (mut session, _observed) = session_with_fake_audio();
    session.start().unwrap();

    press(&mut session, vk::A);
    assert_eq!(session.held_count(), 1);

    session.stop();
    session.stop();
    session.start().unwrap();
    assert_eq!(session.held_count(), 0);
    assert!(session.is_running());

    session.dispose();
    session.dispose();
    assert!(!session.is_running());
}
