//! Playback voices
//!
//! A voice is one unit of concurrent playback capacity. The trait seam
//! keeps the pool and session testable without an audio device; the
//! production implementation wraps a rodio sink.

use crate::error::SoundError;
use crate::sound::bank::SoundCue;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::io::Cursor;

/// One unit of concurrent playback.
pub trait Voice {
    /// Start one-shot playback of a cue, replacing whatever the voice
    /// was playing. Non-blocking.
    fn play(&mut self, cue: &SoundCue) -> Result<(), SoundError>;

    /// Start looping playback of a cue. Non-blocking.
    fn play_looping(&mut self, cue: &SoundCue) -> Result<(), SoundError>;

    /// Stop playback immediately.
    fn stop(&mut self);

    /// Whether the voice has finished (or never started) playing.
    fn is_idle(&self) -> bool;
}

/// Creates voices bound to one audio output.
pub trait VoiceBackend {
    fn create_voice(&self) -> Result<Box<dyn Voice>, SoundError>;
}

/// rodio-backed audio output. Holds the output stream alive for as long
/// as any voice created from it may play.
pub struct RodioBackend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    volume: f32,
}

impl RodioBackend {
    /// Open the default audio output.
    pub fn open(volume: f32) -> Result<Self, SoundError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| SoundError::Output(e.to_string()))?;
        Ok(RodioBackend {
            _stream: stream,
            handle,
            volume,
        })
    }
}

impl VoiceBackend for RodioBackend {
    fn create_voice(&self) -> Result<Box<dyn Voice>, SoundError> {
        let sink = Sink::try_new(&self.handle).map_err(|e| SoundError::Voice(e.to_string()))?;
        sink.set_volume(self.volume);
        Ok(Box::new(RodioVoice { sink }))
    }
}

/// A reusable rodio sink.
struct RodioVoice {
    sink: Sink,
}

impl RodioVoice {
    fn decode(cue: &SoundCue) -> Result<Decoder<Cursor<Vec<u8>>>, SoundError> {
        Decoder::new(Cursor::new(cue.to_vec())).map_err(|e| SoundError::Decode(e.to_string()))
    }
}

impl Voice for RodioVoice {
    fn play(&mut self, cue: &SoundCue) -> Result<(), SoundError> {
        let source = Self::decode(cue)?;
        self.sink.stop();
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn play_looping(&mut self, cue: &SoundCue) -> Result<(), SoundError> {
        let source = Self::decode(cue)?.repeat_infinite();
        self.sink.stop();
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn is_idle(&self) -> bool {
        self.sink.empty()
    }
}

/// The single dedicated looping voice played while any key stays held,
/// simulating sustained mechanical noise. Not part of the pool.
pub struct HoldLoop {
    voice: Box<dyn Voice>,
    playing: bool,
}

impl HoldLoop {
    pub fn new(voice: Box<dyn Voice>) -> Self {
        HoldLoop {
            voice,
            playing: false,
        }
    }

    /// Start the loop if it is not already running.
    pub fn ensure_playing(&mut self, cue: &SoundCue) -> Result<(), SoundError> {
        if self.playing && !self.voice.is_idle() {
            return Ok(());
        }
        self.voice.play_looping(cue)?;
        self.playing = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.playing {
            self.voice.stop();
            self.playing = false;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording voice implementation for pool and session tests.

    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// What a mock voice was asked to do.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Play(Vec<u8>),
        PlayLooping(Vec<u8>),
        Stop,
    }

    #[derive(Default)]
    pub struct MockState {
        pub calls: Mutex<Vec<Call>>,
        pub idle: AtomicBool,
    }

    pub struct MockVoice {
        pub state: Arc<MockState>,
    }

    impl MockVoice {
        pub fn new() -> (Self, Arc<MockState>) {
            let state = Arc::new(MockState {
                calls: Mutex::new(Vec::new()),
                idle: AtomicBool::new(true),
            });
            (
                MockVoice {
                    state: state.clone(),
                },
                state,
            )
        }
    }

    impl Voice for MockVoice {
        fn play(&mut self, cue: &SoundCue) -> Result<(), SoundError> {
            self.state.calls.lock().unwrap().push(Call::Play(cue.to_vec()));
            self.state.idle.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn play_looping(&mut self, cue: &SoundCue) -> Result<(), SoundError> {
            self.state
                .calls
                .lock()
                .unwrap()
                .push(Call::PlayLooping(cue.to_vec()));
            self.state.idle.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) {
            self.state.calls.lock().unwrap().push(Call::Stop);
            self.state.idle.store(true, Ordering::SeqCst);
        }

        fn is_idle(&self) -> bool {
            self.state.idle.load(Ordering::SeqCst)
        }
    }

    /// Backend that hands out mock voices and remembers their states so
    /// tests can inspect what each voice did.
    #[derive(Default)]
    pub struct MockBackend {
        pub created: Mutex<Vec<Arc<MockState>>>,
    }

    impl VoiceBackend for MockBackend {
        fn create_voice(&self) -> Result<Box<dyn Voice>, SoundError> {
            let (voice, state) = MockVoice::new();
            self.created.lock().unwrap().push(state);
            Ok(Box::new(voice))
        }
    }
}
