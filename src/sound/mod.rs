//! Sound playback: cue loading, key→cue mapping, and the voice pool.

pub mod bank;
pub mod map;
pub mod pool;
pub mod voice;

pub use bank::{CueKind, SoundBank, SoundCue};
pub use map::SoundMap;
pub use pool::VoicePool;
pub use voice::{HoldLoop, RodioBackend, Voice, VoiceBackend};
