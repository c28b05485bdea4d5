//! Bounded voice pool
//!
//! Serves overlapping, rapid-fire playback requests from a fixed-size
//! set of reusable voices. Acquisition never blocks: an idle voice is
//! reused, a new voice is allocated while under the cap, and once the
//! pool is saturated the voice with the oldest acquisition timestamp is
//! force-stopped and handed out. Stealing by oldest acquisition (not
//! oldest playback start) is deliberate, preserved observed behavior.

use crate::error::SoundError;
use crate::sound::voice::Voice;
use std::time::Instant;

pub const DEFAULT_MAX_VOICES: usize = 5;

struct PoolVoice {
    voice: Box<dyn Voice>,
    last_acquired: Instant,
}

/// Fixed-capacity collection of reusable playback voices.
pub struct VoicePool {
    voices: Vec<PoolVoice>,
    max_voices: usize,
}

impl VoicePool {
    pub fn new(max_voices: usize) -> Self {
        VoicePool {
            voices: Vec::new(),
            max_voices: max_voices.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// Hand out a voice ready for immediate reuse, allocating through
    /// `backend` only while under the size cap.
    pub fn acquire(
        &mut self,
        backend: &dyn crate::sound::voice::VoiceBackend,
    ) -> Result<&mut dyn Voice, SoundError> {
        let now = Instant::now();

        let index = if let Some(idx) = self.voices.iter().position(|v| v.voice.is_idle()) {
            idx
        } else if self.voices.len() < self.max_voices {
            let voice = backend.create_voice()?;
            self.voices.push(PoolVoice {
                voice,
                last_acquired: now,
            });
            self.voices.len() - 1
        } else {
            // Saturated: steal the least recently acquired voice
            let idx = self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.last_acquired)
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.voices[idx].voice.stop();
            idx
        };

        self.voices[index].last_acquired = now;
        Ok(self.voices[index].voice.as_mut())
    }

    /// Stop every voice and drop them all.
    pub fn release_all(&mut self) {
        for v in &mut self.voices {
            v.voice.stop();
        }
        self.voices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::bank::SoundCue;
    use crate::sound::voice::mock::{Call, MockBackend};
    use std::sync::atomic::Ordering;

    fn cue(byte: u8) -> SoundCue {
        SoundCue::new(vec![byte])
    }

    #[test]
    fn test_reuses_idle_voice() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(5);

        pool.acquire(&backend).unwrap().play(&cue(1)).unwrap();
        // First voice went back to idle
        backend.created.lock().unwrap()[0]
            .idle
            .store(true, Ordering::SeqCst);

        pool.acquire(&backend).unwrap().play(&cue(2)).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(backend.created.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_grows_until_cap_while_busy() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(3);

        for i in 0..3 {
            pool.acquire(&backend).unwrap().play(&cue(i)).unwrap();
        }
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_never_exceeds_cap() {
        let backend = MockBackend::default();
        let max = DEFAULT_MAX_VOICES;
        let mut pool = VoicePool::new(max);

        // max + 1 acquisitions with every voice kept busy
        for i in 0..=(max as u8) {
            pool.acquire(&backend).unwrap().play(&cue(i)).unwrap();
        }
        assert_eq!(pool.len(), max);
        assert_eq!(backend.created.lock().unwrap().len(), max);
    }

    #[test]
    fn test_saturated_pool_steals_oldest_acquired() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(2);

        pool.acquire(&backend).unwrap().play(&cue(0)).unwrap();
        pool.acquire(&backend).unwrap().play(&cue(1)).unwrap();
        // Both busy; the third acquire must stop voice 0 (oldest)
        pool.acquire(&backend).unwrap().play(&cue(2)).unwrap();

        let created = backend.created.lock().unwrap();
        let first_calls = created[0].calls.lock().unwrap();
        assert_eq!(
            *first_calls,
            vec![Call::Play(vec![0]), Call::Stop, Call::Play(vec![2])]
        );
        let second_calls = created[1].calls.lock().unwrap();
        assert_eq!(*second_calls, vec![Call::Play(vec![1])]);
    }

    #[test]
    fn test_stolen_voice_was_stopped_before_reuse() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(1);

        pool.acquire(&backend).unwrap().play(&cue(0)).unwrap();
        let v = pool.acquire(&backend).unwrap();
        // The returned voice is the previously playing one, now stopped
        assert!(v.is_idle());
    }

    #[test]
    fn test_steal_rotates_through_voices() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(2);

        // Spaced out so acquisition timestamps are strictly ordered
        for i in 0..4u8 {
            pool.acquire(&backend).unwrap().play(&cue(i)).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let created = backend.created.lock().unwrap();
        let second_calls = created[1].calls.lock().unwrap();
        assert!(second_calls.contains(&Call::Play(vec![3])));
    }

    #[test]
    fn test_release_all_stops_and_clears() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(3);
        pool.acquire(&backend).unwrap().play(&cue(0)).unwrap();
        pool.acquire(&backend).unwrap().play(&cue(1)).unwrap();

        pool.release_all();
        assert!(pool.is_empty());

        let created = backend.created.lock().unwrap();
        for state in created.iter() {
            assert!(state.calls.lock().unwrap().contains(&Call::Stop));
        }
    }

    #[test]
    fn test_zero_cap_is_clamped_to_one() {
        let backend = MockBackend::default();
        let mut pool = VoicePool::new(0);
        assert!(pool.acquire(&backend).is_ok());
        assert_eq!(pool.len(), 1);
    }
}
