//! Sound cue loading
//!
//! Holds one decoded-on-demand WAV buffer per cue kind. The default theme
//! is generated programmatically (short clicks and tones) to avoid shipping
//! binary assets; a custom theme is a directory of per-cue .wav files with
//! generated fallbacks for anything missing.

use crate::error::SoundError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// The fixed set of sound cues the key map can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueKind {
    /// Default typing click for unmapped keys.
    Typing,
    /// Looping cue played while any key is held.
    Hold,
    Shift,
    Control,
    Enter,
    Esc,
    Super,
    Delete,
    Forward,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Symbol,
    Locked,
    Copy,
    Paste,
    Undo,
    Bracket,
    ShiftBracket,
}

impl CueKind {
    /// Every cue kind, used when loading a theme.
    pub const ALL: [CueKind; 20] = [
        CueKind::Typing,
        CueKind::Hold,
        CueKind::Shift,
        CueKind::Control,
        CueKind::Enter,
        CueKind::Esc,
        CueKind::Super,
        CueKind::Delete,
        CueKind::Forward,
        CueKind::ArrowLeft,
        CueKind::ArrowUp,
        CueKind::ArrowRight,
        CueKind::ArrowDown,
        CueKind::Symbol,
        CueKind::Locked,
        CueKind::Copy,
        CueKind::Paste,
        CueKind::Undo,
        CueKind::Bracket,
        CueKind::ShiftBracket,
    ];

    /// File name of this cue inside a custom theme directory.
    pub fn file_name(self) -> &'static str {
        match self {
            CueKind::Typing => "type.wav",
            CueKind::Hold => "hold.wav",
            CueKind::Shift => "shift.wav",
            CueKind::Control => "control.wav",
            CueKind::Enter => "enter.wav",
            CueKind::Esc => "esc.wav",
            CueKind::Super => "super.wav",
            CueKind::Delete => "delete.wav",
            CueKind::Forward => "forward.wav",
            CueKind::ArrowLeft => "left.wav",
            CueKind::ArrowUp => "up.wav",
            CueKind::ArrowRight => "right.wav",
            CueKind::ArrowDown => "down.wav",
            CueKind::Symbol => "symbol.wav",
            CueKind::Locked => "locked.wav",
            CueKind::Copy => "copy.wav",
            CueKind::Paste => "paste.wav",
            CueKind::Undo => "undo.wav",
            CueKind::Bracket => "brackets.wav",
            CueKind::ShiftBracket => "brackets2.wav",
        }
    }
}

/// Immutable handle to an encoded WAV buffer. Cheap to clone; many map
/// entries alias the same cue.
#[derive(Debug, Clone)]
pub struct SoundCue(Arc<Vec<u8>>);

impl SoundCue {
    pub fn new(data: Vec<u8>) -> Self {
        SoundCue(Arc::new(data))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Owned copy of the WAV bytes, for feeding a decoder.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.as_ref().clone()
    }
}

/// All loaded sound cues for one theme.
pub struct SoundBank {
    cues: HashMap<CueKind, SoundCue>,
}

impl SoundBank {
    /// Load a theme by name. "default" generates all cues; anything else
    /// is treated as a path to a theme directory.
    pub fn load(theme: &str) -> Result<Self, SoundError> {
        match theme {
            "default" => Ok(Self::generated()),
            path => Self::from_dir(path),
        }
    }

    /// The built-in procedurally generated theme.
    pub fn generated() -> Self {
        let mut cues = HashMap::new();
        for kind in CueKind::ALL {
            cues.insert(kind, SoundCue::new(generate_cue(kind)));
        }
        SoundBank { cues }
    }

    /// Load cues from a directory of .wav files, generating any that are
    /// missing so a partial theme still covers the whole map.
    fn from_dir(path: &str) -> Result<Self, SoundError> {
        let dir = PathBuf::from(path);
        if !dir.is_dir() {
            return Err(SoundError::Theme(format!(
                "theme directory not found: {}",
                path
            )));
        }

        let mut cues = HashMap::new();
        for kind in CueKind::ALL {
            let file = dir.join(kind.file_name());
            let cue = match std::fs::read(&file) {
                Ok(data) if !data.is_empty() => SoundCue::new(data),
                _ => {
                    tracing::debug!("Theme file {:?} missing, using generated cue", file);
                    SoundCue::new(generate_cue(kind))
                }
            };
            cues.insert(kind, cue);
        }
        Ok(SoundBank { cues })
    }

    pub fn cue(&self, kind: CueKind) -> &SoundCue {
        // The bank always holds every kind
        &self.cues[&kind]
    }
}

// === Sound generation ===
// Generate simple WAV sounds programmatically to avoid shipping binary assets

const SAMPLE_RATE: u32 = 44100;

/// Generate the WAV data for one cue kind.
fn generate_cue(kind: CueKind) -> Vec<u8> {
    match kind {
        CueKind::Typing => generate_thock_wav(1800.0, 28),
        // No fade so the loop point is seamless
        CueKind::Hold => generate_hum_wav(110.0, 250),
        CueKind::Shift => generate_thock_wav(1400.0, 32),
        CueKind::Control => generate_thock_wav(1100.0, 36),
        CueKind::Enter => generate_thock_wav(700.0, 55),
        CueKind::Esc => generate_two_tone_wav(900.0, 500.0, 90, 10),
        CueKind::Super => generate_two_tone_wav(500.0, 900.0, 90, 10),
        CueKind::Delete => generate_thock_wav(600.0, 45),
        CueKind::Forward => generate_tone_wav(1000.0, 45, 8),
        CueKind::ArrowLeft => generate_tone_wav(700.0, 35, 6),
        CueKind::ArrowUp => generate_tone_wav(900.0, 35, 6),
        CueKind::ArrowRight => generate_tone_wav(800.0, 35, 6),
        CueKind::ArrowDown => generate_tone_wav(600.0, 35, 6),
        CueKind::Symbol => generate_thock_wav(2200.0, 24),
        CueKind::Locked => generate_two_tone_wav(800.0, 300.0, 220, 25),
        CueKind::Copy => generate_two_tone_wav(600.0, 1200.0, 110, 12),
        CueKind::Paste => generate_two_tone_wav(1200.0, 600.0, 110, 12),
        CueKind::Undo => generate_two_tone_wav(1000.0, 700.0, 130, 15),
        CueKind::Bracket => generate_thock_wav(1600.0, 26),
        CueKind::ShiftBracket => generate_thock_wav(2000.0, 26),
    }
}

/// Generate a mechanical click: a square wave with a fast exponential
/// decay envelope, pitched per cue.
fn generate_thock_wav(frequency: f32, duration_ms: u32) -> Vec<u8> {
    let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
    let period = SAMPLE_RATE as f32 / frequency;

    let mut samples: Vec<i16> = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let envelope = (-6.0 * i as f32 / num_samples as f32).exp();
        let phase = (i as f32 / period).fract();
        let square = if phase < 0.5 { 1.0 } else { -1.0 };
        samples.push((square * envelope * 12000.0) as i16);
    }

    encode_wav(&samples, SAMPLE_RATE)
}

/// Generate a sine tone with fade in/out.
fn generate_tone_wav(frequency: f32, duration_ms: u32, fade_ms: u32) -> Vec<u8> {
    let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
    let fade_samples = (SAMPLE_RATE * fade_ms / 1000) as usize;

    let mut samples: Vec<i16> = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let mut amplitude = (2.0 * std::f32::consts::PI * frequency * t).sin();
        if i < fade_samples {
            amplitude *= i as f32 / fade_samples as f32;
        } else if i >= num_samples - fade_samples {
            amplitude *= (num_samples - i) as f32 / fade_samples as f32;
        }
        samples.push((amplitude * 14000.0) as i16);
    }

    encode_wav(&samples, SAMPLE_RATE)
}

/// Generate a two-tone sound (rising or falling).
fn generate_two_tone_wav(freq1: f32, freq2: f32, duration_ms: u32, fade_ms: u32) -> Vec<u8> {
    let num_samples = (SAMPLE_RATE * duration_ms / 1000) as usize;
    let fade_samples = (SAMPLE_RATE * fade_ms / 1000) as usize;
    let half_samples = num_samples / 2;

    let mut samples: Vec<i16> = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let freq = if i < half_samples { freq1 } else { freq2 };
        let mut amplitude = (2.0 * std::f32::consts::PI * freq * t).sin();
        if i < fade_samples {
            amplitude *= i as f32 / fade_samples as f32;
        } else if i >= num_samples - fade_samples {
            amplitude *= (num_samples - i) as f32 / fade_samples as f32;
        }
        samples.push((amplitude * 14000.0) as i16);
    }

    encode_wav(&samples, SAMPLE_RATE)
}

/// Generate a low hum sized to loop seamlessly: a whole number of sine
/// periods with no fade envelope.
fn generate_hum_wav(frequency: f32, duration_ms: u32) -> Vec<u8> {
    let requested = (SAMPLE_RATE * duration_ms / 1000) as usize;
    let period = SAMPLE_RATE as f32 / frequency;
    let periods = (requested as f32 / period).round().max(1.0);
    let num_samples = (periods * period) as usize;

    let mut samples: Vec<i16> = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let amplitude = (2.0 * std::f32::consts::PI * frequency * t).sin();
        samples.push((amplitude * 8000.0) as i16);
    }

    encode_wav(&samples, SAMPLE_RATE)
}

/// Encode samples as WAV format (PCM, mono, 16-bit).
fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    let mut wav = Vec::new();

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    let file_size = (36 + samples.len() * 2) as u32;
    wav.extend_from_slice(&file_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&((samples.len() * 2) as u32).to_le_bytes());
    for sample in samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_cues_are_valid_wav() {
        for kind in CueKind::ALL {
            let wav = generate_cue(kind);
            assert_eq!(&wav[0..4], b"RIFF", "{:?}", kind);
            assert_eq!(&wav[8..12], b"WAVE", "{:?}", kind);
            assert!(wav.len() > 44, "{:?}", kind);
        }
    }

    #[test]
    fn test_generated_bank_covers_every_kind() {
        let bank = SoundBank::generated();
        for kind in CueKind::ALL {
            assert!(!bank.cue(kind).bytes().is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_cues_alias_cheaply() {
        let bank = SoundBank::generated();
        let a = bank.cue(CueKind::Typing).clone();
        let b = a.clone();
        assert_eq!(a.bytes(), b.bytes());
    }

    #[test]
    fn test_missing_theme_dir_is_an_error() {
        assert!(SoundBank::load("/nonexistent/theme/dir").is_err());
    }

    #[test]
    fn test_partial_theme_dir_falls_back_to_generated() {
        let dir = tempfile::tempdir().unwrap();
        let custom = generate_tone_wav(440.0, 50, 5);
        std::fs::write(dir.path().join("type.wav"), &custom).unwrap();

        let bank = SoundBank::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(bank.cue(CueKind::Typing).bytes(), custom.as_slice());
        // Everything else fell back to a generated cue
        assert!(!bank.cue(CueKind::Hold).bytes().is_empty());
    }

    #[test]
    fn test_hold_cue_has_no_fade_edges() {
        let wav = generate_hum_wav(110.0, 250);
        // First non-header sample should already be near zero crossing,
        // and the buffer should end near a zero crossing for clean looping
        let data = &wav[44..];
        let first = i16::from_le_bytes([data[0], data[1]]);
        let last = i16::from_le_bytes([data[data.len() - 2], data[data.len() - 1]]);
        assert!(first.abs() < 1500);
        assert!(last.abs() < 1500);
    }
}
