//! Sound cues and background music
//!
//! Nothing here produces samples. Cues describe short oscillator tones and
//! the music scheduler hands out pentatonic notes on a tempo tied to the
//! scroll speed; the host synthesizes both.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

/// One oscillator tone inside a cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_s: f32,
    /// Offset from the cue start
    pub delay_ms: u32,
    pub waveform: Waveform,
}

const fn tone(frequency_hz: f32, duration_s: f32, delay_ms: u32, waveform: Waveform) -> Tone {
    Tone {
        frequency_hz,
        duration_s,
        delay_ms,
        waveform,
    }
}

/// Starting gain of every cue tone at full sfx volume; it ramps down to
/// 0.01 over the tone
pub const CUE_GAIN: f32 = 0.3;

/// Starting tone gain for cues at the given sfx volume
pub fn cue_gain(sfx_gain: f32) -> f32 {
    CUE_GAIN * sfx_gain.clamp(0.0, 1.0)
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player hit an obstacle (shielded or not)
    Collision,
    /// Power-up collected
    PowerUp,
    /// Achievement unlocked
    Achievement,
    /// Last life lost
    GameOver,
}

impl SoundCue {
    /// Tones making up this cue
    pub fn tones(&self) -> &'static [Tone] {
        static COLLISION: [Tone; 1] = [tone(220.0, 0.1, 0, Waveform::Sawtooth)];
        static POWER_UP: [Tone; 3] = [
            tone(523.25, 0.1, 0, Waveform::Sine),
            tone(659.25, 0.1, 100, Waveform::Sine),
            tone(783.99, 0.2, 200, Waveform::Sine),
        ];
        static ACHIEVEMENT: [Tone; 3] = [
            tone(659.25, 0.1, 0, Waveform::Sine),
            tone(783.99, 0.1, 150, Waveform::Sine),
            tone(1046.5, 0.2, 300, Waveform::Sine),
        ];
        static GAME_OVER: [Tone; 3] = [
            tone(440.0, 0.2, 0, Waveform::Square),
            tone(330.0, 0.2, 200, Waveform::Square),
            tone(220.0, 0.3, 400, Waveform::Square),
        ];

        match self {
            SoundCue::Collision => &COLLISION,
            SoundCue::PowerUp => &POWER_UP,
            SoundCue::Achievement => &ACHIEVEMENT,
            SoundCue::GameOver => &GAME_OVER,
        }
    }
}

/// Pentatonic scale the music draws from
pub const SCALE: [(&str, f32); 8] = [
    ("C4", 261.63),
    ("D4", 293.66),
    ("E4", 329.63),
    ("G4", 392.0),
    ("A4", 440.0),
    ("C5", 523.25),
    ("D5", 587.33),
    ("E5", 659.25),
];

/// Base gap between notes at normal speed
pub const BASE_TEMPO_MS: f64 = 500.0;
/// Fastest tempo regardless of speed
pub const MIN_TEMPO_MS: f64 = 100.0;

/// Share of the tempo a note sounds for; the rest is silence
const NOTE_FRACTION: f64 = 0.8;

/// A note the host should play now
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MusicNote {
    pub name: &'static str,
    pub frequency_hz: f32,
    pub duration_ms: f64,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    NoteEnd,
    NextNote,
}

/// Background music timer, polled once per frame
#[derive(Debug, Clone)]
pub struct MusicScheduler {
    playing: bool,
    tempo_ms: f64,
    volume: f32,
    /// Pending timer: when it fires and what it does
    pending: Option<(f64, Step)>,
    rng: Pcg32,
}

impl MusicScheduler {
    pub fn new(seed: u64, volume: f32) -> Self {
        Self {
            playing: false,
            tempo_ms: BASE_TEMPO_MS,
            volume: volume.clamp(0.0, 1.0),
            pending: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn tempo_ms(&self) -> f64 {
        self.tempo_ms
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Start playing; the first note sounds on the next poll at or after `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.pending = Some((now_ms, Step::NextNote));
        log::debug!("Music started");
    }

    /// Stop and cancel the pending timer
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        self.pending = None;
        log::debug!("Music stopped");
    }

    /// Follow the combined scroll speed multiplier
    pub fn set_tempo(&mut self, speed: f32) {
        self.tempo_ms = if speed > 0.0 {
            (BASE_TEMPO_MS / f64::from(speed)).max(MIN_TEMPO_MS)
        } else {
            BASE_TEMPO_MS
        };
    }

    /// Gain for notes handed out from now on; 0 keeps the timer running silently
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Advance the timer; returns a note when one should start now
    pub fn poll(&mut self, now_ms: f64) -> Option<MusicNote> {
        if !self.playing {
            return None;
        }
        let (due, step) = self.pending?;
        if now_ms < due {
            return None;
        }

        match step {
            Step::NoteEnd => {
                let rest_ms = self.tempo_ms - self.tempo_ms * NOTE_FRACTION;
                self.pending = Some((now_ms + rest_ms, Step::NextNote));
                None
            }
            Step::NextNote => {
                let duration_ms = self.tempo_ms * NOTE_FRACTION;
                let (name, frequency_hz) = SCALE[self.rng.random_range(0..SCALE.len())];
                self.pending = Some((now_ms + duration_ms, Step::NoteEnd));
                Some(MusicNote {
                    name,
                    frequency_hz,
                    duration_ms,
                    volume: self.volume,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_tables() {
        assert_eq!(SoundCue::Collision.tones().len(), 1);
        assert_eq!(SoundCue::Collision.tones()[0].waveform, Waveform::Sawtooth);
        let over = SoundCue::GameOver.tones();
        assert_eq!(over.iter().map(|t| t.delay_ms).collect::<Vec<_>>(), vec![0, 200, 400]);
        assert_eq!(over[2].duration_s, 0.3);
        assert_eq!(SoundCue::Achievement.tones()[2].frequency_hz, 1046.5);
    }

    #[test]
    fn test_tempo_follows_speed_with_floor() {
        let mut music = MusicScheduler::new(1, 0.2);
        music.set_tempo(2.0);
        assert_eq!(music.tempo_ms(), 250.0);
        music.set_tempo(1.5 * 4.0);
        assert_eq!(music.tempo_ms(), MIN_TEMPO_MS);
        music.set_tempo(0.0);
        assert_eq!(music.tempo_ms(), BASE_TEMPO_MS);
    }

    #[test]
    fn test_note_rest_cycle() {
        let mut music = MusicScheduler::new(7, 0.2);
        assert!(music.poll(0.0).is_none(), "silent until started");

        music.start(1_000.0);
        let note = music.poll(1_000.0).expect("first note");
        assert_eq!(note.duration_ms, 400.0);
        assert!(SCALE.iter().any(|(name, f)| *name == note.name && *f == note.frequency_hz));

        assert!(music.poll(1_399.0).is_none());
        assert!(music.poll(1_400.0).is_none(), "note ends, rest begins");
        assert!(music.poll(1_499.0).is_none());
        assert!(music.poll(1_500.0).is_some(), "next note after the rest");
    }

    #[test]
    fn test_stop_cancels_pending_timer() {
        let mut music = MusicScheduler::new(3, 0.2);
        music.start(0.0);
        music.poll(0.0);
        music.stop();
        assert!(!music.is_playing());
        assert!(music.poll(10_000.0).is_none());

        music.start(20_000.0);
        assert!(music.poll(20_000.0).is_some());
    }

    #[test]
    fn test_volume_applies_to_next_note() {
        let mut music = MusicScheduler::new(3, 0.0);
        music.start(0.0);
        assert_eq!(music.poll(0.0).map(|n| n.volume), Some(0.0));

        music.set_volume(1.7);
        assert_eq!(music.volume(), 1.0);
        music.set_volume(0.25);
        assert!(music.poll(400.0).is_none());
        assert_eq!(music.poll(500.0).map(|n| n.volume), Some(0.25));
    }

    #[test]
    fn test_cue_gain_scales_with_sfx_volume() {
        assert_eq!(cue_gain(1.0), CUE_GAIN);
        assert_eq!(cue_gain(0.5), 0.15);
        assert_eq!(cue_gain(0.0), 0.0);
        assert_eq!(cue_gain(3.0), CUE_GAIN);
    }

    #[test]
    fn test_seeded_melody_repeats() {
        let melody = |seed| {
            let mut music = MusicScheduler::new(seed, 0.2);
            music.start(0.0);
            (0..400)
                .filter_map(|t| music.poll(f64::from(t) * 10.0))
                .map(|n| n.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(melody(11), melody(11));
    }
}
