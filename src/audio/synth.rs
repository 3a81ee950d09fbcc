// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Triangle-wave tone synth.
//!
//! Notes are collected as voices while playback runs and mixed down to a
//! mono buffer on demand.

use std::time::Duration;

use tracing::debug;

use super::{AudioError, Synthesizer};
use crate::music::Pitch;

/// Level of a single voice before mixing
pub const VOICE_GAIN: f32 = 0.25;

/// ADSR envelope, times in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    /// Sustain level (0.0 - 1.0)
    pub sustain: f64,
    pub release: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.1,
            sustain: 0.3,
            release: 0.5,
        }
    }
}

impl Envelope {
    /// Level `t` seconds into the gate, ignoring release
    fn held_level(&self, t: f64) -> f64 {
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 - (1.0 - self.sustain) * (t - self.attack) / self.decay
        } else {
            self.sustain
        }
    }

    /// Level `t` seconds after note start for a gate of `gate` seconds
    pub fn level(&self, t: f64, gate: f64) -> f64 {
        if t < 0.0 {
            0.0
        } else if t < gate {
            self.held_level(t)
        } else {
            let released = (t - gate) / self.release;
            (self.held_level(gate) * (1.0 - released)).max(0.0)
        }
    }
}

/// A note captured for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub pitch: Pitch,
    pub start: Duration,
    pub length: Duration,
}

impl Voice {
    /// Unscaled triangle sample `t` seconds after the voice starts
    pub fn sample(&self, t: f64, envelope: &Envelope) -> f64 {
        let phase = (t * self.pitch.frequency()).fract();
        let triangle = 4.0 * (phase - 0.5).abs() - 1.0;
        triangle * envelope.level(t, self.length.as_secs_f64())
    }

    /// Sounding time including the release tail
    pub fn span(&self, envelope: &Envelope) -> Duration {
        self.length + Duration::from_secs_f64(envelope.release)
    }
}

/// Offline triangle-wave synthesizer
#[derive(Debug)]
pub struct ToneSynth {
    sample_rate: u32,
    envelope: Envelope,
    /// Per-voice gain
    gain: f32,
    voices: Vec<Voice>,
    active: bool,
    disposed: bool,
}

impl ToneSynth {
    /// Create a synth rendering at `sample_rate`
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            envelope: Envelope::default(),
            gain: VOICE_GAIN,
            voices: Vec::new(),
            active: false,
            disposed: false,
        }
    }

    /// Use a custom envelope
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Voices sounded so far, in the order they were triggered
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Drop all captured voices
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Envelope applied to every voice
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Time at which the last release tail ends
    pub fn tail_end(&self) -> Duration {
        self.voices
            .iter()
            .map(|v| v.start + v.span(&self.envelope))
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Mix every voice into a mono buffer long enough for all release tails
    pub fn render(&self) -> Vec<f32> {
        self.render_for(self.tail_end())
    }

    /// Mix every voice into a mono buffer of exactly `total`
    pub fn render_for(&self, total: Duration) -> Vec<f32> {
        let sr = self.sample_rate as f64;
        let len = (total.as_secs_f64() * sr).round() as usize;
        let mut buffer = vec![0.0f32; len];

        for voice in &self.voices {
            let first = (voice.start.as_secs_f64() * sr).round() as usize;
            let last = ((voice.start + voice.span(&self.envelope)).as_secs_f64() * sr).ceil() as usize;

            for (i, sample) in buffer
                .iter_mut()
                .enumerate()
                .take(last.min(len))
                .skip(first)
            {
                let t = (i - first) as f64 / sr;
                *sample += voice.sample(t, &self.envelope) as f32 * self.gain;
            }
        }

        for sample in buffer.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
        buffer
    }
}

impl Default for ToneSynth {
    fn default() -> Self {
        Self::new(44100)
    }
}

impl Synthesizer for ToneSynth {
    async fn activate(&mut self) -> Result<(), AudioError> {
        if self.disposed {
            return Err(AudioError::Disposed);
        }
        if !self.active {
            debug!(sample_rate = self.sample_rate, "Tone synth activated");
            self.active = true;
        }
        Ok(())
    }

    fn sound_note(
        &mut self,
        pitch: Pitch,
        length: Duration,
        at: Duration,
    ) -> Result<(), AudioError> {
        if self.disposed {
            return Err(AudioError::Disposed);
        }
        if !self.active {
            return Err(AudioError::NotActive);
        }
        self.voices.push(Voice {
            pitch,
            start: at,
            length,
        });
        Ok(())
    }

    fn dispose(&mut self) {
        self.active = false;
        self.disposed = true;
    }
}
