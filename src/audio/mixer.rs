// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Streaming voice mixer.
//!
//! Voices are placed at absolute frame positions on the output stream's
//! clock. The audio callback pulls interleaved buffers with [`VoiceMixer::fill`],
//! which advances that clock.

use std::time::Duration;

use super::synth::{Envelope, Voice, VOICE_GAIN};

/// A voice placed on the stream clock
#[derive(Debug, Clone, Copy)]
struct PlacedVoice {
    voice: Voice,
    start_frame: u64,
    end_frame: u64,
}

/// Mixes scheduled voices into an output stream
#[derive(Debug)]
pub struct VoiceMixer {
    sample_rate: u32,
    envelope: Envelope,
    /// Frames rendered since the stream started
    frame: u64,
    voices: Vec<PlacedVoice>,
}

impl VoiceMixer {
    pub fn new(sample_rate: u32, envelope: Envelope) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            envelope,
            frame: 0,
            voices: Vec::with_capacity(32),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Follow the device rate once the stream is open
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate.max(1);
    }

    /// Current position of the stream clock, in frames
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Convert a duration to frames at the current rate
    pub fn frames(&self, duration: Duration) -> u64 {
        (duration.as_secs_f64() * self.sample_rate as f64).round() as u64
    }

    /// Voices still sounding or waiting to start
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Place a voice so it starts at `start_frame`. A start already in the
    /// past joins the voice partway through.
    pub fn schedule(&mut self, voice: Voice, start_frame: u64) {
        let end_frame = start_frame + self.frames(voice.span(&self.envelope));
        self.voices.push(PlacedVoice {
            voice,
            start_frame,
            end_frame,
        });
    }

    /// Drop every voice
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Overwrite an interleaved buffer with the next frames of the mix
    pub fn fill(&mut self, out: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        let sr = self.sample_rate as f64;
        let frames = out.len() / channels;

        for (i, frame) in out.chunks_mut(channels).enumerate() {
            let now = self.frame + i as u64;
            let mut mix = 0.0f32;
            for placed in &self.voices {
                if now >= placed.start_frame && now < placed.end_frame {
                    let t = (now - placed.start_frame) as f64 / sr;
                    mix += placed.voice.sample(t, &self.envelope) as f32 * VOICE_GAIN;
                }
            }
            frame.fill(mix.clamp(-1.0, 1.0));
        }

        self.frame += frames as u64;
        let now = self.frame;
        self.voices.retain(|v| v.end_frame > now);
    }
}
