// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Live audio output via cpal.
//!
//! `LiveSynth` streams the voice mix to the default output device while
//! keeping a `ToneSynth` recording of everything it played, so a live run
//! can also be written to a WAV file.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use tracing::{error, info};

use super::mixer::VoiceMixer;
use super::synth::{Envelope, ToneSynth, Voice};
use super::{AudioError, Synthesizer};
use crate::music::Pitch;

/// Scheduling headroom between a trigger and its first audible frame
pub const DEFAULT_LEAD: Duration = Duration::from_millis(50);

/// Open output stream on the default device
pub struct AudioOutput {
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default output device and start streaming.
    ///
    /// `callback` fills an interleaved f32 buffer with the given channel count.
    pub fn new<F>(mut callback: F) -> Result<Self, AudioError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let supported = device.default_output_config().map_err(|e| {
            AudioError::ActivationFailed(format!("Failed to get default config: {}", e))
        })?;
        let sample_format = supported.sample_format();
        let stream_config: StreamConfig = supported.into();
        let channels = stream_config.channels;
        let sample_rate = stream_config.sample_rate.0;

        let on_error = |err| error!("Audio stream error: {}", err);
        let stream = match sample_format {
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback(data, channels as usize);
                },
                on_error,
                None,
            ),
            SampleFormat::I16 => {
                let mut scratch = Vec::new();
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        scratch.resize(data.len(), 0.0f32);
                        callback(&mut scratch, channels as usize);
                        for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                            *out = (sample * i16::MAX as f32) as i16;
                        }
                    },
                    on_error,
                    None,
                )
            }
            other => {
                return Err(AudioError::ActivationFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| AudioError::ActivationFailed(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::ActivationFailed(format!("Failed to start stream: {}", e)))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate, channels, "Audio output started"
        );

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// Synthesizer that plays through the default output device
pub struct LiveSynth {
    mixer: Arc<Mutex<VoiceMixer>>,
    output: Option<AudioOutput>,
    recording: ToneSynth,
    /// Stream frame that transport time zero maps to
    origin: Option<u64>,
    lead: Duration,
    disposed: bool,
}

impl LiveSynth {
    /// Create an inactive synth. `sample_rate` applies to the recording;
    /// the stream runs at the device rate.
    pub fn new(sample_rate: u32) -> Self {
        let recording = ToneSynth::new(sample_rate);
        let mixer = VoiceMixer::new(sample_rate, recording.envelope());
        Self {
            mixer: Arc::new(Mutex::new(mixer)),
            output: None,
            recording,
            origin: None,
            lead: DEFAULT_LEAD,
            disposed: false,
        }
    }

    /// Use a custom envelope for both the stream and the recording
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.recording = self.recording.with_envelope(envelope);
        let sample_rate = self.lock_mixer().sample_rate();
        self.mixer = Arc::new(Mutex::new(VoiceMixer::new(sample_rate, envelope)));
        self
    }

    /// Set the scheduling headroom
    pub fn with_lead(mut self, lead: Duration) -> Self {
        self.lead = lead;
        self
    }

    /// Everything sounded so far, for offline rendering
    pub fn recording(&self) -> &ToneSynth {
        &self.recording
    }

    pub fn is_active(&self) -> bool {
        self.output.is_some()
    }

    fn lock_mixer(&self) -> MutexGuard<'_, VoiceMixer> {
        self.mixer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Synthesizer for LiveSynth {
    async fn activate(&mut self) -> Result<(), AudioError> {
        if self.disposed {
            return Err(AudioError::Disposed);
        }
        if self.output.is_some() {
            return Ok(());
        }

        let mixer = Arc::clone(&self.mixer);
        let output = AudioOutput::new(move |data, channels| {
            mixer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .fill(data, channels);
        })?;
        self.lock_mixer().set_sample_rate(output.sample_rate());
        self.recording.activate().await?;
        self.output = Some(output);
        Ok(())
    }

    fn clock_started(&mut self) {
        self.origin = None;
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
        if self.output.is_none() {
            return Err(AudioError::NotActive);
        }
        self.recording.sound_note(pitch, length, at)?;

        let lead = self.lead;
        let mut mixer = self.mixer.lock().unwrap_or_else(PoisonError::into_inner);
        let at_frames = mixer.frames(at);
        let lead_frames = mixer.frames(lead);
        let now = mixer.frame();
        // First note after a transport start pins the timeline to the stream
        let origin = *self
            .origin
            .get_or_insert_with(|| (now + lead_frames).saturating_sub(at_frames));
        mixer.schedule(
            Voice {
                pitch,
                start: at,
                length,
            },
            origin + at_frames,
        );
        Ok(())
    }

    fn dispose(&mut self) {
        self.output = None;
        self.lock_mixer().clear();
        self.recording.dispose();
        self.disposed = true;
    }
}
