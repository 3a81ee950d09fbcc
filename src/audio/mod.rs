// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio collaborators for playback.
//!
//! This module provides:
//! - The `Synthesizer` capability the playback scheduler drives
//! - A triangle-wave tone synth that renders offline
//! - A streaming voice mixer and, with the `live` feature, a synth that
//!   plays through the default output device
//! - WAV export of rendered audio

#[cfg(feature = "live")]
pub mod live;
pub mod mixer;
pub mod synth;
pub mod wav;

#[cfg(feature = "live")]
pub use live::{AudioOutput, LiveSynth};
pub use mixer::VoiceMixer;
pub use synth::{Envelope, ToneSynth, Voice};
pub use wav::write_wav;

use std::time::Duration;

use thiserror::Error;

use crate::music::Pitch;

/// Something that can sound pitched notes at transport-relative times.
///
/// A synthesizer is constructed once, handed to the playback scheduler, and
/// disposed exactly once when the scheduler is torn down.
#[allow(async_fn_in_trait)]
pub trait Synthesizer {
    /// Make the audio context ready to sound notes.
    ///
    /// This may wait on the host (a user gesture, a device coming up).
    /// Calling it again once ready is cheap.
    async fn activate(&mut self) -> Result<(), AudioError>;

    /// The transport started from zero; later `at` offsets count from now
    fn clock_started(&mut self) {}

    /// Sound `pitch` for `length`, starting `at` after transport start
    fn sound_note(&mut self, pitch: Pitch, length: Duration, at: Duration)
        -> Result<(), AudioError>;

    /// Release the audio context
    fn dispose(&mut self) {}
}

/// Audio error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AudioError {
    /// Audio context has not been activated yet
    #[error("Audio context is not active")]
    NotActive,
    /// No output device available
    #[error("No audio output device found")]
    NoDevice,
    /// Audio context could not be activated
    #[error("Audio activation failed: {0}")]
    ActivationFailed(String),
    /// Synthesizer was already disposed
    #[error("Synthesizer has been disposed")]
    Disposed,
    /// A single note could not be rendered
    #[error("Failed to render note: {0}")]
    RenderFailed(String),
}
