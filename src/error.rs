// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for walkseq

use thiserror::Error;

use crate::audio::AudioError;

/// Precondition failures reported by generation and playback.
///
/// None of these leave partial state behind.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown scale: {0}")]
    InvalidScale(String),
    #[error("Invalid pattern length: {0} (must be at least 1)")]
    InvalidLength(i64),
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("No pattern to play")]
    EmptyPattern,
    #[error("Invalid tempo: {0} BPM (must be between 60 and 180)")]
    InvalidTempo(f64),
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

pub type Result<T> = std::result::Result<T, Error>;
