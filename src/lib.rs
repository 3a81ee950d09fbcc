// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! walkseq - random-walk melody generator and pattern player.
//!
//! Patterns are generated by a constrained random walk over a fixed scale
//! ([`generators`]) and played back against a tempo-scaled transport
//! ([`sequencer`]) that drives a synthesizer ([`audio`]) and reports the
//! playhead to a visualizer ([`ui`]).

pub mod audio;
pub mod config;
pub mod error;
pub mod generators;
pub mod music;
pub mod sequencer;
pub mod timing;
pub mod ui;

pub use error::{Error, Result};
pub use generators::{Pattern, PatternGenerator, PatternNote, RandomSource};
pub use sequencer::{PlaybackEvent, PlaybackScheduler, PlaybackState};
