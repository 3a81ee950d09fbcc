// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities for walkseq.
//!
//! This module provides pitch naming, the fixed registry of seven-degree
//! scales the generator walks over, and the symbolic note durations.

pub mod duration;
pub mod scale;

pub use duration::NoteValue;
pub use scale::{MidiNote, Pitch, PitchClass, Scale, ScaleRegistry, DEGREES};
