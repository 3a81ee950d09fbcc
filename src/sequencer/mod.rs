// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core for playing generated patterns.
//!
//! This module provides the playback scheduler: the play/stop state
//! machine, the note-trigger timeline and the current-note index the
//! visualizer follows.

pub mod playback;

pub use playback::{
    PlaybackEvent, PlaybackScheduler, PlaybackState, Trigger, TriggerAction, END_MARGIN,
};
