// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal visualizer for walkseq.
//!
//! Observes playback through the scheduler's event queue and draws the
//! pattern grid with the playhead. Nothing here feeds back into playback.

pub mod pattern_view;

pub use pattern_view::{grid_rows, CellState, PatternView, PatternWidget, COLUMNS};
