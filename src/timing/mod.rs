// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and transport module.
//!
//! This module provides the tempo-scaled transport timeline that playback
//! triggers are armed against.

pub mod transport;

pub use transport::{
    ScheduledTrigger, Transport, TransportState, TriggerId, MAX_BPM, MIN_BPM, REFERENCE_BPM,
};
