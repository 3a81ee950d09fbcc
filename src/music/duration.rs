// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Symbolic note durations.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration class of a generated note.
///
/// Serialized in transport notation: "8n", "4n", "16n".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteValue {
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
}

impl NoteValue {
    /// Note division: 4 = quarter, 8 = eighth, 16 = sixteenth
    pub fn division(self) -> u32 {
        match self {
            NoteValue::Quarter => 4,
            NoteValue::Eighth => 8,
            NoteValue::Sixteenth => 16,
        }
    }

    /// Length in beats (quarter notes)
    pub fn beats(self) -> f64 {
        4.0 / self.division() as f64
    }

    /// Wall-clock length at the given tempo
    pub fn length_at(self, bpm: f64) -> Duration {
        Duration::from_secs_f64(self.beats() * 60.0 / bpm)
    }

    /// Transport notation ("8n" etc.)
    pub fn notation(self) -> &'static str {
        match self {
            NoteValue::Quarter => "4n",
            NoteValue::Eighth => "8n",
            NoteValue::Sixteenth => "16n",
        }
    }

    /// Parse transport notation
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "4n" => Some(NoteValue::Quarter),
            "8n" => Some(NoteValue::Eighth),
            "16n" => Some(NoteValue::Sixteenth),
            _ => None,
        }
    }
}

impl fmt::Display for NoteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}
