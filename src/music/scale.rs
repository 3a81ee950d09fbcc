// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Scale registry for the random-walk generator.
//!
//! A scale here is a named, immutable set of exactly seven ascending pitches
//! spanning one octave. The registry is the only place scales come from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// MIDI note number type (0-127)
pub type MidiNote = u8;

/// Number of degrees in every registered scale
pub const DEGREES: usize = 7;

/// Pitch classes, spelled with sharps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Get pitch class from a semitone index (wraps at 12)
    pub fn from_semitone(pc: u8) -> Self {
        PitchClass::ALL[(pc % 12) as usize]
    }

    /// Semitone index (0-11)
    pub fn semitone(self) -> u8 {
        self as u8
    }

    /// Sharp spelling used in pitch names
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a pitch class from its name (e.g. "C", "F#", "Bb")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" | "B#" => Some(PitchClass::C),
            "C#" | "DB" => Some(PitchClass::Cs),
            "D" => Some(PitchClass::D),
            "D#" | "EB" => Some(PitchClass::Ds),
            "E" | "FB" => Some(PitchClass::E),
            "F" | "E#" => Some(PitchClass::F),
            "F#" | "GB" => Some(PitchClass::Fs),
            "G" => Some(PitchClass::G),
            "G#" | "AB" => Some(PitchClass::Gs),
            "A" => Some(PitchClass::A),
            "A#" | "BB" => Some(PitchClass::As),
            "B" | "CB" => Some(PitchClass::B),
            _ => None,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete pitch, identified by MIDI number and displayed by name ("C4").
///
/// Octave numbering follows the MIDI convention where middle C (60) is C4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(MidiNote);

impl Pitch {
    /// Create a pitch from a MIDI note number (0-127)
    pub fn from_midi(midi: MidiNote) -> Option<Self> {
        (midi <= 127).then_some(Pitch(midi))
    }

    /// Parse a pitch name such as "C4", "F#5" or "Bb3"
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let split = name.find(|c: char| c.is_ascii_digit() || c == '-')?;
        let (class, octave) = name.split_at(split);
        let class = PitchClass::parse(class)?;
        let octave: i32 = octave.parse().ok()?;
        let midi = octave
            .checked_add(1)?
            .checked_mul(12)?
            .checked_add(class.semitone() as i32)?;
        let midi = MidiNote::try_from(midi).ok()?;
        Pitch::from_midi(midi)
    }

    /// MIDI note number
    pub fn midi(self) -> MidiNote {
        self.0
    }

    /// Pitch class of this pitch
    pub fn class(self) -> PitchClass {
        PitchClass::from_semitone(self.0 % 12)
    }

    /// Octave number (C4 = middle C)
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Equal-tempered frequency in Hz, A4 = 440
    pub fn frequency(self) -> f64 {
        440.0 * 2f64.powf((self.0 as f64 - 69.0) / 12.0)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class(), self.octave())
    }
}

impl Serialize for Pitch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pitch {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Pitch::parse(&name)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid pitch name: {name}")))
    }
}

/// A named seven-degree scale.
///
/// Degrees are strictly ascending and lie within a single octave.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    name: &'static str,
    display_name: &'static str,
    degrees: [Pitch; DEGREES],
}

impl Scale {
    /// Build a scale from seven MIDI note numbers.
    ///
    /// Returns `None` unless the notes are valid, strictly ascending and
    /// span less than an octave.
    pub fn new(
        name: &'static str,
        display_name: &'static str,
        midi: [MidiNote; DEGREES],
    ) -> Option<Self> {
        let ascending = midi.windows(2).all(|w| w[0] < w[1]);
        let one_octave = ascending && midi[DEGREES - 1] - midi[0] < 12;
        if !ascending || !one_octave || midi[DEGREES - 1] > 127 {
            return None;
        }

        let degrees = midi.map(Pitch);
        Some(Self {
            name,
            display_name,
            degrees,
        })
    }

    /// Registry key (e.g. "c_major")
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable name (e.g. "C Major")
    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    /// Pitch at a scale degree (0-6)
    pub fn pitch_at(&self, degree: usize) -> Option<Pitch> {
        self.degrees.get(degree).copied()
    }

    /// All seven pitches, lowest first
    pub fn pitches(&self) -> &[Pitch; DEGREES] {
        &self.degrees
    }

    /// Number of degrees (always seven)
    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    /// Scales are never empty; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Highest valid degree index
    pub fn max_degree(&self) -> usize {
        DEGREES - 1
    }

    /// Check if a pitch is one of this scale's degrees
    pub fn contains(&self, pitch: Pitch) -> bool {
        self.degrees.contains(&pitch)
    }

    /// Degree index of a pitch, if it belongs to the scale
    pub fn degree_of(&self, pitch: Pitch) -> Option<usize> {
        self.degrees.iter().position(|&p| p == pitch)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name)
    }
}

const BUILTIN_SCALES: [(&str, &str, [MidiNote; DEGREES]); 5] = [
    ("c_major", "C Major", [60, 62, 64, 65, 67, 69, 71]),
    ("a_minor", "A Minor", [57, 59, 60, 62, 64, 65, 67]),
    ("d_major", "D Major", [62, 64, 66, 67, 69, 71, 73]),
    ("e_minor", "E Minor", [64, 66, 67, 69, 71, 72, 74]),
    ("g_major", "G Major", [67, 69, 71, 72, 74, 76, 78]),
];

/// Read-only registry of named scales
#[derive(Debug, Clone)]
pub struct ScaleRegistry {
    scales: Vec<Scale>,
}

impl ScaleRegistry {
    /// Create a registry from a list of scales
    pub fn new(scales: Vec<Scale>) -> Self {
        Self { scales }
    }

    /// Registry holding the five built-in scales
    pub fn builtin() -> Self {
        let scales = BUILTIN_SCALES
            .iter()
            .filter_map(|&(name, display, midi)| Scale::new(name, display, midi))
            .collect();
        Self { scales }
    }

    /// Look up a scale by registry key
    pub fn get(&self, name: &str) -> Option<&Scale> {
        self.scales.iter().find(|s| s.name == name)
    }

    /// Check if a scale name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered scale keys, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.scales.iter().map(|s| s.name).collect()
    }

    /// Iterate over all registered scales
    pub fn iter(&self) -> impl Iterator<Item = &Scale> {
        self.scales.iter()
    }
}

impl Default for ScaleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
