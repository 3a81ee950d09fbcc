// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Generative engines for algorithmic melody creation.
//!
//! Generators are pure: they read a scale from the registry, draw from an
//! injected random source, and return a brand-new immutable [`Pattern`].

pub mod walk;

pub use walk::PatternGenerator;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::music::{NoteValue, Pitch, ScaleRegistry};

/// Source of uniform random integers for generators.
///
/// Every `rand::Rng` is a source, so seeded `StdRng`s give reproducible
/// patterns. Tests can also script exact draws.
pub trait RandomSource {
    /// Uniform integer in `0..bound`; `bound` is never zero
    fn next_below(&mut self, bound: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_below(&mut self, bound: usize) -> usize {
        self.gen_range(0..bound)
    }
}

/// One note of a generated pattern
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternNote {
    /// Pitch name derived from the scale degree
    #[serde(rename = "note")]
    pub pitch: Pitch,
    /// Offset from pattern start, in transport time units
    #[serde(rename = "time")]
    pub start_offset: f64,
    /// Symbolic duration class
    pub duration: NoteValue,
    /// Scale degree (0-6) the pitch was taken from
    #[serde(skip)]
    pub degree: usize,
}

/// Ordered, immutable output of one generation run
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Pattern {
    scale: String,
    notes: Vec<PatternNote>,
}

/// Wire form of a note; the degree is recovered from the scale
#[derive(Deserialize)]
struct NoteRecord {
    note: Pitch,
    time: f64,
    duration: NoteValue,
}

#[derive(Deserialize)]
struct PatternRecord {
    scale: String,
    notes: Vec<NoteRecord>,
}

impl Pattern {
    /// Create a pattern from notes in playback order
    pub fn new(scale: impl Into<String>, notes: Vec<PatternNote>) -> Self {
        Self {
            notes,
            scale: scale.into(),
        }
    }

    /// Notes in generation order
    pub fn notes(&self) -> &[PatternNote] {
        &self.notes
    }

    /// Note at a position
    pub fn get(&self, index: usize) -> Option<&PatternNote> {
        self.notes.get(index)
    }

    /// Number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Name of the scale this pattern was generated from
    pub fn scale_name(&self) -> &str {
        &self.scale
    }

    /// Offset of the final note, if any
    pub fn last_offset(&self) -> Option<f64> {
        self.notes.last().map(|n| n.start_offset)
    }

    /// Serialize as `{"scale", "notes": [{"note", "time", "duration"}, ...]}`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse the JSON form produced by [`Pattern::to_json`].
    ///
    /// The scale must be in `registry` and every note must be one of its
    /// degrees. Offsets must be finite, non-negative and non-decreasing.
    pub fn from_json(json: &str, registry: &ScaleRegistry) -> Result<Self> {
        let record: PatternRecord =
            serde_json::from_str(json).map_err(|e| Error::InvalidPattern(e.to_string()))?;
        let scale = registry
            .get(&record.scale)
            .ok_or_else(|| Error::InvalidScale(record.scale.clone()))?;

        let mut notes = Vec::with_capacity(record.notes.len());
        let mut last = 0.0;
        for (i, note) in record.notes.into_iter().enumerate() {
            let degree = scale.degree_of(note.note).ok_or_else(|| {
                Error::InvalidPattern(format!("note {} ({}) is not in {}", i, note.note, scale.name()))
            })?;
            if !note.time.is_finite() || note.time < last {
                return Err(Error::InvalidPattern(format!(
                    "note {} starts at {} after {}",
                    i, note.time, last
                )));
            }
            last = note.time;

            notes.push(PatternNote {
                pitch: note.note,
                start_offset: note.time,
                duration: note.duration,
                degree,
            });
        }

        Ok(Pattern::new(scale.name(), notes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn note(midi: u8, time: f64, duration: NoteValue) -> PatternNote {
        PatternNote {
            pitch: Pitch::from_midi(midi).unwrap(),
            start_offset: time,
            duration,
            degree: 0,
        }
    }

    #[test]
    fn test_rng_is_random_source() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(rng.next_below(5) < 5);
        }
        assert_eq!(rng.next_below(1), 0);
    }

    #[test]
    fn test_pattern_accessors() {
        let pattern = Pattern::new(
            "c_major",
            vec![note(60, 0.0, NoteValue::Eighth), note(62, 0.5, NoteValue::Quarter)],
        );
        assert_eq!(pattern.len(), 2);
        assert!(!pattern.is_empty());
        assert_eq!(pattern.scale_name(), "c_major");
        assert_eq!(pattern.last_offset(), Some(0.5));
        assert_eq!(pattern.get(1).unwrap().pitch.to_string(), "D4");
        assert!(Pattern::default().last_offset().is_none());
    }

    #[test]
    fn test_pattern_json_shape() {
        let pattern = Pattern::new("d_major", vec![note(66, 1.5, NoteValue::Sixteenth)]);
        let json = pattern.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["scale"], "d_major");
        assert_eq!(value["notes"][0]["note"], "F#4");
        assert_eq!(value["notes"][0]["time"], 1.5);
        assert_eq!(value["notes"][0]["duration"], "16n");
        assert!(value["notes"][0].get("degree").is_none());
    }

    #[test]
    fn test_from_json_restores_degrees_and_scale() {
        let registry = ScaleRegistry::builtin();
        let generated = PatternGenerator::new()
            .generate("g_major", 12, &mut StdRng::seed_from_u64(4))
            .unwrap();

        let parsed = Pattern::from_json(&generated.to_json().unwrap(), &registry).unwrap();
        assert_eq!(parsed, generated);
        assert_eq!(parsed.scale_name(), "g_major");
        let degrees: Vec<usize> = parsed.notes().iter().map(|n| n.degree).collect();
        let expected: Vec<usize> = generated.notes().iter().map(|n| n.degree).collect();
        assert_eq!(degrees, expected);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let registry = ScaleRegistry::builtin();
        let parse = |json: &str| Pattern::from_json(json, &registry);

        // Octave far outside the MIDI range
        assert!(matches!(
            parse(r#"{"scale":"c_major","notes":[{"note":"C3000","time":0.0,"duration":"8n"}]}"#),
            Err(Error::InvalidPattern(_))
        ));
        // Scale key is required
        assert!(matches!(
            parse(r#"{"notes":[{"note":"C4","time":0.0,"duration":"8n"}]}"#),
            Err(Error::InvalidPattern(_))
        ));
        assert!(matches!(
            parse(r#"{"scale":"h_major","notes":[]}"#),
            Err(Error::InvalidScale(_))
        ));
        // F#4 is not in C major
        assert!(matches!(
            parse(r#"{"scale":"c_major","notes":[{"note":"F#4","time":0.0,"duration":"8n"}]}"#),
            Err(Error::InvalidPattern(_))
        ));
        // Offsets may not go backwards
        assert!(matches!(
            parse(
                r#"{"scale":"c_major","notes":[
                    {"note":"C4","time":1.0,"duration":"8n"},
                    {"note":"D4","time":0.5,"duration":"8n"}]}"#
            ),
            Err(Error::InvalidPattern(_))
        ));
        assert!(matches!(
            parse(r#"{"scale":"c_major","notes":[{"note":"C4","time":-1.0,"duration":"8n"}]}"#),
            Err(Error::InvalidPattern(_))
        ));
    }
}
