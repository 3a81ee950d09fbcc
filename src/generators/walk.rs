// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Constrained random-walk melody generator.
//!
//! The walk starts on a random degree and moves by -2..=2 degrees per note.
//! Steps that would leave the scale are clamped to the edge degree, so the
//! walk lingers at the extremes rather than wrapping. Notes are spaced a
//! fixed half time unit apart whatever their duration class.

use tracing::debug;

use super::{Pattern, PatternNote, RandomSource};
use crate::error::{Error, Result};
use crate::music::{NoteValue, ScaleRegistry};

/// Scale used when none is requested
pub const DEFAULT_SCALE: &str = "c_major";

/// Pattern length used when none is requested
pub const DEFAULT_LENGTH: i64 = 16;

/// Spacing between consecutive note onsets, in transport time units
pub const TIME_STEP: f64 = 0.5;

/// Degree steps, drawn uniformly
pub const STEP_CHOICES: [i32; 5] = [-2, -1, 0, 1, 2];

/// Duration table, drawn uniformly; eighths are three times as likely
pub const DURATION_CHOICES: [NoteValue; 5] = [
    NoteValue::Eighth,
    NoteValue::Eighth,
    NoteValue::Eighth,
    NoteValue::Quarter,
    NoteValue::Sixteenth,
];

/// Clamp a walk step into `0..=max_degree`
pub fn clamp_step(degree: usize, step: i32, max_degree: usize) -> usize {
    (degree as i32 + step).clamp(0, max_degree as i32) as usize
}

/// Random-walk pattern generator over a scale registry
#[derive(Debug, Clone, Default)]
pub struct PatternGenerator {
    registry: ScaleRegistry,
}

impl PatternGenerator {
    /// Create a generator over the built-in scales
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator over a custom registry
    pub fn with_registry(registry: ScaleRegistry) -> Self {
        Self { registry }
    }

    /// The registry scales are looked up in
    pub fn registry(&self) -> &ScaleRegistry {
        &self.registry
    }

    /// Generate a pattern of `length` notes over the named scale.
    ///
    /// Fails with [`Error::InvalidScale`] for an unregistered scale and
    /// [`Error::InvalidLength`] for `length <= 0`, before drawing anything.
    ///
    /// Draw order is fixed: the start degree, then per note the duration
    /// followed by the step.
    pub fn generate<R>(&self, scale_name: &str, length: i64, rng: &mut R) -> Result<Pattern>
    where
        R: RandomSource + ?Sized,
    {
        let scale = self
            .registry
            .get(scale_name)
            .ok_or_else(|| Error::InvalidScale(scale_name.to_string()))?;
        if length <= 0 {
            return Err(Error::InvalidLength(length));
        }

        let length = length as usize;
        let max_degree = scale.max_degree();
        let mut degree = rng.next_below(scale.len());
        let mut notes = Vec::with_capacity(length);

        for i in 0..length {
            let pitch = scale.pitches()[degree];
            let duration = DURATION_CHOICES[rng.next_below(DURATION_CHOICES.len())];

            notes.push(PatternNote {
                pitch,
                start_offset: i as f64 * TIME_STEP,
                duration,
                degree,
            });

            let step = STEP_CHOICES[rng.next_below(STEP_CHOICES.len())];
            degree = clamp_step(degree, step, max_degree);
        }

        debug!(scale = scale_name, length, "Generated pattern");
        Ok(Pattern::new(scale.name(), notes))
    }

    /// Generate a 16-note C major pattern
    pub fn generate_default<R>(&self, rng: &mut R) -> Result<Pattern>
    where
        R: RandomSource + ?Sized,
    {
        self.generate(DEFAULT_SCALE, DEFAULT_LENGTH, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::VecDeque;

    /// Replays a fixed list of draws
    struct ScriptedSource {
        draws: VecDeque<usize>,
    }

    impl ScriptedSource {
        fn new(draws: &[usize]) -> Self {
            Self {
                draws: draws.iter().copied().collect(),
            }
        }
    }

    impl RandomSource for ScriptedSource {
        fn next_below(&mut self, bound: usize) -> usize {
            let draw = self.draws.pop_front().expect("script exhausted");
            assert!(draw < bound);
            draw
        }
    }

    #[test]
    fn test_length_and_offsets() {
        let gen = PatternGenerator::new();
        let mut rng = StdRng::seed_from_u64(1);

        for length in [1, 2, 16, 100] {
            let pattern = gen.generate("c_major", length, &mut rng).unwrap();
            assert_eq!(pattern.len(), length as usize);
            for (i, note) in pattern.notes().iter().enumerate() {
                assert_eq!(note.start_offset, i as f64 * 0.5);
            }
        }
    }

    #[test]
    fn test_pitches_stay_in_scale() {
        let gen = PatternGenerator::new();
        let mut rng = StdRng::seed_from_u64(42);

        for scale in gen.registry().iter() {
            for _ in 0..50 {
                let pattern = gen.generate(scale.name(), 32, &mut rng).unwrap();
                for note in pattern.notes() {
                    assert!(scale.contains(note.pitch), "{} not in {}", note.pitch, scale);
                    assert_eq!(scale.pitch_at(note.degree), Some(note.pitch));
                }
            }
        }
    }

    #[test]
    fn test_walk_steps_are_bounded() {
        let gen = PatternGenerator::new();
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..200 {
            let pattern = gen.generate("e_minor", 16, &mut rng).unwrap();
            for pair in pattern.notes().windows(2) {
                let delta = pair[1].degree as i32 - pair[0].degree as i32;
                assert!((-2..=2).contains(&delta));
                assert!(pair[1].degree <= 6);
            }
        }
    }

    #[test]
    fn test_scripted_walk_clamps_at_edges() {
        let gen = PatternGenerator::new();
        // start at degree 1; then (duration, step) pairs
        // step index 0 => -2, 4 => +2
        let mut rng = ScriptedSource::new(&[
            1, // start degree
            0, 0, // eighth, -2 -> clamped to 0
            3, 0, // quarter, -2 -> stays 0
            4, 4, // sixteenth, +2 -> 2
            1, 4, // eighth, +2 -> 4
            2, 4, // eighth, +2 -> 6
            0, 4, // eighth, +2 -> stays 6
            0, 2, // eighth, 0
        ]);

        let pattern = gen.generate("c_major", 7, &mut rng).unwrap();
        let degrees: Vec<usize> = pattern.notes().iter().map(|n| n.degree).collect();
        assert_eq!(degrees, vec![1, 0, 0, 2, 4, 6, 6]);

        let names: Vec<String> = pattern.notes().iter().map(|n| n.pitch.to_string()).collect();
        assert_eq!(names, ["D4", "C4", "C4", "E4", "G4", "B4", "B4"]);

        let durations: Vec<NoteValue> = pattern.notes().iter().map(|n| n.duration).collect();
        assert_eq!(
            durations,
            vec![
                NoteValue::Eighth,
                NoteValue::Quarter,
                NoteValue::Sixteenth,
                NoteValue::Eighth,
                NoteValue::Eighth,
                NoteValue::Eighth,
                NoteValue::Eighth,
            ]
        );
    }

    #[test]
    fn test_clamp_step() {
        assert_eq!(clamp_step(0, -2, 6), 0);
        assert_eq!(clamp_step(1, -2, 6), 0);
        assert_eq!(clamp_step(5, 2, 6), 6);
        assert_eq!(clamp_step(3, 1, 6), 4);
        assert_eq!(clamp_step(3, 0, 6), 3);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let gen = PatternGenerator::new();
        let a = gen.generate("d_major", 16, &mut StdRng::seed_from_u64(1234)).unwrap();
        let b = gen.generate("d_major", 16, &mut StdRng::seed_from_u64(1234)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_duration_skew() {
        let gen = PatternGenerator::new();
        let mut rng = StdRng::seed_from_u64(5);
        let pattern = gen.generate("a_minor", 10_000, &mut rng).unwrap();

        let count = |value| pattern.notes().iter().filter(|n| n.duration == value).count();
        let eighths = count(NoteValue::Eighth);
        let quarters = count(NoteValue::Quarter);
        let sixteenths = count(NoteValue::Sixteenth);

        assert_eq!(eighths + quarters + sixteenths, 10_000);
        // Expected 6000 / 2000 / 2000
        assert!((5600..6400).contains(&eighths));
        assert!((1700..2300).contains(&quarters));
        assert!((1700..2300).contains(&sixteenths));
    }

    #[test]
    fn test_invalid_scale() {
        let gen = PatternGenerator::new();
        let mut rng = StdRng::seed_from_u64(0);
        let err = gen.generate("unknown_scale", 16, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidScale(name) if name == "unknown_scale"));
    }

    #[test]
    fn test_invalid_length() {
        let gen = PatternGenerator::new();
        // An empty script proves nothing is drawn before failing
        let mut rng = ScriptedSource::new(&[]);
        assert!(matches!(
            gen.generate("c_major", 0, &mut rng),
            Err(Error::InvalidLength(0))
        ));
        assert!(matches!(
            gen.generate("c_major", -3, &mut rng),
            Err(Error::InvalidLength(-3))
        ));
    }

    #[test]
    fn test_default_generation() {
        let gen = PatternGenerator::new();
        let pattern = gen.generate_default(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(pattern.len(), 16);
        assert_eq!(pattern.scale_name(), "c_major");
        assert_eq!(pattern.last_offset(), Some(7.5));
    }
}
