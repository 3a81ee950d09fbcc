// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for walkseq
//!
//! These tests verify that generation, playback, rendering and the
//! visualizer work together through the public API.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

use walkseq::audio::{write_wav, ToneSynth};
use walkseq::config::SessionConfig;
use walkseq::music::ScaleRegistry;
use walkseq::ui::PatternView;
use walkseq::{Error, Pattern, PatternGenerator, PlaybackEvent, PlaybackScheduler};

const STEP: Duration = Duration::from_millis(10);

fn seeded_pattern(scale: &str, length: i64, seed: u64) -> Pattern {
    PatternGenerator::new()
        .generate(scale, length, &mut StdRng::seed_from_u64(seed))
        .unwrap()
}

fn close(a: Duration, b: f64) -> bool {
    (a.as_secs_f64() - b).abs() < 1e-3
}

/// Generate a pattern, play it to the end and watch it through the view
#[tokio::test]
async fn test_generate_play_and_visualize() {
    let pattern = seeded_pattern("d_major", 16, 3);
    let scale = ScaleRegistry::builtin().get("d_major").unwrap().clone();
    assert!(pattern.notes().iter().all(|n| scale.contains(n.pitch)));

    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    let mut events = scheduler.take_events().unwrap();
    scheduler.set_pattern(pattern.clone());
    scheduler.play().await.unwrap();

    let mut view = PatternView::new();
    view.drain(&mut events);
    assert!(view.is_playing());
    assert_eq!(view.current_index(), Some(0));
    assert_eq!(view.summary(), "16 notes in d major");

    assert_eq!(scheduler.run_offline(STEP), 17);
    view.drain(&mut events);
    assert!(!view.is_playing());
    assert_eq!(view.current_index(), None);

    // One voice per note, at half-second onsets when playing at 120 BPM
    let voices = scheduler.synth().voices();
    assert_eq!(voices.len(), 16);
    for (i, (voice, note)) in voices.iter().zip(pattern.notes()).enumerate() {
        assert_eq!(voice.pitch, note.pitch);
        assert!(close(voice.start, i as f64 * 0.5), "voice {} at {:?}", i, voice.start);
        assert_eq!(voice.length, note.duration.length_at(120.0));
    }
}

/// Stopping partway leaves the view idle and silences the rest
#[tokio::test]
async fn test_stop_mid_pattern() {
    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    let mut events = scheduler.take_events().unwrap();
    scheduler.set_pattern(seeded_pattern("c_major", 16, 9));
    scheduler.play().await.unwrap();

    // Notes at 0.0 through 2.5 have sounded
    for _ in 0..260 {
        scheduler.advance(STEP);
    }
    assert_eq!(scheduler.current_index(), Some(5));
    scheduler.stop();

    for _ in 0..1000 {
        assert_eq!(scheduler.advance(STEP), 0);
    }
    assert_eq!(scheduler.synth().voices().len(), 6);

    let mut view = PatternView::new();
    view.drain(&mut events);
    assert!(!view.is_playing());
    assert_eq!(view.current_index(), None);
}

/// Slower tempo stretches the schedule in wall-clock time
#[tokio::test]
async fn test_tempo_scales_onsets() {
    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    scheduler.set_tempo(60.0).unwrap();
    scheduler.set_pattern(seeded_pattern("a_minor", 16, 1));
    scheduler.play().await.unwrap();
    scheduler.run_offline(STEP);

    let voices = scheduler.synth().voices();
    assert!(close(voices[1].start, 1.0));
    assert!(close(voices[15].start, 15.0));

    assert!(matches!(scheduler.set_tempo(200.0), Err(Error::InvalidTempo(_))));
    assert_eq!(scheduler.tempo(), 60.0);
}

/// A new pattern generated during playback takes over once it stops
#[tokio::test]
async fn test_regenerate_during_playback() {
    let first = seeded_pattern("c_major", 4, 1);
    let second = seeded_pattern("e_minor", 8, 2);

    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    let mut events = scheduler.take_events().unwrap();
    scheduler.set_pattern(first.clone());
    scheduler.play().await.unwrap();
    scheduler.set_pattern(second.clone());
    assert_eq!(scheduler.pattern().map(|p| p.as_ref()), Some(&first));

    scheduler.run_offline(STEP);
    assert_eq!(scheduler.synth().voices().len(), 4);
    assert_eq!(scheduler.pattern().map(|p| p.as_ref()), Some(&second));

    let mut view = PatternView::new();
    view.drain(&mut events);
    assert_eq!(view.summary(), "8 notes in e minor");
    assert_eq!(view.pattern().map(|p| p.len()), Some(8));
}

/// Config file drives reproducible generation
#[test]
fn test_config_driven_generation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.yaml");
    std::fs::write(&path, "scale: g_major\nlength: 24\ntempo: 150\nseed: 42\n").unwrap();

    let config = SessionConfig::load(&path).unwrap();
    config.validate(&ScaleRegistry::builtin()).unwrap();

    let seed = config.seed.unwrap();
    let a = seeded_pattern(&config.scale, config.length, seed);
    let b = seeded_pattern(&config.scale, config.length, seed);
    assert_eq!(a, b);
    assert_eq!(a.len(), 24);
    assert_eq!(a.last_offset(), Some(11.5));

    let json = a.to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let first = &parsed["notes"][0];
    assert!(first["note"].is_string());
    assert_eq!(first["time"], 0.0);
    assert!(["4n", "8n", "16n"].contains(&first["duration"].as_str().unwrap()));
}

#[test]
fn test_invalid_requests() {
    let generator = PatternGenerator::new();
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        generator.generate("h_major", 16, &mut rng),
        Err(Error::InvalidScale(_))
    ));
    assert!(matches!(
        generator.generate("c_major", -1, &mut rng),
        Err(Error::InvalidLength(-1))
    ));
    assert!(matches!(
        generator.generate("c_major", 0, &mut rng),
        Err(Error::InvalidLength(0))
    ));
}

/// Offline render produces a WAV covering every note and its release
#[tokio::test]
async fn test_render_to_wav() {
    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    scheduler.set_pattern(seeded_pattern("c_major", 8, 5));
    scheduler.play().await.unwrap();
    scheduler.run_offline(STEP);

    let samples = scheduler.synth().render();
    let tail = scheduler.synth().tail_end().as_secs_f64();
    // Last note starts at 3.5s; a quarter plus release ends by 4.5s
    assert!(tail > 3.5 && tail < 4.6);
    assert_eq!(samples.len(), (tail * 8000.0).round() as usize);

    let dir = tempdir().unwrap();
    let path = dir.path().join("pattern.wav");
    write_wav(&path, &samples, 8000).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().sample_rate, 8000);
    assert_eq!(reader.len() as usize, samples.len());
}

/// The event queue closes when the scheduler goes away
#[tokio::test]
async fn test_event_queue_closes_on_drop() {
    let mut scheduler = PlaybackScheduler::new(ToneSynth::new(8000));
    let mut events = scheduler.take_events().unwrap();
    scheduler.set_pattern(seeded_pattern("c_major", 2, 0));
    drop(scheduler);

    assert!(matches!(events.recv().await, Some(PlaybackEvent::PatternChanged(_))));
    assert!(events.recv().await.is_none());
}
