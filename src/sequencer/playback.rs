// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pattern playback against the transport.
//!
//! The scheduler owns the synthesizer, the transport and the current note
//! index. Playing a pattern arms one trigger per note plus a terminal
//! trigger one time unit after the last note. Every index change is posted
//! to a single-consumer event queue so the UI observes notes in the order
//! they are heard without running on the audio path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::audio::Synthesizer;
use crate::error::{Error, Result};
use crate::generators::Pattern;
use crate::timing::{ScheduledTrigger, Transport, MAX_BPM, MIN_BPM, REFERENCE_BPM};

/// Gap between the last note onset and the automatic stop, in transport units
pub const END_MARGIN: f64 = 1.0;

/// Playback lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// What a trigger does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Sound the note at this pattern position
    Note(usize),
    /// Natural end of the pattern
    End,
}

/// Trigger payload armed on the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Schedule that armed this trigger
    pub schedule: u64,
    pub action: TriggerAction,
}

/// Notifications for the visualizer
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Playback started or stopped
    StateChanged { playing: bool },
    /// Current note index moved; `None` when idle
    IndexChanged { index: Option<usize> },
    /// A new pattern became the active one
    PatternChanged(Arc<Pattern>),
}

/// Stateful pattern player
pub struct PlaybackScheduler<S: Synthesizer> {
    synth: S,
    transport: Transport<Trigger>,
    state: PlaybackState,
    /// Pattern that plays (or will play) on the next `play`
    pattern: Option<Arc<Pattern>>,
    /// Pattern handed in while playing, installed once idle
    pending: Option<Arc<Pattern>>,
    current_index: Option<usize>,
    /// Id of the armed schedule
    schedule: u64,
    events: UnboundedSender<PlaybackEvent>,
    receiver: Option<UnboundedReceiver<PlaybackEvent>>,
}

impl<S: Synthesizer> PlaybackScheduler<S> {
    /// Create an idle scheduler that owns `synth`
    pub fn new(synth: S) -> Self {
        let (events, receiver) = mpsc::unbounded_channel();
        Self {
            synth,
            transport: Transport::new(REFERENCE_BPM),
            state: PlaybackState::Idle,
            pattern: None,
            pending: None,
            current_index: None,
            schedule: 0,
            events,
            receiver: Some(receiver),
        }
    }

    /// Hand out the event queue. There is exactly one consumer, so this
    /// returns `Some` only once.
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<PlaybackEvent>> {
        self.receiver.take()
    }

    /// Install a new pattern.
    ///
    /// While idle the pattern replaces the current one immediately. While
    /// playing it is queued and installed when playback stops, so the
    /// running schedule and the visible index keep referring to the
    /// pattern being heard.
    pub fn set_pattern(&mut self, pattern: impl Into<Arc<Pattern>>) {
        let pattern = pattern.into();
        match self.state {
            PlaybackState::Idle => self.install(pattern),
            PlaybackState::Playing => {
                info!(len = pattern.len(), "Pattern queued until playback stops");
                self.pending = Some(pattern);
            }
        }
    }

    /// Start playing the active pattern from the top.
    ///
    /// Fails with [`Error::EmptyPattern`] when there is nothing to play and
    /// with [`Error::Audio`] when the synthesizer cannot be activated. In
    /// both cases nothing changes. Calling `play` while already playing
    /// retires the running schedule and starts over.
    pub async fn play(&mut self) -> Result<()> {
        let candidate = self.pending.as_ref().or(self.pattern.as_ref());
        if candidate.map_or(true, |p| p.is_empty()) {
            return Err(Error::EmptyPattern);
        }

        self.synth.activate().await?;

        self.retire_schedule();
        if let Some(pending) = self.pending.take() {
            self.install(pending);
        }
        let pattern = match &self.pattern {
            Some(pattern) => Arc::clone(pattern),
            None => return Err(Error::EmptyPattern),
        };

        self.schedule += 1;
        for (i, note) in pattern.notes().iter().enumerate() {
            self.arm(note.start_offset, TriggerAction::Note(i));
        }
        let end = pattern.last_offset().unwrap_or_default() + END_MARGIN;
        self.arm(end, TriggerAction::End);

        self.set_state(PlaybackState::Playing);
        self.set_index(Some(0));
        self.synth.clock_started();
        self.transport.start();

        info!(
            notes = pattern.len(),
            tempo = self.transport.tempo(),
            end,
            "Playback started"
        );
        Ok(())
    }

    /// Stop playback. Idempotent: stopping while idle does nothing.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Idle {
            return;
        }

        self.retire_schedule();
        self.set_state(PlaybackState::Idle);
        self.set_index(None);
        info!("Playback stopped");

        if let Some(pending) = self.pending.take() {
            self.install(pending);
        }
    }

    /// Change tempo, including mid-playback. Accepts 60-180 BPM.
    pub fn set_tempo(&mut self, bpm: f64) -> Result<()> {
        if !bpm.is_finite() || !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return Err(Error::InvalidTempo(bpm));
        }
        self.transport.set_tempo(bpm);
        info!(bpm, "Tempo changed");
        Ok(())
    }

    /// Advance the transport by wall-clock time and fire every due trigger.
    ///
    /// Returns the number of triggers fired.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.transport.advance(elapsed);

        let mut fired = 0;
        while let Some(trigger) = self.transport.pop_due() {
            self.fire(trigger);
            fired += 1;
        }
        fired
    }

    /// Drive playback in real time until it goes idle.
    ///
    /// `tick` bounds how long the loop sleeps between transport updates.
    pub async fn run(&mut self, tick: Duration) {
        let mut last = tokio::time::Instant::now();
        while self.is_playing() {
            let wait = self
                .transport
                .time_to_next()
                .map_or(tick, |next| next.min(tick));
            tokio::time::sleep(wait).await;

            let now = tokio::time::Instant::now();
            self.advance(now - last);
            last = now;
        }
    }

    /// Drive playback to completion as fast as possible, advancing the
    /// transport in fixed `step`s. Returns the number of triggers fired.
    ///
    /// A zero `step` would never reach the end, so it stops playback
    /// without firing anything.
    pub fn run_offline(&mut self, step: Duration) -> usize {
        if step.is_zero() {
            warn!("Offline run with a zero step");
            self.stop();
            return 0;
        }

        let mut fired = 0;
        while self.is_playing() {
            fired += self.advance(step);
        }
        fired
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Position of the note last triggered; `None` when idle
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Current tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.transport.tempo()
    }

    /// Active pattern
    pub fn pattern(&self) -> Option<&Arc<Pattern>> {
        self.pattern.as_ref()
    }

    /// Pattern waiting for playback to stop
    pub fn pending_pattern(&self) -> Option<&Arc<Pattern>> {
        self.pending.as_ref()
    }

    /// Transport position in time units
    pub fn position(&self) -> f64 {
        self.transport.position()
    }

    /// Number of triggers still armed
    pub fn pending_triggers(&self) -> usize {
        self.transport.pending()
    }

    /// The owned synthesizer
    pub fn synth(&self) -> &S {
        &self.synth
    }

    pub fn synth_mut(&mut self) -> &mut S {
        &mut self.synth
    }

    fn arm(&mut self, time: f64, action: TriggerAction) {
        let trigger = Trigger {
            schedule: self.schedule,
            action,
        };
        self.transport.schedule_at(time, trigger);
    }

    /// Cancel every armed trigger and rewind the transport
    fn retire_schedule(&mut self) {
        self.transport.cancel_all();
        self.transport.stop();
        assert_eq!(
            self.transport.pending(),
            0,
            "previous schedule still armed after cancel"
        );
    }

    fn fire(&mut self, trigger: ScheduledTrigger<Trigger>) {
        assert_eq!(
            trigger.event.schedule, self.schedule,
            "trigger from a retired schedule fired"
        );

        match trigger.event.action {
            TriggerAction::Note(index) => self.sound(index, trigger.time),
            TriggerAction::End => {
                debug!(at = trigger.time, "Pattern finished");
                self.stop();
            }
        }
    }

    fn sound(&mut self, index: usize, time: f64) {
        let Some(note) = self.pattern.as_ref().and_then(|p| p.get(index)).cloned() else {
            warn!(index, "Trigger for a note outside the pattern");
            return;
        };

        // Wall-clock onset of the trigger, independent of how coarsely the
        // transport was advanced
        let late = (self.transport.position() - time).max(0.0) / self.transport.rate();
        let at = self
            .transport
            .elapsed()
            .saturating_sub(Duration::from_secs_f64(late));
        let length = note.duration.length_at(self.transport.tempo());

        if let Err(e) = self.synth.sound_note(note.pitch, length, at) {
            warn!(index, pitch = %note.pitch, "Failed to sound note: {}", e);
        }

        self.set_index(Some(index));
    }

    fn install(&mut self, pattern: Arc<Pattern>) {
        debug!(len = pattern.len(), scale = pattern.scale_name(), "Pattern installed");
        self.pattern = Some(Arc::clone(&pattern));
        self.current_index = None;
        self.post(PlaybackEvent::PatternChanged(pattern));
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.post(PlaybackEvent::StateChanged {
                playing: state == PlaybackState::Playing,
            });
        }
    }

    fn set_index(&mut self, index: Option<usize>) {
        if self.current_index != index {
            self.current_index = index;
            self.post(PlaybackEvent::IndexChanged { index });
        }
    }

    fn post(&self, event: PlaybackEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }
}

impl<S: Synthesizer> Drop for PlaybackScheduler<S> {
    fn drop(&mut self) {
        self.transport.cancel_all();
        self.synth.dispose();
    }
}
