// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport clock with cancellable, time-ordered triggers.
//!
//! Transport time is measured in units that equal one second at the
//! reference tempo of 120 BPM. The host advances the transport by
//! wall-clock time and the position moves at `bpm / 120` units per second,
//! so a tempo change rescales the whole remaining timeline.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Tempo at which one transport unit equals one second
pub const REFERENCE_BPM: f64 = 120.0;

/// Slowest accepted tempo
pub const MIN_BPM: f64 = 60.0;

/// Fastest accepted tempo
pub const MAX_BPM: f64 = 180.0;

/// Identifier handed out for each armed trigger
pub type TriggerId = u64;

/// Transport run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Running,
}

/// An event armed at an absolute transport time
#[derive(Debug, Clone)]
pub struct ScheduledTrigger<E> {
    /// Arming order, breaks ties between equal times
    pub id: TriggerId,
    /// Transport time the trigger fires at
    pub time: f64,
    /// Payload delivered when the trigger fires
    pub event: E,
}

// For BinaryHeap - we want earliest time (then earliest id) first
impl<E> Eq for ScheduledTrigger<E> {}

impl<E> PartialEq for ScheduledTrigger<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Ord for ScheduledTrigger<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl<E> PartialOrd for ScheduledTrigger<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Transport timeline
#[derive(Debug)]
pub struct Transport<E> {
    /// Armed triggers, earliest first
    queue: BinaryHeap<ScheduledTrigger<E>>,
    /// Current tempo in BPM
    bpm: f64,
    state: TransportState,
    /// Position in transport units since start
    position: f64,
    /// Wall-clock time since start
    elapsed: Duration,
    next_id: TriggerId,
}

impl<E> Transport<E> {
    /// Create a stopped transport at the given tempo
    pub fn new(bpm: f64) -> Self {
        Self {
            queue: BinaryHeap::with_capacity(64),
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            state: TransportState::Stopped,
            position: 0.0,
            elapsed: Duration::ZERO,
            next_id: 0,
        }
    }

    /// Get the current tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.bpm
    }

    /// Set the tempo, clamped to 60-180 BPM. Applies immediately, including
    /// to triggers that are already armed.
    pub fn set_tempo(&mut self, bpm: f64) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Transport units per wall-clock second
    pub fn rate(&self) -> f64 {
        self.bpm / REFERENCE_BPM
    }

    /// Arm a trigger at an absolute transport time
    pub fn schedule_at(&mut self, time: f64, event: E) -> TriggerId {
        debug_assert!(time.is_finite() && time >= 0.0, "bad trigger time {time}");
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(ScheduledTrigger { id, time, event });
        id
    }

    /// Start from position zero
    pub fn start(&mut self) {
        self.state = TransportState::Running;
        self.position = 0.0;
        self.elapsed = Duration::ZERO;
    }

    /// Stop and rewind. Armed triggers stay armed; see [`Transport::cancel_all`].
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.position = 0.0;
        self.elapsed = Duration::ZERO;
    }

    /// Disarm every pending trigger
    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Get the current run state
    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TransportState::Running
    }

    /// Current position in transport units
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Wall-clock time since start
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of armed triggers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Move forward by wall-clock time at the current tempo
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.is_running() {
            return;
        }
        self.position += elapsed.as_secs_f64() * self.rate();
        self.elapsed += elapsed;
    }

    /// Remove and return the earliest trigger whose time has been reached.
    ///
    /// Callers fire triggers one at a time so that a trigger which cancels
    /// the schedule suppresses everything after it.
    pub fn pop_due(&mut self) -> Option<ScheduledTrigger<E>> {
        if !self.is_running() {
            return None;
        }
        if self.queue.peek()?.time <= self.position {
            self.queue.pop()
        } else {
            None
        }
    }

    /// Wall-clock delay until the next trigger at the current tempo
    pub fn time_to_next(&self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.queue.peek().map(|trigger| {
            let units = (trigger.time - self.position).max(0.0);
            Duration::from_secs_f64(units / self.rate())
        })
    }
}

impl<E> Default for Transport<E> {
    fn default() -> Self {
        Self::new(REFERENCE_BPM)
    }
}
