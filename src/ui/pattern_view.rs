// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pattern grid with a playhead.
//!
//! `PatternView` follows playback purely from `PlaybackEvent`s;
//! `PatternWidget` draws it as a grid of eight notes per row.

use std::sync::Arc;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Paragraph, Widget},
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::generators::Pattern;
use crate::sequencer::PlaybackEvent;

/// Notes per grid row
pub const COLUMNS: usize = 8;

/// Width of one grid cell in terminal columns
const CELL_WIDTH: u16 = 6;

/// How a note cell should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// Sounding now
    Current,
    /// Already heard in this run
    Played,
    Upcoming,
}

/// Observed playback state
#[derive(Debug, Clone, Default)]
pub struct PatternView {
    pattern: Option<Arc<Pattern>>,
    current: Option<usize>,
    playing: bool,
}

impl PatternView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one playback event
    pub fn apply(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::StateChanged { playing } => self.playing = *playing,
            PlaybackEvent::IndexChanged { index } => self.current = *index,
            PlaybackEvent::PatternChanged(pattern) => {
                self.pattern = Some(Arc::clone(pattern));
                self.current = None;
            }
        }
    }

    /// Apply every queued event without waiting. Returns how many were applied.
    pub fn drain(&mut self, events: &mut UnboundedReceiver<PlaybackEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.apply(&event);
            applied += 1;
        }
        applied
    }

    pub fn pattern(&self) -> Option<&Arc<Pattern>> {
        self.pattern.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Draw state for the note at `index`
    pub fn cell_state(&self, index: usize) -> CellState {
        match self.current {
            Some(current) if self.playing && index == current => CellState::Current,
            Some(current) if self.playing && index < current => CellState::Played,
            _ => CellState::Upcoming,
        }
    }

    /// Summary line, e.g. "16 notes in c major"
    pub fn summary(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!(
                "{} notes in {}",
                pattern.len(),
                pattern.scale_name().replace('_', " ")
            ),
            None => "No pattern generated yet".to_string(),
        }
    }

    /// Single-line text rendering: `(C4) [D4]  E4 ...`
    pub fn render_line(&self) -> String {
        let Some(pattern) = &self.pattern else {
            return self.summary();
        };

        pattern
            .notes()
            .iter()
            .enumerate()
            .map(|(i, note)| match self.cell_state(i) {
                CellState::Current => format!("[{}]", note.pitch),
                CellState::Played => format!("({})", note.pitch),
                CellState::Upcoming => format!(" {} ", note.pitch),
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Terminal rows needed to draw the grid, without a block
    pub fn grid_height(&self) -> u16 {
        grid_rows(self.pattern.as_ref().map_or(0, |p| p.len()))
    }
}

/// Terminal rows for a grid of `notes` cells, saturating at `u16::MAX`
pub fn grid_rows(notes: usize) -> u16 {
    let rows = notes.div_ceil(COLUMNS).max(1).saturating_mul(2);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// Widget drawing a `PatternView`
pub struct PatternWidget<'a> {
    view: &'a PatternView,
    block: Option<Block<'a>>,
}

impl<'a> PatternWidget<'a> {
    pub fn new(view: &'a PatternView) -> Self {
        Self { view, block: None }
    }

    /// Set the block wrapper
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for PatternWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        let Some(pattern) = self.view.pattern() else {
            Paragraph::new(self.view.summary())
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        };

        for (i, note) in pattern.notes().iter().enumerate() {
            let x = area.x + (i % COLUMNS) as u16 * CELL_WIDTH;
            let y = area.y + (i / COLUMNS) as u16 * 2;
            if x + CELL_WIDTH > area.right() || y + 1 >= area.bottom() {
                continue;
            }

            let style = match self.view.cell_state(i) {
                CellState::Current => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                CellState::Played => Style::default().fg(Color::DarkGray),
                CellState::Upcoming => Style::default().fg(Color::White),
            };

            let width = CELL_WIDTH as usize - 1;
            let pitch = format!("{:^width$}", note.pitch.to_string());
            let duration = format!("{:^width$}", note.duration.notation());
            buf.set_string(x, y, pitch, style);
            buf.set_string(x, y + 1, duration, style.add_modifier(Modifier::DIM));
        }
    }
}
