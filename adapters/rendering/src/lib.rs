#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for segregation simulator adapters.

use anyhow::Result as AnyResult;
use segregation_core::{AgentKind, TurnSnapshot, TurnStats};
use serde::Serialize;

/// Characters used to draw each cell state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// Glyph for cells holding an [`AgentKind::X`] agent.
    pub x: char,
    /// Glyph for cells holding an [`AgentKind::O`] agent.
    pub o: char,
    /// Glyph for unoccupied cells.
    pub empty: char,
}

impl Glyphs {
    /// Resolves the glyph for a single cell.
    #[must_use]
    pub const fn for_cell(&self, cell: Option<AgentKind>) -> char {
        match cell {
            Some(AgentKind::X) => self.x,
            Some(AgentKind::O) => self.o,
            None => self.empty,
        }
    }

    /// Renders every grid row as a line of glyphs, top to bottom.
    #[must_use]
    pub fn grid_lines(&self, snapshot: &TurnSnapshot) -> Vec<String> {
        snapshot
            .rows_iter()
            .map(|row| row.iter().map(|cell| self.for_cell(*cell)).collect())
            .collect()
    }
}

impl Default for Glyphs {
    fn default() -> Self {
        Self {
            x: AgentKind::X.label(),
            o: AgentKind::O.label(),
            empty: ' ',
        }
    }
}

/// Everything a backend needs to draw one turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    /// Human readable caption for the frame.
    pub title: String,
    /// Grid contents after the turn resolved.
    pub snapshot: TurnSnapshot,
    /// Statistics for the turn, when analytics ran.
    pub stats: Option<TurnStats>,
}

impl Frame {
    /// Builds a frame captioned with the snapshot's turn number.
    #[must_use]
    pub fn new(snapshot: TurnSnapshot, stats: Option<TurnStats>) -> Self {
        Self {
            title: format!("Schelling's Segregation Simulator (Turn: {})", snapshot.turn()),
            snapshot,
            stats,
        }
    }
}

/// Rendering backend capable of presenting simulation frames.
pub trait RenderingBackend {
    /// Draws a single frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;

    /// Flushes any buffered output once the run ends.
    fn finish(&mut self) -> AnyResult<()> {
        Ok(())
    }
}

/// Backend that discards every frame, used for headless runs.
#[derive(Debug, Default)]
pub struct NullBackend;

impl RenderingBackend for NullBackend {
    fn present(&mut self, _frame: &Frame) -> AnyResult<()> {
        Ok(())
    }
}
