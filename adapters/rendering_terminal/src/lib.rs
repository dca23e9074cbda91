#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Terminal rendering backends for the segregation simulator.
//!
//! [`TextBackend`] prints each turn as a grid of glyphs, [`JsonLinesBackend`]
//! writes one JSON document per turn for downstream tooling.

use std::io::Write;

use anyhow::{Context, Result};
use segregation_rendering::{Frame, Glyphs, RenderingBackend};

/// Prints each frame as a block of text lines.
#[derive(Debug)]
pub struct TextBackend<W> {
    out: W,
    glyphs: Glyphs,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing to `out` with the default glyphs.
    pub fn new(out: W) -> Self {
        Self::with_glyphs(out, Glyphs::default())
    }

    /// Creates a backend writing to `out` with custom glyphs.
    pub fn with_glyphs(out: W, glyphs: Glyphs) -> Self {
        Self { out, glyphs }
    }

    /// Consumes the backend, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        writeln!(self.out, "\nTurn: {}", frame.snapshot.turn())
            .context("failed to write frame header")?;
        for line in self.glyphs.grid_lines(&frame.snapshot) {
            writeln!(self.out, "{line}").context("failed to write grid row")?;
        }
        if let Some(stats) = frame.stats {
            writeln!(
                self.out,
                "moved: {}  unsatisfied: {}  similarity: {:.3}  free: {}",
                stats.relocations, stats.unsatisfied, stats.mean_similarity, stats.free_cells
            )
            .context("failed to write turn statistics")?;
        }
        writeln!(self.out).context("failed to write frame separator")?;
        self.out.flush().context("failed to flush frame")
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush text output")
    }
}

/// Writes each frame as a single line of JSON.
#[derive(Debug)]
pub struct JsonLinesBackend<W> {
    out: W,
}

impl<W: Write> JsonLinesBackend<W> {
    /// Creates a backend writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consumes the backend, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderingBackend for JsonLinesBackend<W> {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        serde_json::to_writer(&mut self.out, frame).context("failed to serialise frame")?;
        writeln!(self.out).context("failed to terminate frame line")
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush json output")
    }
}
