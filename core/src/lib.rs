#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the segregation simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect the world and answer
//! with [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then reports [`Event`]
//! values describing what actually changed. Presentation adapters only ever
//! see the read-only [`TurnSnapshot`] and [`TurnStats`] types.

use std::fmt;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Creates a new agent and places it on a randomly drawn free cell.
    PlaceAgent {
        /// Group the agent belongs to.
        kind: AgentKind,
        /// Minimum share of like neighbours the agent tolerates.
        threshold: SatisfactionThreshold,
    },
    /// Moves an existing agent to a randomly drawn free cell.
    RelocateAgent {
        /// Identifier of the agent that should move.
        agent: AgentId,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that an agent joined the roster.
    AgentPlaced {
        /// Identifier assigned to the new agent.
        agent: AgentId,
        /// Group the agent belongs to.
        kind: AgentKind,
        /// Cell the agent occupies after placement.
        cell: CellCoord,
    },
    /// Confirms that an agent moved between two cells.
    AgentRelocated {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Cell the agent occupied before moving.
        from: CellCoord,
        /// Cell the agent occupies after moving.
        to: CellCoord,
    },
}

/// The two groups an agent can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentKind {
    /// First group, rendered as `X`.
    X,
    /// Second group, rendered as `O`.
    O,
}

impl AgentKind {
    /// Short label used by presentation adapters.
    #[must_use]
    pub const fn label(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Unique identifier assigned to an agent. Matches the agent's roster index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Row-major index of the cell inside a `columns` x `rows` grid, or `None`
    /// when the cell lies outside it.
    #[must_use]
    pub fn index_in(self, columns: u32, rows: u32) -> Option<usize> {
        if self.column >= columns || self.row >= rows {
            return None;
        }
        let row = usize::try_from(self.row).ok()?;
        let column = usize::try_from(self.column).ok()?;
        let width = usize::try_from(columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Enumerates the in-bounds cells of the 3x3 block centred on this cell,
    /// excluding the cell itself.
    pub fn moore_neighbors(self, columns: u32, rows: u32) -> impl Iterator<Item = CellCoord> {
        const OFFSETS: [(i64, i64); 8] = [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ];

        OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let column = i64::from(self.column) + dx;
            let row = i64::from(self.row) + dy;
            if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
                return None;
            }
            Some(CellCoord::new(
                u32::try_from(column).ok()?,
                u32::try_from(row).ok()?,
            ))
        })
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Minimum fraction of like neighbours an agent needs to stay put.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct SatisfactionThreshold(f64);

impl SatisfactionThreshold {
    /// Validates and wraps a fraction in the closed range `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, InvalidThreshold> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidThreshold { value })
        }
    }

    /// Builds a threshold from a whole percentage in `0..=100`.
    pub fn from_percent(percent: u32) -> Result<Self, InvalidThreshold> {
        Self::new(f64::from(percent) / 100.0)
    }

    /// Fraction wrapped by the threshold.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }
}

/// Raised when a satisfaction threshold falls outside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("satisfaction threshold must lie within [0, 1] (received {value})")]
pub struct InvalidThreshold {
    /// Value that failed validation.
    pub value: f64,
}

/// Tally of occupied cells around an agent, split by whether they match its kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Neighborhood {
    /// Occupied neighbours sharing the agent's kind.
    pub same: u32,
    /// Occupied neighbours of the other kind.
    pub different: u32,
}

impl Neighborhood {
    /// Number of occupied neighbouring cells.
    #[must_use]
    pub const fn occupied(&self) -> u32 {
        self.same + self.different
    }

    /// Share of occupied neighbours that match the agent.
    ///
    /// An agent without occupied neighbours has nothing to object to, so its
    /// similarity is `1.0`.
    #[must_use]
    pub fn similarity(&self) -> f64 {
        match self.occupied() {
            0 => 1.0,
            occupied => f64::from(self.same) / f64::from(occupied),
        }
    }

    /// Reports whether the tally meets the provided threshold.
    #[must_use]
    pub fn satisfies(&self, threshold: SatisfactionThreshold) -> bool {
        self.similarity() >= threshold.get()
    }
}

/// Read-only view into the dense occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<AgentId>],
    columns: u32,
    rows: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major cells.
    #[must_use]
    pub fn new(cells: &'a [Option<AgentId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the agent occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<AgentId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell lies inside the grid and holds no agent.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .is_some_and(|index| matches!(self.cells.get(index), Some(None)))
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<AgentId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying occupancy grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        cell.index_in(self.columns, self.rows)
    }
}

/// Grid contents handed to presentation once every turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnSnapshot {
    turn: u32,
    columns: u32,
    rows: u32,
    cells: Vec<Option<AgentKind>>,
}

impl TurnSnapshot {
    /// Creates a snapshot from row-major cell contents.
    ///
    /// Returns `None` when the cell count does not match the dimensions.
    #[must_use]
    pub fn new(turn: u32, columns: u32, rows: u32, cells: Vec<Option<AgentKind>>) -> Option<Self> {
        let expected = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
        if cells.len() != expected {
            return None;
        }
        Some(Self {
            turn,
            columns,
            rows,
            cells,
        })
    }

    /// Captures the grid behind an occupancy view, resolving occupants to
    /// their kinds through `kind_of`.
    #[must_use]
    pub fn from_occupancy<F>(turn: u32, occupancy: OccupancyView<'_>, kind_of: F) -> Self
    where
        F: Fn(AgentId) -> Option<AgentKind>,
    {
        let (columns, rows) = occupancy.dimensions();
        let cells = occupancy
            .iter()
            .map(|occupant| occupant.and_then(&kind_of))
            .collect();
        Self {
            turn,
            columns,
            rows,
            cells,
        }
    }

    /// Turn index the snapshot was taken at.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Kind of agent occupying the cell, or `None` when empty or out of bounds.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<AgentKind> {
        cell.index_in(self.columns, self.rows)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Iterates the grid one row at a time, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<AgentKind>]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    /// Counts the occupied cells holding the provided kind.
    #[must_use]
    pub fn count(&self, kind: AgentKind) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(kind)).count()
    }
}

impl<'de> Deserialize<'de> for TurnSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Record {
            turn: u32,
            columns: u32,
            rows: u32,
            cells: Vec<Option<AgentKind>>,
        }

        let Record {
            turn,
            columns,
            rows,
            cells,
        } = Record::deserialize(deserializer)?;
        let found = cells.len();
        Self::new(turn, columns, rows, cells).ok_or_else(|| {
            D::Error::custom(format!(
                "snapshot of {columns}x{rows} cells carries {found} entries"
            ))
        })
    }
}

/// Aggregate measurements published at the end of each turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurnStats {
    /// Turn index the statistics describe.
    pub turn: u32,
    /// Number of relocations performed during the turn.
    pub relocations: u32,
    /// Agents that remain unsatisfied after the turn resolved.
    pub unsatisfied: u32,
    /// Mean similarity over agents with at least one occupied neighbour.
    pub mean_similarity: f64,
    /// Cells left without an occupant.
    pub free_cells: u32,
}
