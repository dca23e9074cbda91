#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that validates setup parameters and populates the world.

use segregation_core::{
    AgentKind, Command, InvalidThreshold, SatisfactionThreshold, MAX_GRID_CELLS,
};
use thiserror::Error;

/// Share of the population assigned to [`AgentKind::X`] unless configured otherwise.
pub const DEFAULT_KIND_SPLIT: f64 = 0.5;

/// Reasons a simulation setup is rejected before the first turn.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SetupError {
    /// Grids need at least one column and one row.
    #[error("grid dimensions must be positive (received {columns}x{rows})")]
    InvalidDimensions {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
    },
    /// The grid would hold more cells than the simulator supports.
    #[error("a {columns}x{rows} grid exceeds the limit of {limit} cells")]
    GridTooLarge {
        /// Requested number of columns.
        columns: u32,
        /// Requested number of rows.
        rows: u32,
        /// Largest supported cell count.
        limit: u64,
    },
    /// More agents were requested than the grid has cells.
    #[error("cannot place {requested} agents on a grid with {capacity} cells")]
    TooManyAgents {
        /// Requested population.
        requested: u32,
        /// Number of cells in the grid.
        capacity: u64,
    },
    /// The satisfaction threshold is not a fraction.
    #[error(transparent)]
    InvalidThreshold(#[from] InvalidThreshold),
    /// The kind split is not a fraction.
    #[error("kind split must lie within [0, 1] (received {value})")]
    InvalidSplit {
        /// Value that failed validation.
        value: f64,
    },
}

/// Validated parameters describing the initial population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    columns: u32,
    rows: u32,
    num_agents: u32,
    threshold: SatisfactionThreshold,
    kind_split: f64,
}

impl Config {
    /// Validates the provided parameters against each other.
    pub fn new(
        columns: u32,
        rows: u32,
        num_agents: u32,
        threshold: f64,
        kind_split: f64,
    ) -> Result<Self, SetupError> {
        if columns == 0 || rows == 0 {
            return Err(SetupError::InvalidDimensions { columns, rows });
        }
        let capacity = u64::from(columns) * u64::from(rows);
        if capacity > MAX_GRID_CELLS {
            return Err(SetupError::GridTooLarge {
                columns,
                rows,
                limit: MAX_GRID_CELLS,
            });
        }
        if u64::from(num_agents) > capacity {
            return Err(SetupError::TooManyAgents {
                requested: num_agents,
                capacity,
            });
        }
        let threshold = SatisfactionThreshold::new(threshold)?;
        if !(0.0..=1.0).contains(&kind_split) {
            return Err(SetupError::InvalidSplit { value: kind_split });
        }
        Ok(Self {
            columns,
            rows,
            num_agents,
            threshold,
            kind_split,
        })
    }

    /// Number of grid columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of grid rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of agents to create.
    #[must_use]
    pub const fn num_agents(&self) -> u32 {
        self.num_agents
    }

    /// Threshold shared by every agent created during bootstrap.
    #[must_use]
    pub const fn threshold(&self) -> SatisfactionThreshold {
        self.threshold
    }

    /// Share of agents assigned to [`AgentKind::X`].
    #[must_use]
    pub const fn kind_split(&self) -> f64 {
        self.kind_split
    }

    /// Kind assigned to the agent created at position `index`.
    ///
    /// The first `num_agents * kind_split` agents are `X`, the rest are `O`.
    #[must_use]
    pub fn kind_for(&self, index: u32) -> AgentKind {
        if f64::from(index) < f64::from(self.num_agents) * self.kind_split {
            AgentKind::X
        } else {
            AgentKind::O
        }
    }
}

/// Produces the commands that populate a fresh world.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Emits one placement command per agent in creation order.
    pub fn handle(&self, config: &Config, out: &mut Vec<Command>) {
        out.reserve(usize::try_from(config.num_agents).unwrap_or(0));
        for index in 0..config.num_agents {
            out.push(Command::PlaceAgent {
                kind: config.kind_for(index),
                threshold: config.threshold,
            });
        }
        tracing::info!(
            agents = config.num_agents,
            threshold = config.threshold.get(),
            split = config.kind_split,
            "queued initial population"
        );
    }
}
