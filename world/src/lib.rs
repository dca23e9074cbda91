#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the segregation simulator.
//!
//! The [`World`] owns the occupancy grid, the pool of free cells and the agent
//! roster. It never drives the simulation on its own: callers decide who moves
//! and the world only guarantees that every mutation keeps the grid, the pool
//! and the agents' recorded positions consistent.

mod agent;
mod free_cells;
mod occupancy;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use segregation_core::{
    AgentId, AgentKind, CellCoord, Command, Event, SatisfactionThreshold, MAX_GRID_CELLS,
};
use thiserror::Error;

pub use agent::Agent;

use free_cells::FreeCellPool;
use occupancy::OccupancyGrid;

/// Failures raised when a world operation would break the grid invariants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Every cell is occupied, so no spot can be handed out.
    #[error("no free cells remain in the world")]
    EmptyPool,
    /// The coordinate lies outside the grid.
    #[error("cell {cell} lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// The coordinate already holds an agent.
    #[error("cell {cell} is already occupied by agent {occupant}")]
    Occupied {
        /// Offending coordinate.
        cell: CellCoord,
        /// Agent currently living there.
        occupant: AgentId,
    },
    /// No agent with the identifier exists.
    #[error("agent {0} is not part of the roster")]
    UnknownAgent(AgentId),
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
    /// The roster cannot hand out further identifiers.
    #[error("agent roster is full")]
    RosterFull,
}

/// Represents the authoritative segregation world state.
#[derive(Debug)]
pub struct World {
    occupancy: OccupancyGrid,
    free_cells: FreeCellPool,
    agents: Vec<Agent>,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world of the given size whose random draws replay
    /// exactly for the same `seed`.
    pub fn new(columns: u32, rows: u32, seed: u64) -> Result<Self, WorldError> {
        if columns == 0 || rows == 0 {
            return Err(WorldError::InvalidDimensions { columns, rows });
        }
        if u64::from(columns) * u64::from(rows) > MAX_GRID_CELLS {
            return Err(WorldError::GridTooLarge {
                columns,
                rows,
                limit: MAX_GRID_CELLS,
            });
        }
        Ok(Self {
            occupancy: OccupancyGrid::new(columns, rows),
            free_cells: FreeCellPool::full(columns, rows),
            agents: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Number of columns and rows in the grid.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.occupancy.dimensions()
    }

    /// Agents in creation order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Looks up an agent by identifier.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.agents.get(index))
    }

    /// Reports whether `cell` is currently in the free-cell pool.
    #[must_use]
    pub fn is_open_spot(&self, cell: CellCoord) -> bool {
        self.free_cells.contains(cell)
    }

    /// Draws a free cell uniformly at random and removes it from the pool.
    ///
    /// The returned cell stays out of the pool until an agent vacates it again.
    pub fn get_open_spot(&mut self) -> Result<CellCoord, WorldError> {
        let cell = self
            .free_cells
            .draw(&mut self.rng)
            .ok_or(WorldError::EmptyPool)?;
        tracing::trace!(%cell, remaining = self.free_cells.len(), "drew open spot");
        Ok(cell)
    }

    /// Registers `agent` at `location` and returns its identifier.
    ///
    /// The location is claimed from the free-cell pool here, so it does not
    /// matter whether the caller drew it through [`World::get_open_spot`] first.
    pub fn add_agent(
        &mut self,
        mut agent: Agent,
        location: CellCoord,
    ) -> Result<AgentId, WorldError> {
        self.ensure_in_bounds(location)?;
        if let Some(occupant) = self.occupancy.occupant(location) {
            return Err(WorldError::Occupied {
                cell: location,
                occupant,
            });
        }
        let id = u32::try_from(self.agents.len())
            .map(AgentId::new)
            .map_err(|_| WorldError::RosterFull)?;

        let _ = self.free_cells.claim(location);
        agent.move_to(location);
        self.occupancy.occupy(id, location);
        self.agents.push(agent);
        Ok(id)
    }

    /// Returns the agent living at `location`, if any.
    pub fn get_agent(&self, location: CellCoord) -> Result<Option<&Agent>, WorldError> {
        self.ensure_in_bounds(location)?;
        Ok(self.occupant(location))
    }

    /// Relocates an already placed agent to `to`.
    ///
    /// Validation runs before any mutation, so either the whole relocation
    /// applies or the world is left untouched.
    pub fn move_agent(&mut self, id: AgentId, to: CellCoord) -> Result<(), WorldError> {
        self.ensure_in_bounds(to)?;
        if let Some(occupant) = self.occupancy.occupant(to) {
            return Err(WorldError::Occupied { cell: to, occupant });
        }
        let index = self.agent_index(id)?;
        let from = self.agents[index].cell();

        let _ = self.free_cells.release(from);
        let _ = self.free_cells.claim(to);
        self.occupancy.occupy(id, to);
        self.occupancy.vacate(from);
        self.agents[index].move_to(to);

        tracing::debug!(agent = id.get(), %from, %to, "agent relocated");
        Ok(())
    }

    /// Creates a new agent on a freshly drawn free cell.
    pub fn spawn_agent(
        &mut self,
        kind: AgentKind,
        threshold: SatisfactionThreshold,
    ) -> Result<(AgentId, CellCoord), WorldError> {
        let cell = self.get_open_spot()?;
        match self.add_agent(Agent::new(kind, cell, threshold), cell) {
            Ok(id) => Ok((id, cell)),
            Err(error) => {
                let _ = self.free_cells.release(cell);
                Err(error)
            }
        }
    }

    /// Moves an agent to a freshly drawn free cell, returning both endpoints.
    pub fn relocate_agent(&mut self, id: AgentId) -> Result<(CellCoord, CellCoord), WorldError> {
        let from = self.agents[self.agent_index(id)?].cell();
        let to = self.get_open_spot()?;
        match self.move_agent(id, to) {
            Ok(()) => Ok((from, to)),
            Err(error) => {
                let _ = self.free_cells.release(to);
                Err(error)
            }
        }
    }

    pub(crate) fn occupant(&self, cell: CellCoord) -> Option<&Agent> {
        self.occupancy.occupant(cell).and_then(|id| self.agent(id))
    }

    fn agent_index(&self, id: AgentId) -> Result<usize, WorldError> {
        usize::try_from(id.get())
            .ok()
            .filter(|index| *index < self.agents.len())
            .ok_or(WorldError::UnknownAgent(id))
    }

    fn ensure_in_bounds(&self, cell: CellCoord) -> Result<(), WorldError> {
        if self.occupancy.contains(cell) {
            Ok(())
        } else {
            let (columns, rows) = self.dimensions();
            Err(WorldError::OutOfBounds {
                cell,
                columns,
                rows,
            })
        }
    }
}

/// Applies the provided command to the world, recording what changed.
///
/// On error the world is left exactly as it was before the command.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::PlaceAgent { kind, threshold } => {
            let (agent, cell) = world.spawn_agent(kind, threshold)?;
            tracing::trace!(agent = agent.get(), %kind, %cell, "agent placed");
            out_events.push(Event::AgentPlaced { agent, kind, cell });
        }
        Command::RelocateAgent { agent } => {
            let (from, to) = world.relocate_agent(agent)?;
            out_events.push(Event::AgentRelocated { agent, from, to });
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use segregation_core::{AgentId, CellCoord, OccupancyView, TurnSnapshot};

    use super::{Agent, World};

    /// Number of columns and rows in the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.dimensions()
    }

    /// Looks up an agent by identifier.
    #[must_use]
    pub fn agent(world: &World, id: AgentId) -> Option<&Agent> {
        world.agent(id)
    }

    /// Identifiers of every agent in creation order.
    pub fn agent_ids(world: &World) -> impl Iterator<Item = AgentId> {
        (0..world.agents.len()).filter_map(|index| u32::try_from(index).ok().map(AgentId::new))
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        let (columns, rows) = world.occupancy.dimensions();
        OccupancyView::new(world.occupancy.cells(), columns, rows)
    }

    /// Cells currently in the free-cell pool, in no particular order.
    #[must_use]
    pub fn free_cells(world: &World) -> Vec<CellCoord> {
        world.free_cells.iter().collect()
    }

    /// Number of cells currently in the free-cell pool.
    #[must_use]
    pub fn free_cell_count(world: &World) -> usize {
        world.free_cells.len()
    }

    /// Captures the grid contents for presentation at the given turn.
    #[must_use]
    pub fn display_turn(world: &World, turn: u32) -> TurnSnapshot {
        TurnSnapshot::from_occupancy(turn, occupancy_view(world), |id| {
            world.agent(id).map(Agent::kind)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn threshold(value: f64) -> SatisfactionThreshold {
        SatisfactionThreshold::new(value).expect("valid threshold")
    }

    fn assert_partition(world: &World) {
        let (columns, rows) = world.dimensions();
        let free: Vec<_> = query::free_cells(world);
        let occupied: Vec<_> = world.agents().iter().map(Agent::cell).collect();

        let free_set: HashSet<_> = free.iter().copied().collect();
        let occupied_set: HashSet<_> = occupied.iter().copied().collect();
        assert_eq!(free_set.len(), free.len(), "free pool holds duplicates");
        assert_eq!(occupied_set.len(), occupied.len(), "two agents share a cell");
        assert!(free_set.is_disjoint(&occupied_set));
        assert_eq!(
            free_set.len() + occupied_set.len(),
            (columns * rows) as usize
        );

        let view = query::occupancy_view(world);
        for (id, agent) in query::agent_ids(world).zip(world.agents()) {
            assert_eq!(view.occupant(agent.cell()), Some(id));
        }
        for cell in free {
            assert_eq!(view.occupant(cell), None);
        }
    }

    #[test]
    fn new_world_starts_with_every_cell_free() {
        let world = World::new(4, 3, 0).expect("valid grid");
        assert_eq!(query::free_cell_count(&world), 12);
        assert!(world.agents().is_empty());
        assert_partition(&world);
    }

    #[test]
    fn zero_sized_world_is_rejected() {
        assert_eq!(
            World::new(0, 5, 0).unwrap_err(),
            WorldError::InvalidDimensions {
                columns: 0,
                rows: 5
            }
        );
    }

    #[test]
    fn oversized_world_is_rejected_before_allocating() {
        assert_eq!(
            World::new(100_000, 100_000, 0).unwrap_err(),
            WorldError::GridTooLarge {
                columns: 100_000,
                rows: 100_000,
                limit: MAX_GRID_CELLS
            }
        );
    }

    #[test]
    fn open_spots_are_never_handed_out_twice() {
        let mut world = World::new(3, 3, 9).expect("valid grid");
        let first = world.get_open_spot().expect("spot available");
        let second = world.get_open_spot().expect("spot available");
        assert_ne!(first, second);
        assert!(!world.is_open_spot(first));
        assert!(!world.is_open_spot(second));
    }

    #[test]
    fn full_grid_reports_empty_pool() {
        let mut world = World::new(2, 2, 3).expect("valid grid");
        for _ in 0..4 {
            let _ = world
                .spawn_agent(AgentKind::X, threshold(0.5))
                .expect("room for agent");
        }

        assert_eq!(query::free_cell_count(&world), 0);
        assert_eq!(world.get_open_spot(), Err(WorldError::EmptyPool));
        assert_partition(&world);
    }

    #[test]
    fn add_agent_claims_location_from_pool() {
        let mut world = World::new(3, 3, 0).expect("valid grid");
        let cell = CellCoord::new(2, 1);

        let id = world
            .add_agent(Agent::new(AgentKind::O, cell, threshold(0.3)), cell)
            .expect("free cell");

        assert_eq!(id, AgentId::new(0));
        assert!(!world.is_open_spot(cell));
        assert_partition(&world);
    }

    #[test]
    fn add_agent_syncs_agent_position_with_location() {
        let mut world = World::new(3, 3, 0).expect("valid grid");
        let location = CellCoord::new(1, 2);

        let id = world
            .add_agent(
                Agent::new(AgentKind::X, CellCoord::new(0, 0), threshold(0.3)),
                location,
            )
            .expect("free cell");

        assert_eq!(world.agent(id).map(Agent::cell), Some(location));
        assert_partition(&world);
    }

    #[test]
    fn add_agent_rejects_occupied_and_out_of_bounds_cells() {
        let mut world = World::new(2, 2, 0).expect("valid grid");
        let cell = CellCoord::new(0, 0);
        let first = world
            .add_agent(Agent::new(AgentKind::X, cell, threshold(0.5)), cell)
            .expect("free cell");

        assert_eq!(
            world.add_agent(Agent::new(AgentKind::O, cell, threshold(0.5)), cell),
            Err(WorldError::Occupied {
                cell,
                occupant: first
            })
        );

        let outside = CellCoord::new(2, 0);
        assert_eq!(
            world.add_agent(Agent::new(AgentKind::O, outside, threshold(0.5)), outside),
            Err(WorldError::OutOfBounds {
                cell: outside,
                columns: 2,
                rows: 2
            })
        );
        assert_eq!(world.agents().len(), 1);
        assert_partition(&world);
    }

    #[test]
    fn get_agent_distinguishes_empty_from_out_of_bounds() {
        let mut world = World::new(2, 2, 0).expect("valid grid");
        let cell = CellCoord::new(1, 1);
        let _ = world
            .add_agent(Agent::new(AgentKind::O, cell, threshold(0.5)), cell)
            .expect("free cell");

        assert_eq!(
            world.get_agent(cell).expect("in bounds").map(Agent::kind),
            Some(AgentKind::O)
        );
        assert_eq!(world.get_agent(CellCoord::new(0, 0)), Ok(None));
        assert!(matches!(
            world.get_agent(CellCoord::new(0, 2)),
            Err(WorldError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn move_agent_applies_all_four_steps() {
        let mut world = World::new(3, 3, 5).expect("valid grid");
        let start = CellCoord::new(0, 0);
        let id = world
            .add_agent(Agent::new(AgentKind::X, start, threshold(0.5)), start)
            .expect("free cell");

        let target = loop {
            let spot = world.get_open_spot().expect("spot available");
            if spot != start {
                break spot;
            }
        };
        world.move_agent(id, target).expect("target is free");

        assert_eq!(world.agent(id).map(Agent::cell), Some(target));
        let view = query::occupancy_view(&world);
        assert_eq!(view.occupant(target), Some(id));
        assert_eq!(view.occupant(start), None);
        assert!(world.is_open_spot(start));
        assert!(!world.is_open_spot(target));
    }

    #[test]
    fn move_agent_claims_target_even_without_draw() {
        let mut world = World::new(3, 1, 0).expect("valid grid");
        let start = CellCoord::new(0, 0);
        let id = world
            .add_agent(Agent::new(AgentKind::X, start, threshold(0.5)), start)
            .expect("free cell");

        world
            .move_agent(id, CellCoord::new(2, 0))
            .expect("target is free");

        assert_partition(&world);
    }

    #[test]
    fn failed_move_leaves_world_untouched() {
        let mut world = World::new(2, 1, 0).expect("valid grid");
        let left = CellCoord::new(0, 0);
        let right = CellCoord::new(1, 0);
        let mover = world
            .add_agent(Agent::new(AgentKind::X, left, threshold(0.5)), left)
            .expect("free cell");
        let blocker = world
            .add_agent(Agent::new(AgentKind::O, right, threshold(0.5)), right)
            .expect("free cell");

        assert_eq!(
            world.move_agent(mover, right),
            Err(WorldError::Occupied {
                cell: right,
                occupant: blocker
            })
        );
        assert_eq!(
            world.move_agent(AgentId::new(7), right),
            Err(WorldError::Occupied {
                cell: right,
                occupant: blocker
            })
        );
        assert_eq!(world.agent(mover).map(Agent::cell), Some(left));
        assert_partition(&world);
    }

    #[test]
    fn relocating_unknown_agent_does_not_consume_spot() {
        let mut world = World::new(2, 2, 0).expect("valid grid");
        assert_eq!(
            world.relocate_agent(AgentId::new(0)),
            Err(WorldError::UnknownAgent(AgentId::new(0)))
        );
        assert_eq!(query::free_cell_count(&world), 4);
    }

    #[test]
    fn apply_place_and_relocate_emit_events() {
        let mut world = World::new(4, 4, 21).expect("valid grid");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceAgent {
                kind: AgentKind::O,
                threshold: threshold(0.5),
            },
            &mut events,
        )
        .expect("room for agent");

        let Some(Event::AgentPlaced { agent, kind, cell }) = events.first().copied() else {
            panic!("expected placement event, got {events:?}");
        };
        assert_eq!(agent, AgentId::new(0));
        assert_eq!(kind, AgentKind::O);

        apply(&mut world, Command::RelocateAgent { agent }, &mut events).expect("room to move");

        let Some(Event::AgentRelocated { from, to, .. }) = events.get(1).copied() else {
            panic!("expected relocation event, got {events:?}");
        };
        assert_eq!(from, cell);
        assert_ne!(to, cell);
        assert_eq!(world.agent(agent).map(Agent::cell), Some(to));
        assert_partition(&world);
    }

    #[test]
    fn relocation_in_full_grid_fails_with_empty_pool() {
        let mut world = World::new(1, 2, 0).expect("valid grid");
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::PlaceAgent {
                    kind: AgentKind::X,
                    threshold: threshold(1.0),
                },
                &mut events,
            )
            .expect("room for agent");
        }
        let before = query::display_turn(&world, 0);

        assert_eq!(
            apply(
                &mut world,
                Command::RelocateAgent {
                    agent: AgentId::new(0)
                },
                &mut events,
            ),
            Err(WorldError::EmptyPool)
        );
        assert_eq!(events.len(), 2);
        assert_eq!(query::display_turn(&world, 0), before);
    }

    #[test]
    fn display_turn_reports_kinds_per_cell() {
        let mut world = World::new(3, 2, 0).expect("valid grid");
        let x_cell = CellCoord::new(0, 1);
        let o_cell = CellCoord::new(2, 0);
        let _ = world
            .add_agent(Agent::new(AgentKind::X, x_cell, threshold(0.5)), x_cell)
            .expect("free cell");
        let _ = world
            .add_agent(Agent::new(AgentKind::O, o_cell, threshold(0.5)), o_cell)
            .expect("free cell");

        let snapshot = query::display_turn(&world, 3);
        assert_eq!(snapshot.turn(), 3);
        assert_eq!((snapshot.columns(), snapshot.rows()), (3, 2));
        assert_eq!(snapshot.cell(x_cell), Some(AgentKind::X));
        assert_eq!(snapshot.cell(o_cell), Some(AgentKind::O));
        assert_eq!(snapshot.cell(CellCoord::new(1, 1)), None);
    }

    #[test]
    fn same_seed_replays_same_draws() {
        let mut first = World::new(5, 5, 77).expect("valid grid");
        let mut second = World::new(5, 5, 77).expect("valid grid");
        for _ in 0..10 {
            assert_eq!(first.get_open_spot(), second.get_open_spot());
        }
    }
}
