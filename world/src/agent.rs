use segregation_core::{AgentKind, CellCoord, Neighborhood, SatisfactionThreshold};

use crate::World;

/// A single resident of the world.
///
/// Agents only hold their own kind, position and tolerance. Every question
/// about their surroundings is answered by borrowing the [`World`] for the
/// duration of the query.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    kind: AgentKind,
    cell: CellCoord,
    threshold: SatisfactionThreshold,
}

impl Agent {
    /// Creates an agent positioned at `cell`.
    #[must_use]
    pub const fn new(kind: AgentKind, cell: CellCoord, threshold: SatisfactionThreshold) -> Self {
        Self {
            kind,
            cell,
            threshold,
        }
    }

    /// Group the agent belongs to.
    #[must_use]
    pub const fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Cell the agent currently occupies.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Minimum share of like neighbours the agent accepts.
    #[must_use]
    pub const fn threshold(&self) -> SatisfactionThreshold {
        self.threshold
    }

    /// Tallies the occupied cells of the Moore neighbourhood around the agent.
    ///
    /// Cells beyond the grid edge and empty cells are skipped.
    #[must_use]
    pub fn neighborhood(&self, world: &World) -> Neighborhood {
        let (columns, rows) = world.dimensions();
        let mut tally = Neighborhood::default();
        for cell in self.cell.moore_neighbors(columns, rows) {
            if let Some(neighbor) = world.occupant(cell) {
                if neighbor.kind == self.kind {
                    tally.same += 1;
                } else {
                    tally.different += 1;
                }
            }
        }
        tally
    }

    /// Reports whether the agent is content with its current neighbourhood.
    #[must_use]
    pub fn is_satisfied(&self, world: &World) -> bool {
        self.neighborhood(world).satisfies(self.threshold)
    }

    /// Overwrites the agent's position. Occupancy bookkeeping is the world's job.
    pub fn move_to(&mut self, cell: CellCoord) {
        self.cell = cell;
    }
}
