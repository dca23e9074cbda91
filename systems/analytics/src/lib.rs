#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Analytics system that summarises each turn of the simulation.

use segregation_core::{Event, TurnStats};
use segregation_world::{query, World};

/// Accumulates the events of the running turn and publishes [`TurnStats`] once
/// the turn has resolved.
#[derive(Debug, Default)]
pub struct Analytics {
    relocations: u32,
    last_report: Option<TurnStats>,
}

impl Analytics {
    /// Creates a new analytics system with no recorded turn.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last report published by the system, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<&TurnStats> {
        self.last_report.as_ref()
    }

    /// Records the events produced while the current turn resolves.
    pub fn observe(&mut self, events: &[Event]) {
        let moved = events
            .iter()
            .filter(|event| matches!(event, Event::AgentRelocated { .. }))
            .count();
        self.relocations = self
            .relocations
            .saturating_add(u32::try_from(moved).unwrap_or(u32::MAX));
    }

    /// Closes the current turn, measuring the world as it stands now.
    pub fn finish_turn(&mut self, world: &World, turn: u32) -> TurnStats {
        let report = TurnStats {
            turn,
            relocations: self.relocations,
            unsatisfied: unsatisfied_count(world),
            mean_similarity: mean_similarity(world),
            free_cells: u32::try_from(query::free_cell_count(world)).unwrap_or(u32::MAX),
        };
        self.relocations = 0;
        self.last_report = Some(report);
        report
    }
}

/// Counts the agents that would move if asked right now.
#[must_use]
pub fn unsatisfied_count(world: &World) -> u32 {
    let count = world
        .agents()
        .iter()
        .filter(|agent| !agent.is_satisfied(world))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Mean share of like neighbours over agents with at least one neighbour.
///
/// Returns `1.0` when no agent has an occupied neighbour.
#[must_use]
pub fn mean_similarity(world: &World) -> f64 {
    let mut total = 0.0;
    let mut counted = 0_u32;
    for agent in world.agents() {
        let neighborhood = agent.neighborhood(world);
        if neighborhood.occupied() > 0 {
            total += neighborhood.similarity();
            counted += 1;
        }
    }
    if counted == 0 {
        1.0
    } else {
        total / f64::from(counted)
    }
}
