//! Turn loop that drives the world with the bootstrap, relocation and
//! analytics systems.

use std::{thread, time::Duration};

use anyhow::{Context, Result};
use segregation_core::{AgentId, Command, Event, TurnStats};
use segregation_rendering::{Frame, RenderingBackend};
use segregation_system_analytics::Analytics;
use segregation_system_bootstrap::{Bootstrap, Config};
use segregation_system_relocation::Relocation;
use segregation_world::{self as world, query, World, WorldError};

/// Owns one simulation run from population to the final turn.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    roster: Vec<AgentId>,
    relocation: Relocation,
    analytics: Analytics,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates the world and places the initial population.
    pub(crate) fn new(config: &Config, seed: u64) -> Result<Self> {
        let mut world = World::new(config.columns(), config.rows(), seed)
            .context("failed to create world")?;

        let mut commands = Vec::new();
        Bootstrap.handle(config, &mut commands);
        let mut events = Vec::with_capacity(commands.len());
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events)
                .context("failed to place initial population")?;
        }

        let roster = query::agent_ids(&world).collect();
        Ok(Self {
            world,
            roster,
            relocation: Relocation,
            analytics: Analytics::new(),
            commands,
            events,
        })
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Measures the freshly populated world as turn zero.
    pub(crate) fn initial_stats(&mut self) -> TurnStats {
        self.analytics.finish_turn(&self.world, 0)
    }

    /// Gives every agent, in creation order, one chance to move.
    ///
    /// Each decision sees the moves already made earlier in the same turn.
    pub(crate) fn run_turn(&mut self, turn: u32) -> Result<TurnStats, WorldError> {
        for agent in &self.roster {
            self.commands.clear();
            self.relocation.handle(&self.world, *agent, &mut self.commands);
            for command in self.commands.drain(..) {
                self.events.clear();
                world::apply(&mut self.world, command, &mut self.events)?;
                self.analytics.observe(&self.events);
            }
        }
        Ok(self.analytics.finish_turn(&self.world, turn))
    }

    /// Runs `turns` turns, presenting the initial grid and the grid after
    /// every turn.
    pub(crate) fn run<B>(
        &mut self,
        turns: u32,
        backend: &mut B,
        frame_delay: Duration,
    ) -> Result<()>
    where
        B: RenderingBackend,
    {
        let initial = self.initial_stats();
        backend
            .present(&Frame::new(query::display_turn(&self.world, 0), Some(initial)))
            .context("failed to present initial frame")?;

        for turn in 1..=turns {
            pace(frame_delay);
            let stats = self
                .run_turn(turn)
                .with_context(|| format!("turn {turn} could not be resolved"))?;
            tracing::info!(
                turn,
                moved = stats.relocations,
                unsatisfied = stats.unsatisfied,
                similarity = stats.mean_similarity,
                "turn resolved"
            );
            backend
                .present(&Frame::new(query::display_turn(&self.world, turn), Some(stats)))
                .with_context(|| format!("failed to present turn {turn}"))?;
        }

        backend.finish().context("failed to finish rendering")
    }
}

fn pace(frame_delay: Duration) {
    if !frame_delay.is_zero() {
        thread::sleep(frame_delay);
    }
}
