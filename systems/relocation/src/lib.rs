#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure relocation system that decides which agents leave their neighbourhood.

use segregation_core::{AgentId, Command};
use segregation_world::{query, World};

/// Pure system that inspects one agent at a time and proposes a move when the
/// agent is unhappy with its neighbours.
///
/// Decisions are taken against live world state, so callers are expected to
/// apply the emitted command before asking about the next agent.
#[derive(Debug, Default)]
pub struct Relocation;

impl Relocation {
    /// Emits [`Command::RelocateAgent`] when `agent` is unsatisfied.
    pub fn handle(&self, world: &World, agent: AgentId, out: &mut Vec<Command>) {
        let Some(resident) = query::agent(world, agent) else {
            return;
        };
        if !resident.is_satisfied(world) {
            out.push(Command::RelocateAgent { agent });
        }
    }
}
