#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Schelling's segregation model in the terminal.

mod config;
mod simulation;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use segregation_rendering::{NullBackend, RenderingBackend};
use segregation_rendering_terminal::{JsonLinesBackend, TextBackend};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{FileConfig, OutputFormat, Settings},
    simulation::Simulation,
};

/// Command-line arguments accepted by the simulator.
#[derive(Debug, Parser)]
#[command(
    name = "segregation",
    about = "Schelling's segregation model on a bounded grid"
)]
pub(crate) struct Args {
    /// TOML file providing defaults for the flags below.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Number of grid columns.
    #[arg(long)]
    pub(crate) width: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    pub(crate) height: Option<u32>,
    /// Number of agents to place.
    #[arg(long)]
    pub(crate) agents: Option<u32>,
    /// Minimum share of like neighbours an agent accepts, in [0, 1].
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Share of agents assigned to kind X, in [0, 1].
    #[arg(long)]
    pub(crate) split: Option<f64>,
    /// Number of turns to simulate.
    #[arg(long)]
    pub(crate) turns: Option<u32>,
    /// Seed for placement and relocation draws. Random when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Pause between text frames in milliseconds.
    #[arg(long, value_name = "MS")]
    pub(crate) frame_delay_ms: Option<u64>,
    /// Frame output format.
    #[arg(long, value_enum)]
    pub(crate) format: Option<OutputFormat>,
}

/// Entry point for the segregation command-line interface.
fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    let file = match args.config.as_deref() {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(&args, file).context("invalid simulation settings")?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        width = settings.bootstrap.columns(),
        height = settings.bootstrap.rows(),
        agents = settings.bootstrap.num_agents(),
        threshold = settings.bootstrap.threshold().get(),
        split = settings.bootstrap.kind_split(),
        turns = settings.turns,
        "starting simulation"
    );

    let mut simulation = Simulation::new(&settings.bootstrap, seed)?;
    match settings.format {
        OutputFormat::Text => {
            let mut backend = TextBackend::new(io::stdout().lock());
            drive(&mut simulation, &settings, &mut backend, settings.frame_delay)
        }
        OutputFormat::Json => {
            let mut backend = JsonLinesBackend::new(io::stdout().lock());
            drive(&mut simulation, &settings, &mut backend, Duration::ZERO)
        }
        OutputFormat::None => drive(&mut simulation, &settings, &mut NullBackend, Duration::ZERO),
    }
}

fn drive<B: RenderingBackend>(
    simulation: &mut Simulation,
    settings: &Settings,
    backend: &mut B,
    frame_delay: Duration,
) -> Result<()> {
    simulation.run(settings.turns, backend, frame_delay)?;
    tracing::info!(turns = settings.turns, "simulation finished");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
