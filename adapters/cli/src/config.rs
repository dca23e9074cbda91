//! Layered run configuration: built-in defaults, an optional TOML file, then
//! command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use clap::ValueEnum;
use segregation_system_bootstrap::{Config, SetupError, DEFAULT_KIND_SPLIT};
use serde::Deserialize;

use crate::Args;

const DEFAULT_WIDTH: u32 = 10;
const DEFAULT_HEIGHT: u32 = 10;
const DEFAULT_AGENTS: u32 = 75;
const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_TURNS: u32 = 50;
const DEFAULT_FRAME_DELAY_MS: u64 = 250;

/// How frames are presented on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// Grid of glyphs per turn.
    #[default]
    Text,
    /// One JSON document per turn.
    Json,
    /// No frame output; statistics still go to the log.
    None,
}

/// Settings read from a TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    width: Option<u32>,
    height: Option<u32>,
    agents: Option<u32>,
    threshold: Option<f64>,
    split: Option<f64>,
    turns: Option<u32>,
    seed: Option<u64>,
    frame_delay_ms: Option<u64>,
    format: Option<OutputFormat>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid simulation config toml")
    }
}

/// Fully resolved settings for one run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) bootstrap: Config,
    pub(crate) turns: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) frame_delay: Duration,
    pub(crate) format: OutputFormat,
}

impl Settings {
    /// Merges flags over the file over defaults and validates the result.
    pub(crate) fn resolve(args: &Args, file: FileConfig) -> Result<Self, SetupError> {
        let width = args.width.or(file.width).unwrap_or(DEFAULT_WIDTH);
        let height = args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT);
        let agents = args.agents.or(file.agents).unwrap_or(DEFAULT_AGENTS);
        let threshold = args.threshold.or(file.threshold).unwrap_or(DEFAULT_THRESHOLD);
        let split = args.split.or(file.split).unwrap_or(DEFAULT_KIND_SPLIT);

        let bootstrap = Config::new(width, height, agents, threshold, split)?;
        let frame_delay_ms = args
            .frame_delay_ms
            .or(file.frame_delay_ms)
            .unwrap_or(DEFAULT_FRAME_DELAY_MS);

        Ok(Self {
            bootstrap,
            turns: args.turns.or(file.turns).unwrap_or(DEFAULT_TURNS),
            seed: args.seed.or(file.seed),
            frame_delay: Duration::from_millis(frame_delay_ms),
            format: args.format.or(file.format).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(flags: &[&str]) -> Args {
        let mut argv = vec!["segregation"];
        argv.extend_from_slice(flags);
        Args::try_parse_from(argv).expect("valid flags")
    }

    #[test]
    fn defaults_match_classic_setup() {
        let settings = Settings::resolve(&args(&[]), FileConfig::default()).expect("valid");

        assert_eq!(settings.bootstrap.columns(), 10);
        assert_eq!(settings.bootstrap.rows(), 10);
        assert_eq!(settings.bootstrap.num_agents(), 75);
        assert_eq!(settings.bootstrap.threshold().get(), 0.5);
        assert_eq!(settings.bootstrap.kind_split(), DEFAULT_KIND_SPLIT);
        assert_eq!(settings.turns, 50);
        assert_eq!(settings.frame_delay, Duration::from_millis(250));
        assert_eq!(settings.format, OutputFormat::Text);
        assert!(settings.seed.is_none());
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig::parse(
            r#"
            width = 6
            height = 4
            agents = 10
            threshold = 0.3
            split = 0.75
            seed = 5
            format = "json"
            "#,
        )
        .expect("valid toml");

        let settings =
            Settings::resolve(&args(&["--agents", "12", "--seed", "9"]), file).expect("valid");

        assert_eq!(settings.bootstrap.columns(), 6);
        assert_eq!(settings.bootstrap.rows(), 4);
        assert_eq!(settings.bootstrap.num_agents(), 12);
        assert!((settings.bootstrap.threshold().get() - 0.3).abs() < f64::EPSILON);
        assert_eq!(settings.bootstrap.kind_split(), 0.75);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.format, OutputFormat::Json);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileConfig::parse("agent_count = 3").is_err());
    }

    #[test]
    fn overcrowded_grid_is_rejected_before_running() {
        let outcome = Settings::resolve(
            &args(&["--width", "3", "--height", "3", "--agents", "10"]),
            FileConfig::default(),
        );
        assert_eq!(
            outcome.map(|settings| settings.turns),
            Err(SetupError::TooManyAgents {
                requested: 10,
                capacity: 9
            })
        );
    }

    #[test]
    fn oversized_grid_is_rejected_before_allocating() {
        let outcome = Settings::resolve(
            &args(&["--width", "100000", "--height", "100000", "--agents", "0"]),
            FileConfig::default(),
        );
        assert!(matches!(outcome, Err(SetupError::GridTooLarge { .. })));
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        let outcome = Settings::resolve(&args(&["--threshold", "1.2"]), FileConfig::default());
        assert!(matches!(outcome, Err(SetupError::InvalidThreshold(_))));
    }
}
