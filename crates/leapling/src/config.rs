//! Trainer configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `leapling.ron` in the working directory (if it exists), or an explicit
//!    file passed with `--config`
//! 3. Environment variables prefixed with `LEAPLING_`
//!
//! Example environment variable: `LEAPLING_SIMULATION__EVOLUTION__POPULATION_SIZE=80`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use leapling_core::SimulationSettings;
use serde::{Deserialize, Serialize};

/// Fastest fast-forward a host may request
pub const MAX_STEPS_PER_TICK: u32 = 1000;

/// Everything the `leapling` binary needs
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub simulation: SimulationSettings,

    #[serde(default)]
    pub run: RunConfig,
}

/// Host-side knobs that never reach the simulation core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Simulation frames per host tick (speed multiplier)
    pub steps_per_tick: u32,
    /// Stop after this many ticks even if generations remain
    pub max_ticks: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps_per_tick: 1,
            max_ticks: None,
        }
    }
}

impl RunConfig {
    pub fn sanitize(mut self) -> Self {
        let clamped = self.steps_per_tick.clamp(1, MAX_STEPS_PER_TICK);
        if clamped != self.steps_per_tick {
            log::warn!(
                "steps_per_tick = {} out of range, clamped to {}",
                self.steps_per_tick,
                clamped
            );
            self.steps_per_tick = clamped;
        }
        self
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path` if given (must exist), else `leapling.ron` if present
    /// 3. Environment variables prefixed with `LEAPLING_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            // Layer 2: Config file (optional, won't error if missing)
            None => File::with_name("leapling")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults; the rest come from serde defaults
            .set_default("run.steps_per_tick", 1_i64)?
            .add_source(file)
            // Layer 3: Environment variables (LEAPLING_RUN__STEPS_PER_TICK, etc.)
            .add_source(
                Environment::with_prefix("LEAPLING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().with_context(|| match path {
            Some(path) => format!("Failed to build configuration from {}", path.display()),
            None => "Failed to build configuration".to_string(),
        })?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Clamp simulation and host values into usable ranges
    pub fn sanitize(self) -> Self {
        Self {
            simulation: self.simulation.sanitize(),
            run: self.run.sanitize(),
        }
    }

    /// Pretty RON, suitable as a starting `leapling.ron`
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leapling_core::ObstacleMode;
    use std::io::Write;

    fn ron_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.simulation.evolution.population_size, 50);
        assert_eq!(config.simulation.course.length, 1000.0);
        assert_eq!(config.run.steps_per_tick, 1);
        assert_eq!(config.run.max_ticks, None);
    }

    #[test]
    fn test_load_config_with_defaults() {
        // No leapling.ron in the crate directory
        let config = AppConfig::load(None).expect("Failed to load config");
        assert_eq!(config.simulation.evolution.genome_length, 60);
        assert_eq!(config.simulation.jump.cooldown_frames, 20);
    }

    #[test]
    fn test_load_partial_file() {
        let file = ron_file(
            r#"(
                simulation: (
                    evolution: (population_size: 20, seed: Some(7)),
                    course: (mode: "manual", manual_spec: "150:1.2, 320:1.8"),
                ),
                run: (steps_per_tick: 4),
            )"#,
        );
        let config = AppConfig::load(Some(file.path())).expect("Failed to load config");

        assert_eq!(config.simulation.evolution.population_size, 20);
        assert_eq!(config.simulation.evolution.seed, Some(7));
        assert_eq!(config.simulation.course.mode, ObstacleMode::Manual);
        assert_eq!(config.simulation.course.manual_spec, "150:1.2, 320:1.8");
        assert_eq!(config.run.steps_per_tick, 4);
        // Untouched keys keep their defaults
        assert_eq!(config.simulation.evolution.mutation_rate, 0.05);
        assert_eq!(config.simulation.physics.gravity, 0.5);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("absent.ron");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = ron_file("(run: (max_ticks: Some(10)))");
        std::env::set_var("LEAPLING_RUN__MAX_TICKS", "250");
        let config = AppConfig::load(Some(file.path()));
        std::env::remove_var("LEAPLING_RUN__MAX_TICKS");

        assert_eq!(config.expect("Failed to load config").run.max_ticks, Some(250));
    }

    #[test]
    fn test_environment_reaches_nested_simulation_keys() {
        std::env::set_var("LEAPLING_SIMULATION__EVOLUTION__GENE_DURATION", "7");
        let config = AppConfig::load(None);
        std::env::remove_var("LEAPLING_SIMULATION__EVOLUTION__GENE_DURATION");

        let config = config.expect("Failed to load config");
        assert_eq!(config.simulation.evolution.gene_duration, 7);
    }

    #[test]
    fn test_sanitize_clamps_steps_per_tick() {
        let config = AppConfig {
            run: RunConfig {
                steps_per_tick: 0,
                max_ticks: None,
            },
            ..AppConfig::default()
        }
        .sanitize();
        assert_eq!(config.run.steps_per_tick, 1);

        let fast = RunConfig {
            steps_per_tick: 50_000,
            max_ticks: None,
        }
        .sanitize();
        assert_eq!(fast.steps_per_tick, MAX_STEPS_PER_TICK);
    }

    #[test]
    fn test_ron_round_trip() {
        let mut config = AppConfig::default();
        config.simulation.evolution.population_size = 33;
        config.simulation.course.mode = ObstacleMode::Manual;
        let text = config.to_ron().expect("Failed to serialize");
        let parsed: AppConfig = ron::from_str(&text).expect("Failed to parse");
        assert_eq!(parsed, config);
    }
}
