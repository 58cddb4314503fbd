//! Evolving hurdle runners
//!
//! This crate implements:
//! - Fixed-length genomes that drive per-frame pace and jump decisions
//! - Runner kinematics with circle/rectangle collision against hurdles
//! - Procedural and manual obstacle courses with level-based difficulty
//! - A generational GA (roulette selection, single-point crossover,
//!   mutation, elitism) stepped in lockstep with the simulation
//!
//! Everything is frame-stepped and headless: hosts call
//! [`Simulation::step`] or [`Simulation::tick`] and render from
//! [`Simulation::snapshot`].

use rand::{Rng, SeedableRng};

pub mod course;
pub mod difficulty;
pub mod events;
pub mod genome;
pub mod obstacle;
pub mod physics;
pub mod population;
pub mod runner;
pub mod settings;
pub mod simulation;
pub mod stats;

// Re-export main types for convenience
pub use course::Course;
pub use difficulty::DifficultyParams;
pub use events::{FinalResult, FrameSnapshot, GenerationSummary, SimEvent};
pub use genome::Genome;
pub use obstacle::Obstacle;
pub use population::{GenerationReport, Population};
pub use runner::{Runner, RunnerSnapshot, RunnerStatus};
pub use settings::{ObstacleMode, SimulationSettings};
pub use simulation::{RunState, Simulation};
pub use stats::{BestRecord, GenerationStats};

/// Random number generator used throughout the simulation
pub type SimRng = rand_xoshiro::Xoshiro256PlusPlus;

/// Seeded generator, or one seeded from OS entropy when `seed` is None
///
/// Returns the generator together with the seed actually used so runs
/// can be reproduced.
pub fn seeded_rng(seed: Option<u64>) -> (SimRng, u64) {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    (SimRng::seed_from_u64(seed), seed)
}
