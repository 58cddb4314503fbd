//! Headless training for evolving hurdle runners
//!
//! Runs a simulation to completion without any renderer and summarizes it:
//! - Fast-forward driver with a terminal progress bar
//! - Per-generation history and level changes
//! - Text table or JSON report

mod report;
mod trainer;

pub use report::{Outcome, TrainingReport};
pub use trainer::{LevelChange, Trainer};
