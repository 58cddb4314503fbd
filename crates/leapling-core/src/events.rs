//! Notifications emitted to the host
//!
//! The core never calls into presentation code; it returns these values
//! from stepping calls and the host decides what to do with them.

use serde::{Deserialize, Serialize};

use crate::obstacle::Obstacle;
use crate::runner::RunnerSnapshot;
use crate::stats::GenerationStats;

/// Numbers reported once per generation boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub generation: u32,
    /// Level the generation was run at
    pub level: u32,
    pub average_distance: f32,
    pub best_distance: f32,
    pub dropout_count: usize,
    pub completed_count: usize,
    pub timed_out_count: usize,
}

impl GenerationSummary {
    pub fn new(generation: u32, level: u32, stats: &GenerationStats) -> Self {
        Self {
            generation,
            level,
            average_distance: stats.average_distance,
            best_distance: stats.best_distance,
            dropout_count: stats.dropout_count,
            completed_count: stats.completed_count,
            timed_out_count: stats.timed_out_count,
        }
    }
}

/// Outcome of a run that reached its generation limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub level: u32,
    pub best_distance: f32,
    /// Generation that produced `best_distance`
    pub best_generation: u32,
    /// Generations evaluated
    pub generations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SimEvent {
    GenerationCompleted(GenerationSummary),
    LevelUp { level: u32, generation: u32 },
    RunFinished(FinalResult),
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot<'a> {
    pub generation: u32,
    pub level: u32,
    pub frame: u64,
    pub course_length: f32,
    pub ground_y: f32,
    pub runner_radius: f32,
    pub runners: Vec<RunnerSnapshot>,
    pub best_index: Option<usize>,
    pub obstacles: &'a [Obstacle],
}
