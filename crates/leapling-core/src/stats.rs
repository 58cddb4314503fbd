//! Per-generation fitness statistics

use serde::{Deserialize, Serialize};

use crate::runner::{Runner, RunnerStatus};

/// Best distance together with the generation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BestRecord {
    pub distance: f32,
    pub generation: u32,
}

impl BestRecord {
    /// Keep the larger distance; ties keep the earlier generation
    pub fn offer(&mut self, distance: f32, generation: u32) -> bool {
        if distance > self.distance {
            self.distance = distance;
            self.generation = generation;
            true
        } else {
            false
        }
    }
}

/// Snapshot of how the current generation is doing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationStats {
    pub average_distance: f32,
    pub best_distance: f32,
    /// Index of the best runner in the population (not an owning handle)
    pub best_index: Option<usize>,
    /// Runners that crashed
    pub dropout_count: usize,
    /// Runners that reached the finish line
    pub completed_count: usize,
    pub timed_out_count: usize,
    pub running_count: usize,
}

impl GenerationStats {
    pub fn from_runners(runners: &[Runner]) -> Self {
        let mut stats = Self::default();
        if runners.is_empty() {
            return stats;
        }

        let mut total = 0.0;
        for (index, runner) in runners.iter().enumerate() {
            let distance = runner.distance();
            total += distance;
            if stats.best_index.is_none() || distance > stats.best_distance {
                stats.best_distance = distance;
                stats.best_index = Some(index);
            }
            match runner.status() {
                RunnerStatus::Running => stats.running_count += 1,
                RunnerStatus::Succeeded => stats.completed_count += 1,
                RunnerStatus::Crashed => stats.dropout_count += 1,
                RunnerStatus::TimedOut => stats.timed_out_count += 1,
            }
        }
        stats.average_distance = total / runners.len() as f32;
        stats
    }

    pub fn finished_count(&self) -> usize {
        self.dropout_count + self.completed_count + self.timed_out_count
    }
}
