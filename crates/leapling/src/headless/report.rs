//! Training report output
//!
//! A finished (or capped) run is summarized either as a plain-text table
//! for the terminal or as JSON for scripts.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use leapling_core::{FinalResult, GenerationSummary};
use serde::{Deserialize, Serialize};

use super::trainer::LevelChange;

/// How the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Generation limit reached
    Completed,
    /// Halted early (tick cap)
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub seed: u64,
    pub outcome: Outcome,
    /// Only present when the generation limit was reached
    pub final_result: Option<FinalResult>,
    pub level: u32,
    pub best_distance: f32,
    pub best_generation: u32,
    pub generations_evaluated: usize,
    pub ticks: u64,
    pub frames: u64,
    pub history: Vec<GenerationSummary>,
    pub level_changes: Vec<LevelChange>,
}

impl TrainingReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize training report")
    }

    /// Per-generation table followed by the run summary
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{:>5} {:>5} {:>10} {:>10} {:>8} {:>9} {:>9}",
            "gen", "level", "avg", "best", "crashed", "completed", "timed out"
        );
        for s in &self.history {
            let _ = writeln!(
                out,
                "{:>5} {:>5} {:>10.1} {:>10.1} {:>8} {:>9} {:>9}",
                s.generation,
                s.level,
                s.average_distance,
                s.best_distance,
                s.dropout_count,
                s.completed_count,
                s.timed_out_count
            );
        }
        out.push('\n');

        let outcome = match self.outcome {
            Outcome::Completed => "completed",
            Outcome::Stopped => "stopped early",
        };
        let _ = writeln!(out, "Run {} (seed {})", outcome, self.seed);
        let _ = writeln!(
            out,
            "Generations: {}, frames: {}, ticks: {}",
            self.generations_evaluated, self.frames, self.ticks
        );
        let _ = writeln!(out, "Level reached: {}", self.level);
        let _ = writeln!(
            out,
            "Best distance: {:.1} (generation {})",
            self.best_distance, self.best_generation
        );
        for change in &self.level_changes {
            let _ = writeln!(
                out,
                "  level {} after generation {}",
                change.level, change.generation
            );
        }
        out
    }
}
