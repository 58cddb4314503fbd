//! Headless training loop
//!
//! Drives a [`Simulation`] as fast as possible, without any display clock,
//! until the generation limit or the tick cap is reached.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use leapling_core::{GenerationSummary, RunState, SimEvent, Simulation, SimulationSettings};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;

use super::report::{Outcome, TrainingReport};

/// A level reached during training
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelChange {
    pub level: u32,
    /// Generation whose finisher unlocked the level
    pub generation: u32,
}

pub struct Trainer {
    sim: Simulation,
    run: RunConfig,
    ticks: u64,
    history: Vec<GenerationSummary>,
    level_changes: Vec<LevelChange>,
    progress: ProgressBar,
}

impl Trainer {
    /// Trainer with a hidden progress bar
    pub fn new(settings: SimulationSettings, run: RunConfig) -> Self {
        Self {
            sim: Simulation::new(settings),
            run: run.sanitize(),
            ticks: 0,
            history: Vec::new(),
            level_changes: Vec::new(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Show a terminal progress bar over the generation limit
    pub fn with_progress(mut self) -> Result<Self> {
        let progress = ProgressBar::new(self.sim.settings().evolution.max_generations as u64);
        progress.set_style(Self::progress_style()?);
        progress.enable_steady_tick(std::time::Duration::from_millis(100));
        self.progress = progress;
        Ok(self)
    }

    fn progress_style() -> Result<ProgressStyle> {
        Ok(ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("█▓░"))
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn history(&self) -> &[GenerationSummary] {
        &self.history
    }

    pub fn level_changes(&self) -> &[LevelChange] {
        &self.level_changes
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run until the simulation halts or the tick cap is hit
    pub fn run(&mut self) -> TrainingReport {
        let settings = self.sim.settings();
        self.progress.println(format!(
            "Starting training: seed {}, {} generations, {} runners, {:?} course of {:.0}px",
            self.sim.seed(),
            settings.evolution.max_generations,
            settings.evolution.population_size,
            settings.course.mode,
            settings.course.length
        ));

        while self.tick() {}

        let report = self.report();
        match report.outcome {
            Outcome::Completed => self.progress.finish_with_message("Training complete!"),
            Outcome::Stopped => self.progress.abandon_with_message("Tick cap reached"),
        }
        report
    }

    /// One host tick: `steps_per_tick` frames
    ///
    /// Returns false once the run has ended.
    pub fn tick(&mut self) -> bool {
        if !self.sim.is_running() {
            return false;
        }
        if self.run.max_ticks.is_some_and(|cap| self.ticks >= cap) {
            log::info!("Tick cap of {} reached", self.ticks);
            self.sim.stop();
            return false;
        }

        let events = self.sim.tick(self.run.steps_per_tick);
        self.ticks += 1;
        for event in events {
            self.record(event);
        }
        self.sim.is_running()
    }

    fn record(&mut self, event: SimEvent) {
        match event {
            SimEvent::GenerationCompleted(summary) => {
                self.progress.inc(1);
                self.progress.set_message(format!(
                    "level {} best {:.1}",
                    summary.level, summary.best_distance
                ));
                self.history.push(summary);
            }
            SimEvent::LevelUp { level, generation } => {
                self.progress.println(format!(
                    "Level {} unlocked by generation {}",
                    level, generation
                ));
                self.level_changes.push(LevelChange { level, generation });
            }
            SimEvent::RunFinished(result) => {
                self.progress.println(format!(
                    "Finished: level {}, best distance {:.1} (generation {})",
                    result.level, result.best_distance, result.best_generation
                ));
            }
        }
    }

    /// Snapshot of everything recorded so far
    pub fn report(&self) -> TrainingReport {
        let population = self.sim.population();
        let (outcome, final_result) = match self.sim.run_state() {
            RunState::Completed(result) => (Outcome::Completed, Some(result)),
            RunState::Running | RunState::Stopped => (Outcome::Stopped, None),
        };

        TrainingReport {
            seed: self.sim.seed(),
            outcome,
            final_result,
            level: self.sim.level(),
            best_distance: population.overall_best().distance,
            best_generation: population.overall_best().generation,
            generations_evaluated: self.history.len(),
            ticks: self.ticks,
            frames: self.sim.frame(),
            history: self.history.clone(),
            level_changes: self.level_changes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_settings(seed: u64) -> SimulationSettings {
        let mut settings = SimulationSettings::default();
        settings.evolution.seed = Some(seed);
        settings.evolution.population_size = 10;
        settings.evolution.genome_length = 10;
        settings.evolution.gene_duration = 4;
        settings.evolution.max_generations = 5;
        settings
    }

    #[test]
    fn test_runs_to_generation_limit() {
        let mut trainer = Trainer::new(quick_settings(1), RunConfig::default());
        let report = trainer.run();

        assert_eq!(report.outcome, Outcome::Completed);
        assert_eq!(report.generations_evaluated, 5);
        assert_eq!(report.history.len(), 5);
        let result = report.final_result.unwrap();
        assert_eq!(result.generations, 5);
        assert_eq!(result.best_distance, report.best_distance);
        assert!(!trainer.tick());
    }

    #[test]
    fn test_tick_cap_stops_the_run() {
        let run = RunConfig {
            steps_per_tick: 3,
            max_ticks: Some(4),
        };
        let mut trainer = Trainer::new(quick_settings(2), run);
        let report = trainer.run();

        assert_eq!(report.outcome, Outcome::Stopped);
        assert_eq!(report.ticks, 4);
        assert_eq!(report.frames, 12);
        assert!(report.final_result.is_none());
        assert_eq!(trainer.simulation().run_state(), RunState::Stopped);
    }

    #[test]
    fn test_steps_per_tick_is_sanitized() {
        let run = RunConfig {
            steps_per_tick: 0,
            max_ticks: Some(2),
        };
        let mut trainer = Trainer::new(quick_settings(3), run);
        trainer.run();
        assert_eq!(trainer.simulation().frame(), 2);
    }

    #[test]
    fn test_history_follows_generations() {
        let mut trainer = Trainer::new(quick_settings(4), RunConfig::default());
        trainer.run();
        let generations: Vec<u32> = trainer.history().iter().map(|s| s.generation).collect();
        assert_eq!(generations, vec![1, 2, 3, 4, 5]);
        for change in trainer.level_changes() {
            let summary = &trainer.history()[change.generation as usize - 1];
            assert!(summary.completed_count > 0);
            assert_eq!(summary.level + 1, change.level);
        }
    }
}
